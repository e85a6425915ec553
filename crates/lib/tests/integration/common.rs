//! Shared helpers for build integration tests.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use pkgsched_lib::context::BuildContext;
use pkgsched_lib::dispatch::{BuildStep, BuilderKind, Dispatcher};
use pkgsched_lib::label::{Label, PackageName};

/// A stand-in compilation environment: a toolchain name and its flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Toolchain {
  pub name: String,
  pub flags: Vec<String>,
}

impl Toolchain {
  pub fn new(name: &str) -> Self {
    Self {
      name: name.to_string(),
      flags: Vec::new(),
    }
  }
}

/// What a handler saw for one rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
  pub rule: String,
  pub variant: String,
  pub toolchain: Toolchain,
  pub target: PathBuf,
  pub sources: Vec<PathBuf>,
}

pub type Invocations = Rc<RefCell<Vec<Invocation>>>;

pub fn pkg(path: &str) -> PackageName {
  PackageName::new(path).unwrap()
}

pub fn rule_label(raw: &str) -> Label {
  Label::rule(raw, &pkg("root")).unwrap()
}

pub fn context() -> BuildContext<Toolchain> {
  BuildContext::with_root_environment(Toolchain::new("cc"))
}

/// Libraries are produced as `lib<name>.a` next to their declared output.
fn library_path(target: &Path) -> PathBuf {
  let name = target.file_name().and_then(|name| name.to_str()).unwrap_or_default();
  target.with_file_name(format!("lib{}.a", name))
}

/// A dispatcher whose handlers record every invocation and report the
/// conventional output path for the rule's kind.
pub fn recording_dispatcher() -> (Dispatcher<Toolchain>, Invocations) {
  let invocations = Invocations::default();
  let mut dispatcher = Dispatcher::new();

  for kind in BuilderKind::ALL {
    let seen = Rc::clone(&invocations);
    dispatcher.register(kind, move |step: &BuildStep<'_, Toolchain>| {
      seen.borrow_mut().push(Invocation {
        rule: step.label().to_string(),
        variant: step.variant.to_string(),
        toolchain: step.env().clone(),
        target: step.target.clone(),
        sources: step.sources.clone(),
      });
      let output = match step.kind {
        BuilderKind::Program => step.target.clone(),
        BuilderKind::StaticLibrary => library_path(&step.target),
      };
      Ok(vec![output])
    });
  }

  (dispatcher, invocations)
}

pub fn invoked_rules(invocations: &Invocations) -> Vec<String> {
  invocations.borrow().iter().map(|inv| inv.rule.clone()).collect()
}
