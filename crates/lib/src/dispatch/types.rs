use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::label::Label;
use crate::order::Variant;
use crate::rule::Rule;

/// The kind of artifact a rule produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuilderKind {
  Program,
  StaticLibrary,
}

impl BuilderKind {
  pub const ALL: [BuilderKind; 2] = [BuilderKind::Program, BuilderKind::StaticLibrary];
}

impl fmt::Display for BuilderKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuilderKind::Program => f.write_str("program"),
      BuilderKind::StaticLibrary => f.write_str("static_library"),
    }
  }
}

/// Error type returned by builder handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Builds one rule and returns the paths it produced.
pub type Handler<E> = Box<dyn FnMut(&BuildStep<'_, E>) -> Result<Vec<PathBuf>, HandlerError>>;

/// Everything a handler needs to build one rule.
#[derive(Debug)]
pub struct BuildStep<'a, E: Clone> {
  pub rule: &'a Rule,
  pub kind: BuilderKind,
  pub variant: &'a Variant,
  /// The rule's environment, copied and adjusted when a dependency exports
  /// settings.
  pub env: Cow<'a, E>,
  /// Path of the rule's single output.
  pub target: PathBuf,
  /// Input paths followed by the recorded outputs of every dependency.
  pub sources: Vec<PathBuf>,
}

impl<E: Clone> BuildStep<'_, E> {
  pub fn label(&self) -> &Label {
    self.rule.name()
  }

  pub fn env(&self) -> &E {
    &self.env
  }

  /// Whether a dependency's exported settings produced a private copy of the
  /// environment.
  pub fn env_is_exported(&self) -> bool {
    matches!(self.env, Cow::Owned(_))
  }
}

/// Errors raised while running builders over a build order.
#[derive(Debug, Error)]
pub enum DispatchError {
  #[error("no builder kind declared for {0}")]
  MissingKind(Label),

  #[error("no handler registered for {kind} (rule {rule})")]
  NoHandler { rule: Label, kind: BuilderKind },

  #[error("{rule} must declare exactly one output, found {count}")]
  OutputCount { rule: Label, count: usize },

  #[error("{rule} needs the outputs of {dependency}, which has not been built")]
  MissingUpstreamOutput { rule: Label, dependency: Label },

  #[error("builder for {rule} failed: {source}")]
  Handler { rule: Label, source: HandlerError },
}

/// One rule that a handler built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuiltRule {
  pub rule: Label,
  pub variant: Variant,
  pub outputs: Vec<PathBuf>,
}

/// The rules built by a dispatch, in the order they ran.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
  built: Vec<BuiltRule>,
}

impl DispatchReport {
  pub(super) fn record(&mut self, rule: Label, variant: Variant, outputs: Vec<PathBuf>) {
    self.built.push(BuiltRule { rule, variant, outputs });
  }

  pub fn built(&self) -> &[BuiltRule] {
    &self.built
  }

  pub fn len(&self) -> usize {
    self.built.len()
  }

  pub fn is_empty(&self) -> bool {
    self.built.is_empty()
  }

  /// Outputs recorded for `rule`, which also serve as its alias.
  pub fn outputs_of(&self, rule: &Label) -> Option<&[PathBuf]> {
    self
      .built
      .iter()
      .find(|built| &built.rule == rule)
      .map(|built| built.outputs.as_slice())
  }
}
