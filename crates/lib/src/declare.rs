//! Declaring rules the way build files write them.
//!
//! A [`RuleDecl`] names a rule relative to the package being declared and
//! lists its sources and dependencies in label shorthand. The rule's single
//! output is a file named like the rule itself.

use std::fmt;

use tracing::debug;

use crate::context::{BuildContext, Environment, ExportEnv, Phase};
use crate::dispatch::BuilderKind;
use crate::error::Result;
use crate::label::{Label, LabelKind, PackageName, RawLabels};
use crate::order::Variant;
use crate::rule::Rule;

/// A program or library declaration awaiting [`BuildContext::declare`].
pub struct RuleDecl<E> {
  kind: BuilderKind,
  name: String,
  srcs: RawLabels,
  deps: RawLabels,
  variant: Option<Variant>,
  env: Option<E>,
  export_env: Option<ExportEnv<E>>,
}

impl<E: Environment> RuleDecl<E> {
  pub fn new(kind: BuilderKind, name: impl Into<String>) -> Self {
    Self {
      kind,
      name: name.into(),
      srcs: RawLabels::default(),
      deps: RawLabels::default(),
      variant: None,
      env: None,
      export_env: None,
    }
  }

  pub fn program(name: impl Into<String>) -> Self {
    Self::new(BuilderKind::Program, name)
  }

  pub fn library(name: impl Into<String>) -> Self {
    Self::new(BuilderKind::StaticLibrary, name)
  }

  pub fn srcs(mut self, srcs: impl Into<RawLabels>) -> Self {
    self.srcs = srcs.into();
    self
  }

  pub fn deps(mut self, deps: impl Into<RawLabels>) -> Self {
    self.deps = deps.into();
    self
  }

  /// Build this rule in `variant` regardless of its package's variant.
  pub fn variant(mut self, variant: impl Into<Variant>) -> Self {
    self.variant = Some(variant.into());
    self
  }

  /// Build this rule with `env` instead of its package's environment.
  pub fn env(mut self, env: E) -> Self {
    self.env = Some(env);
    self
  }

  /// Settings applied to the environment of every rule that depends on this
  /// one.
  pub fn export_env(mut self, export: impl Fn(&mut E) + 'static) -> Self {
    self.export_env = Some(Box::new(export));
    self
  }

  pub fn kind(&self) -> BuilderKind {
    self.kind
  }

  pub fn name(&self) -> &str {
    &self.name
  }
}

impl<E: fmt::Debug> fmt::Debug for RuleDecl<E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RuleDecl")
      .field("kind", &self.kind)
      .field("name", &self.name)
      .field("srcs", &self.srcs)
      .field("deps", &self.deps)
      .field("variant", &self.variant)
      .field("env", &self.env)
      .field("export_env", &self.export_env.is_some())
      .finish()
  }
}

impl<E: Environment> BuildContext<E> {
  /// Declare `decl` from within package `current` and return its label.
  pub fn declare(&mut self, decl: RuleDecl<E>, current: &PackageName) -> Result<Label> {
    self.require("declare", &[Phase::Declaration])?;

    let name = Label::rule(&decl.name, current)?;
    let inputs = Label::parse_list(LabelKind::File, decl.srcs, current)?;
    let depends = Label::parse_list(LabelKind::Rule, decl.deps, current)?;
    let outputs = vec![name.with_kind(LabelKind::File)];

    self.declare_rule(Rule::new(name.clone(), inputs, depends, outputs)?)?;
    self.set_rule_kind(&name, decl.kind)?;
    if let Some(variant) = decl.variant {
      self.set_rule_variant(&name, variant)?;
    }
    if let Some(env) = decl.env {
      self.set_rule_environment(&name, env)?;
    }
    if let Some(export) = decl.export_env {
      self.set_rule_export(&name, export)?;
    }

    debug!(rule = %name, kind = %decl.kind, "rule declared");
    Ok(name)
  }
}
