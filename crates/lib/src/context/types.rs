use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::dispatch::BuilderKind;
use crate::label::Label;
use crate::order::Variant;

/// The compilation environment handed to builders.
///
/// The build core never looks inside an environment. It only stores them per
/// package and per rule, compares them, and clones one before applying
/// exported settings of dependencies.
pub trait Environment: Clone + PartialEq + 'static {}

impl<T: Clone + PartialEq + 'static> Environment for T {}

/// A hook that a rule exports to the rules depending on it, applied to a copy
/// of each dependent's environment.
pub type ExportEnv<E> = Box<dyn Fn(&mut E)>;

/// The stages of a build pass. A context only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
  Declaration,
  Scheduling,
  Execution,
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Phase::Declaration => f.write_str("declaration"),
      Phase::Scheduling => f.write_str("scheduling"),
      Phase::Execution => f.write_str("execution"),
    }
  }
}

/// An operation was attempted in a phase that does not permit it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} is not allowed in the {phase} phase")]
pub struct StateError {
  pub operation: &'static str,
  pub phase: Phase,
}

/// Per-rule attributes, one typed map per concern.
pub struct RuleAttributes<E> {
  pub(super) variants: HashMap<Label, Variant>,
  pub(super) kinds: HashMap<Label, BuilderKind>,
  pub(super) environments: HashMap<Label, E>,
  pub(super) exports: HashMap<Label, ExportEnv<E>>,
  pub(super) outputs: HashMap<Label, Vec<PathBuf>>,
}

impl<E> Default for RuleAttributes<E> {
  fn default() -> Self {
    Self {
      variants: HashMap::new(),
      kinds: HashMap::new(),
      environments: HashMap::new(),
      exports: HashMap::new(),
      outputs: HashMap::new(),
    }
  }
}

impl<E> RuleAttributes<E> {
  pub fn variants(&self) -> &HashMap<Label, Variant> {
    &self.variants
  }

  pub fn variant(&self, rule: &Label) -> Option<&Variant> {
    self.variants.get(rule)
  }

  pub fn kind(&self, rule: &Label) -> Option<BuilderKind> {
    self.kinds.get(rule).copied()
  }

  pub fn environment(&self, rule: &Label) -> Option<&E> {
    self.environments.get(rule)
  }

  pub fn export(&self, rule: &Label) -> Option<&ExportEnv<E>> {
    self.exports.get(rule)
  }

  pub fn outputs(&self, rule: &Label) -> Option<&[PathBuf]> {
    self.outputs.get(rule).map(Vec::as_slice)
  }
}

impl<E: fmt::Debug> fmt::Debug for RuleAttributes<E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RuleAttributes")
      .field("variants", &self.variants)
      .field("kinds", &self.kinds)
      .field("environments", &self.environments)
      .field("exports", &self.exports.keys().collect::<Vec<_>>())
      .field("outputs", &self.outputs)
      .finish()
  }
}
