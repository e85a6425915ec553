use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::label::Label;
use crate::package::ResolutionError;
use crate::rule::MissingDependencies;
use crate::schedule::CycleError;

/// A named build configuration, such as `host` or a cross-compilation target.
///
/// Variants are opaque: two variants are the same exactly when their names
/// are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variant(String);

impl Variant {
  pub const DEFAULT_NAME: &'static str = "default";

  pub fn new(name: impl Into<String>) -> Self {
    Self(name.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl Default for Variant {
  fn default() -> Self {
    Self::new(Self::DEFAULT_NAME)
  }
}

impl fmt::Display for Variant {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for Variant {
  fn from(name: &str) -> Self {
    Self::new(name)
  }
}

impl From<String> for Variant {
  fn from(name: String) -> Self {
    Self(name)
  }
}

/// Errors that prevent a build order from being produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildOrderError {
  #[error(transparent)]
  MissingDependencies(#[from] MissingDependencies),

  #[error("rule {0}")]
  RuleCycle(CycleError<Label>),

  /// Variants depend on each other in both directions.
  #[error("variant {0}")]
  VariantCycle(CycleError<Variant>),

  #[error(transparent)]
  Resolution(#[from] ResolutionError),

  #[error("rule {rule} resolves to undeclared variant {variant}")]
  UndeclaredVariant { rule: Label, variant: Variant },

  /// Internal invariant: one bucket per requested variant.
  #[error("internal error: {buckets} buckets for {variants} variants")]
  BucketMismatch { buckets: usize, variants: usize },
}

/// The schedule for one build pass: variants in dependency order, each with
/// its rules in dependency order.
///
/// Every requested variant has a bucket, possibly empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct BuildOrder {
  pub(super) buckets: IndexMap<Variant, Vec<Label>>,
}

impl BuildOrder {
  pub fn variants_in_order(&self) -> impl ExactSizeIterator<Item = &Variant> {
    self.buckets.keys()
  }

  /// Rules of `variant` in build order; empty for variants not in the order.
  pub fn rules_for(&self, variant: &Variant) -> &[Label] {
    self.buckets.get(variant).map(Vec::as_slice).unwrap_or_default()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&Variant, &[Label])> {
    self.buckets.iter().map(|(variant, rules)| (variant, rules.as_slice()))
  }

  pub fn rule_count(&self) -> usize {
    self.buckets.values().map(Vec::len).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.buckets.is_empty()
  }
}
