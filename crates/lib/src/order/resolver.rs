use std::collections::HashMap;

use super::types::Variant;
use crate::label::Label;
use crate::package::{PackageAttributes, ResolutionError};

/// Decides which variant a rule is built in.
///
/// Precedence: the rule's own variant, then the closest package with a
/// variant, then the default variant of `packages`.
#[derive(Debug, Clone, Copy)]
pub struct VariantResolver<'a> {
  overrides: Option<&'a HashMap<Label, Variant>>,
  packages: &'a PackageAttributes<Variant>,
}

impl<'a> VariantResolver<'a> {
  pub fn new(packages: &'a PackageAttributes<Variant>) -> Self {
    Self {
      overrides: None,
      packages,
    }
  }

  pub fn with_overrides(mut self, overrides: &'a HashMap<Label, Variant>) -> Self {
    self.overrides = Some(overrides);
    self
  }

  pub fn resolve(&self, rule: &Label) -> Result<&'a Variant, ResolutionError> {
    if let Some(variant) = self.overrides.and_then(|overrides| overrides.get(rule)) {
      return Ok(variant);
    }
    self.packages.resolve(rule.package())
  }
}
