//! The state of one build pass.
//!
//! A [`BuildContext`] collects rules and their attributes during the
//! declaration phase, computes the build order in the scheduling phase, and
//! records builder outputs in the execution phase. Each operation checks the
//! current [`Phase`] and fails with [`StateError`] when it is out of place.

mod types;

use std::fmt;
use std::path::PathBuf;

use tracing::{debug, info};

pub use types::{Environment, ExportEnv, Phase, RuleAttributes, StateError};

use crate::dispatch::BuilderKind;
use crate::error::{Error, Result};
use crate::label::{Label, PackageName};
use crate::order::{BuildOrder, Variant, VariantResolver};
use crate::package::PackageAttributes;
use crate::rule::{Rule, RuleRegistry};

pub struct BuildContext<E> {
  phase: Phase,
  rules: RuleRegistry,
  attributes: RuleAttributes<E>,
  variants: PackageAttributes<Variant>,
  environments: PackageAttributes<E>,
}

impl<E: Environment> Default for BuildContext<E> {
  fn default() -> Self {
    Self::new()
  }
}

impl<E: Environment> BuildContext<E> {
  pub fn new() -> Self {
    Self {
      phase: Phase::Declaration,
      rules: RuleRegistry::new(),
      attributes: RuleAttributes::default(),
      variants: PackageAttributes::new("variant"),
      environments: PackageAttributes::new("environment"),
    }
  }

  /// A context whose packages fall back to `root` for their environment.
  pub fn with_root_environment(root: E) -> Self {
    let mut ctx = Self::new();
    ctx.environments.set_default(root);
    ctx
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  pub fn rules(&self) -> &RuleRegistry {
    &self.rules
  }

  pub fn attributes(&self) -> &RuleAttributes<E> {
    &self.attributes
  }

  pub fn package_variants(&self) -> &PackageAttributes<Variant> {
    &self.variants
  }

  pub fn package_environments(&self) -> &PackageAttributes<E> {
    &self.environments
  }

  // Declaration phase

  pub fn declare_rule(&mut self, rule: Rule) -> Result<()> {
    self.require("declare rule", &[Phase::Declaration])?;
    self.rules.add(rule)?;
    Ok(())
  }

  pub fn set_package_variant(&mut self, package: &PackageName, variant: impl Into<Variant>) -> Result<()> {
    self.require("set package variant", &[Phase::Declaration])?;
    let variant = variant.into();
    debug!(package = %package, variant = %variant, "package variant set");
    self.variants.insert(package, variant)?;
    Ok(())
  }

  pub fn set_default_variant(&mut self, variant: impl Into<Variant>) -> Result<()> {
    self.require("set default variant", &[Phase::Declaration])?;
    self.variants.set_default(variant.into());
    Ok(())
  }

  pub fn set_package_environment(&mut self, package: &PackageName, env: E) -> Result<()> {
    self.require("set package environment", &[Phase::Declaration])?;
    self.environments.insert(package, env)?;
    Ok(())
  }

  pub fn set_root_environment(&mut self, env: E) -> Result<()> {
    self.require("set root environment", &[Phase::Declaration])?;
    self.environments.set_default(env);
    Ok(())
  }

  pub fn set_rule_variant(&mut self, rule: &Label, variant: impl Into<Variant>) -> Result<()> {
    self.require_declared("set rule variant", rule)?;
    self.attributes.variants.insert(rule.clone(), variant.into());
    Ok(())
  }

  pub fn set_rule_kind(&mut self, rule: &Label, kind: BuilderKind) -> Result<()> {
    self.require_declared("set rule kind", rule)?;
    self.attributes.kinds.insert(rule.clone(), kind);
    Ok(())
  }

  pub fn set_rule_environment(&mut self, rule: &Label, env: E) -> Result<()> {
    self.require_declared("set rule environment", rule)?;
    self.attributes.environments.insert(rule.clone(), env);
    Ok(())
  }

  pub fn set_rule_export(&mut self, rule: &Label, export: impl Fn(&mut E) + 'static) -> Result<()> {
    self.require_declared("set rule export", rule)?;
    self.attributes.exports.insert(rule.clone(), Box::new(export));
    Ok(())
  }

  // Queries

  /// The rule's own variant, if one was set on it directly.
  pub fn rule_variant(&self, rule: &Label) -> Option<&Variant> {
    self.attributes.variant(rule)
  }

  pub fn rule_kind(&self, rule: &Label) -> Option<BuilderKind> {
    self.attributes.kind(rule)
  }

  pub fn rule_outputs(&self, rule: &Label) -> Option<&[PathBuf]> {
    self.attributes.outputs(rule)
  }

  pub fn variant_resolver(&self) -> VariantResolver<'_> {
    VariantResolver::new(&self.variants).with_overrides(&self.attributes.variants)
  }

  /// Rule variant, else closest package variant, else the default variant.
  pub fn resolve_variant(&self, rule: &Label) -> Result<&Variant> {
    Ok(self.variant_resolver().resolve(rule)?)
  }

  /// Rule environment, else closest package environment, else the root
  /// environment.
  pub fn resolve_environment(&self, rule: &Label) -> Result<&E> {
    if let Some(env) = self.attributes.environment(rule) {
      return Ok(env);
    }
    Ok(self.environments.resolve(rule.package())?)
  }

  // Scheduling phase

  pub fn compute_build_order(&mut self, variants: &[Variant]) -> Result<BuildOrder> {
    self.enter_scheduling("compute build order")?;
    Ok(BuildOrder::compute(&self.rules, &self.variant_resolver(), variants)?)
  }

  pub fn compute_unvaried_order(&mut self) -> Result<BuildOrder> {
    self.enter_scheduling("compute unvaried order")?;
    Ok(BuildOrder::unvaried(&self.rules)?)
  }

  // Execution phase

  pub fn begin_execution(&mut self) -> Result<()> {
    self.require("begin execution", &[Phase::Scheduling])?;
    self.phase = Phase::Execution;
    info!(rules = self.rules.len(), "execution phase started");
    Ok(())
  }

  pub fn set_rule_outputs(&mut self, rule: &Label, outputs: Vec<PathBuf>) -> Result<()> {
    self.require("set rule outputs", &[Phase::Execution])?;
    if !self.rules.contains(rule) {
      return Err(Error::UnknownRule(rule.clone()));
    }
    debug!(rule = %rule, outputs = outputs.len(), "rule outputs recorded");
    self.attributes.outputs.insert(rule.clone(), outputs);
    Ok(())
  }

  pub(crate) fn require(&self, operation: &'static str, allowed: &[Phase]) -> Result<(), StateError> {
    if allowed.contains(&self.phase) {
      Ok(())
    } else {
      Err(StateError {
        operation,
        phase: self.phase,
      })
    }
  }

  fn require_declared(&self, operation: &'static str, rule: &Label) -> Result<()> {
    self.require(operation, &[Phase::Declaration])?;
    if self.rules.contains(rule) {
      Ok(())
    } else {
      Err(Error::UnknownRule(rule.clone()))
    }
  }

  fn enter_scheduling(&mut self, operation: &'static str) -> Result<(), StateError> {
    self.require(operation, &[Phase::Declaration, Phase::Scheduling])?;
    if self.phase == Phase::Declaration {
      info!(rules = self.rules.len(), "scheduling phase started");
    }
    self.phase = Phase::Scheduling;
    Ok(())
  }
}

impl<E: fmt::Debug> fmt::Debug for BuildContext<E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("BuildContext")
      .field("phase", &self.phase)
      .field("rules", &self.rules)
      .field("attributes", &self.attributes)
      .field("variants", &self.variants)
      .field("environments", &self.environments)
      .finish()
  }
}
