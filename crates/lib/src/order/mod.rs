//! Variant-aware build ordering.
//!
//! Every rule is built in exactly one [`Variant`]. A rule may depend on a rule
//! of another variant, which makes the whole dependent variant wait for the
//! whole dependency variant. [`BuildOrder::compute`] orders the variants by
//! those cross-variant edges and the rules by their own dependencies, then
//! splits the global rule order into one bucket per variant.
//!
//! Within a bucket every rule still follows its same-variant dependencies,
//! because the split preserves the relative order of the global sort.

mod resolver;
mod types;

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, info};

pub use resolver::VariantResolver;
pub use types::{BuildOrder, BuildOrderError, Variant};

use crate::label::Label;
use crate::rule::RuleRegistry;
use crate::schedule::topological_sort;

impl BuildOrder {
  /// Schedule `rules` over the `declared` variants.
  ///
  /// Repeated variants in `declared` count once. Fails without a partial
  /// result: either every rule is placed or none is.
  pub fn compute(
    rules: &RuleRegistry,
    resolver: &VariantResolver<'_>,
    declared: &[Variant],
  ) -> Result<Self, BuildOrderError> {
    rules.check_dependencies()?;

    let mut resolved: HashMap<&Label, &Variant> = HashMap::with_capacity(rules.len());
    for rule in rules.iter() {
      resolved.insert(rule.name(), resolver.resolve(rule.name())?);
    }

    let mut variant_deps: IndexMap<Variant, IndexSet<Variant>> = IndexMap::new();
    for rule in rules.iter() {
      let variant = resolved[rule.name()];
      for depend in rule.depends() {
        let depend_variant = resolved[depend];
        if variant != depend_variant && variant_deps.entry(variant.clone()).or_default().insert(depend_variant.clone())
        {
          debug!(
            rule = %rule.name(),
            dependency = %depend,
            from = %variant,
            to = %depend_variant,
            "cross-variant edge"
          );
        }
      }
    }

    let variants = topological_sort(declared.iter().cloned(), |variant| {
      variant_deps
        .get(variant)
        .map(|deps| deps.iter().cloned().collect::<Vec<_>>())
        .unwrap_or_default()
    })
    .map_err(BuildOrderError::VariantCycle)?;

    let global = rules.sorted().map_err(BuildOrderError::RuleCycle)?;

    let mut buckets: IndexMap<Variant, Vec<Label>> =
      variants.iter().map(|variant| (variant.clone(), Vec::new())).collect();
    for label in global {
      let variant = resolved[&label];
      let Some(bucket) = buckets.get_mut(variant) else {
        return Err(BuildOrderError::UndeclaredVariant {
          rule: label,
          variant: variant.clone(),
        });
      };
      bucket.push(label);
    }

    if buckets.len() != variants.len() {
      return Err(BuildOrderError::BucketMismatch {
        buckets: buckets.len(),
        variants: variants.len(),
      });
    }

    let order = BuildOrder { buckets };
    info!(
      variants = order.buckets.len(),
      rules = order.rule_count(),
      "build order computed"
    );
    Ok(order)
  }

  /// Schedule `rules` without variants: one bucket under
  /// [`Variant::default()`] holding the global rule order.
  pub fn unvaried(rules: &RuleRegistry) -> Result<Self, BuildOrderError> {
    rules.check_dependencies()?;
    let global = rules.sorted().map_err(BuildOrderError::RuleCycle)?;

    info!(rules = global.len(), "unvaried build order computed");
    Ok(BuildOrder {
      buckets: IndexMap::from([(Variant::default(), global)]),
    })
  }
}
