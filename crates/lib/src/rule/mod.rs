//! Build rules and the registry that holds them.
//!
//! A [`Rule`] is validated once when it is constructed and never changes
//! afterwards. Per-rule attributes decided later (variant, environment,
//! builder outputs) live in the build context, not on the rule.

mod registry;
mod types;

pub use registry::{MissingDependencies, MissingDependency, RuleRegistry};
pub use types::{Rule, RuleError};
