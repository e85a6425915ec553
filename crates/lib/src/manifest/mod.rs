//! JSON build manifests.
//!
//! Manifests let declarations come from a file instead of code. See
//! [`BuildManifest`] for the format.

mod types;

pub use types::*;

use tracing::info;

use crate::context::{BuildContext, Environment};
use crate::declare::RuleDecl;
use crate::error::Result;
use crate::label::Label;

impl BuildManifest {
  pub fn from_json(json: &str) -> std::result::Result<Self, ManifestError> {
    Ok(serde_json::from_str(json)?)
  }

  pub fn to_json(&self) -> std::result::Result<String, ManifestError> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  /// Declare everything in the manifest on `ctx` and return the rule labels
  /// in manifest order.
  pub fn apply<E: Environment>(&self, ctx: &mut BuildContext<E>) -> Result<Vec<Label>> {
    if let Some(variant) = &self.default_variant {
      ctx.set_default_variant(variant.clone())?;
    }
    for (package, config) in &self.packages {
      if let Some(variant) = &config.variant {
        ctx.set_package_variant(package, variant.clone())?;
      }
    }

    let labels = self
      .rules
      .iter()
      .map(|entry| {
        let mut decl = RuleDecl::new(entry.kind, &entry.name)
          .srcs(entry.srcs.clone())
          .deps(entry.deps.clone());
        if let Some(variant) = &entry.variant {
          decl = decl.variant(variant.clone());
        }
        ctx.declare(decl, &entry.package)
      })
      .collect::<Result<Vec<_>>>()?;

    info!(
      packages = self.packages.len(),
      rules = labels.len(),
      "manifest applied"
    );
    Ok(labels)
  }
}
