//! Manifest types.
//!
//! A manifest is a serialized set of declarations: a default variant,
//! per-package variants, and rules. Applying it to a context is equivalent to
//! declaring the same rules with [`RuleDecl`](crate::declare::RuleDecl).
//!
//! # Example
//!
//! ```json
//! {
//!   "default_variant": "host",
//!   "variants": ["host", "arm"],
//!   "packages": { "firmware": { "variant": "arm" } },
//!   "rules": [
//!     { "package": "tools", "kind": "program", "name": "gen", "srcs": ["gen.c"] },
//!     { "package": "firmware", "kind": "program", "name": "image", "deps": ["#tools:gen"] }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dispatch::BuilderKind;
use crate::label::PackageName;
use crate::order::Variant;

/// Errors raised while reading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("invalid manifest: {0}")]
  Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildManifest {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub default_variant: Option<Variant>,

  /// Variants to schedule, in the order they are requested.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub variants: Vec<Variant>,

  /// Uses [`BTreeMap`] so that serialization order is deterministic.
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub packages: BTreeMap<PackageName, PackageConfig>,

  #[serde(default)]
  pub rules: Vec<RuleEntry>,
}

/// Attributes of one package and, through inheritance, of its subpackages.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageConfig {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub variant: Option<Variant>,
}

/// One rule, with labels written relative to `package`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleEntry {
  pub package: PackageName,
  pub kind: BuilderKind,
  pub name: String,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub srcs: Vec<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub deps: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub variant: Option<Variant>,
}
