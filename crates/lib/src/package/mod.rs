//! Hierarchical package attributes.
//!
//! Packages form a tree by path. Values attached to a package (its variant,
//! its compilation environment) apply to every package below it unless a more
//! specific package sets its own. [`PackageTrie`] provides the longest-prefix
//! lookup; [`PackageAttributes`] adds a process-wide default on top.

mod attributes;
mod trie;

pub use attributes::{PackageAttributes, ResolutionError};
pub use trie::{PackageTrie, TrieError};
