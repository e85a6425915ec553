use thiserror::Error;

use super::trie::{PackageTrie, TrieError};
use crate::label::PackageName;

/// A package attribute could not be resolved: no package on the path has a
/// value and no default is set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no {attribute} resolvable for package {package}")]
pub struct ResolutionError {
  pub attribute: &'static str,
  pub package: PackageName,
}

/// A homogeneous trie of package attributes with an optional default.
///
/// A package inherits the value of its closest ancestor that has one; when no
/// ancestor does, the default applies.
#[derive(Debug, Clone)]
pub struct PackageAttributes<V> {
  attribute: &'static str,
  trie: PackageTrie<V>,
  default: Option<V>,
}

impl<V> PackageAttributes<V> {
  /// `attribute` names the value in resolution errors (`"variant"`).
  pub fn new(attribute: &'static str) -> Self {
    Self {
      attribute,
      trie: PackageTrie::new(),
      default: None,
    }
  }

  pub fn attribute(&self) -> &'static str {
    self.attribute
  }

  pub fn default_value(&self) -> Option<&V> {
    self.default.as_ref()
  }

  pub fn set_default(&mut self, value: V) {
    self.default = Some(value);
  }

  pub fn insert(&mut self, package: &PackageName, value: V) -> Result<(), TrieError>
  where
    V: PartialEq,
  {
    self.trie.insert(package, value)
  }

  /// Value set on exactly `package`, ignoring ancestors and the default.
  pub fn get(&self, package: &PackageName) -> Option<&V> {
    self.trie.get(package)
  }

  /// Closest ancestor value, else the default.
  pub fn lookup(&self, package: &PackageName) -> Option<&V> {
    self
      .trie
      .search(package)
      .map(|(_, value)| value)
      .or(self.default.as_ref())
  }

  pub fn resolve(&self, package: &PackageName) -> Result<&V, ResolutionError> {
    self.lookup(package).ok_or_else(|| ResolutionError {
      attribute: self.attribute,
      package: package.clone(),
    })
  }

  pub fn iter(&self) -> impl Iterator<Item = (&PackageName, &V)> {
    self.trie.iter()
  }
}
