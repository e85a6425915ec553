//! Validated package and target names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a package, target, or label string is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
  #[error("empty name")]
  Empty,

  #[error("leading or trailing path separator: {0}")]
  SurroundingSeparator(String),

  #[error("consecutive path separators: {0}")]
  ConsecutiveSeparators(String),

  #[error("invalid name character {ch:?}: {name}")]
  InvalidCharacter { name: String, ch: char },
}

fn is_name_char(ch: char) -> bool {
  ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-' | '/')
}

/// Check that `name` is a well-formed slash-delimited name.
///
/// Names are non-empty, have no leading or trailing `/`, no `//`, and only
/// contain characters from `[A-Za-z0-9_.\-/]`.
pub fn check_name(name: &str) -> Result<(), NamingError> {
  if name.is_empty() {
    return Err(NamingError::Empty);
  }
  if name.starts_with('/') || name.ends_with('/') {
    return Err(NamingError::SurroundingSeparator(name.to_string()));
  }
  if name.contains("//") {
    return Err(NamingError::ConsecutiveSeparators(name.to_string()));
  }
  if let Some(ch) = name.chars().find(|&ch| !is_name_char(ch)) {
    return Err(NamingError::InvalidCharacter {
      name: name.to_string(),
      ch,
    });
  }
  Ok(())
}

/// A slash-delimited namespace path such as `a/b/c`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageName(String);

impl PackageName {
  pub fn new(name: impl Into<String>) -> Result<Self, NamingError> {
    let name = name.into();
    check_name(&name)?;
    Ok(Self(name))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// The package path, used as a directory relative to the source root.
  pub fn path(&self) -> &str {
    &self.0
  }

  /// Last path component (`c` for `a/b/c`).
  pub fn basename(&self) -> &str {
    self.0.rsplit('/').next().unwrap_or(&self.0)
  }

  pub fn components(&self) -> impl Iterator<Item = &str> {
    self.0.split('/')
  }

  /// Package one level up, or `None` for a single-component package.
  pub fn parent(&self) -> Option<PackageName> {
    self.0.rsplit_once('/').map(|(parent, _)| PackageName(parent.to_string()))
  }

  /// Append a relative path, e.g. `a/b` + `c/d` = `a/b/c/d`.
  pub fn join(&self, child: &str) -> Result<PackageName, NamingError> {
    PackageName::new(format!("{}/{}", self.0, child))
  }

  /// Whether `self` is `other` or one of its ancestors.
  ///
  /// Matching is by whole components, so `a/b` is not a prefix of `a/bc`.
  pub fn is_prefix_of(&self, other: &PackageName) -> bool {
    match other.0.strip_prefix(self.0.as_str()) {
      Some(rest) => rest.is_empty() || rest.starts_with('/'),
      None => false,
    }
  }
}

impl fmt::Display for PackageName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl AsRef<str> for PackageName {
  fn as_ref(&self) -> &str {
    &self.0
  }
}

impl FromStr for PackageName {
  type Err = NamingError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    PackageName::new(s)
  }
}

impl TryFrom<String> for PackageName {
  type Error = NamingError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    PackageName::new(value)
  }
}

impl From<PackageName> for String {
  fn from(name: PackageName) -> Self {
    name.0
  }
}

/// A target identifier local to a package. Never interchangeable with
/// [`PackageName`] even though both share the same syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetName(String);

impl TargetName {
  pub fn new(name: impl Into<String>) -> Result<Self, NamingError> {
    let name = name.into();
    check_name(&name)?;
    Ok(Self(name))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn path(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for TargetName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl FromStr for TargetName {
  type Err = NamingError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    TargetName::new(s)
  }
}
