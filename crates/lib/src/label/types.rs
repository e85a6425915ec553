use std::fmt;
use std::path::PathBuf;

use serde::{Serialize, Serializer};

use super::name::{NamingError, PackageName, TargetName};

/// Whether a label names a build rule or a source/output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LabelKind {
  Rule,
  File,
}

impl fmt::Display for LabelKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      LabelKind::Rule => f.write_str("rule"),
      LabelKind::File => f.write_str("file"),
    }
  }
}

/// A fully-qualified reference to a rule or a file, scoped by package.
///
/// Two labels are equal only when kind, package, and target all match:
/// `#p:x` as a rule label is a different value from `#p:x` as a file label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label {
  kind: LabelKind,
  package: PackageName,
  target: TargetName,
}

impl Label {
  pub fn new(kind: LabelKind, package: PackageName, target: TargetName) -> Self {
    Self { kind, package, target }
  }

  /// Parse a label relative to `current`.
  ///
  /// Accepted forms:
  /// - `#pkg:target` and `pkg:target`: explicit package
  /// - `#pkg`: explicit package, target named after the package basename
  /// - `:target` and `target`: target in `current`
  /// - `""`, `":"`, `"#:"`: `current` itself, target named after its basename
  pub fn parse(kind: LabelKind, raw: &str, current: &PackageName) -> Result<Self, NamingError> {
    let (package, target) = match raw.strip_prefix('#') {
      Some(rest) => rest.split_once(':').unwrap_or((rest, "")),
      None => raw.split_once(':').unwrap_or(("", raw)),
    };

    let package = if package.is_empty() {
      current.clone()
    } else {
      PackageName::new(package)?
    };
    let target = if target.is_empty() {
      TargetName::new(package.basename())?
    } else {
      TargetName::new(target)?
    };

    Ok(Self { kind, package, target })
  }

  pub fn rule(raw: &str, current: &PackageName) -> Result<Self, NamingError> {
    Self::parse(LabelKind::Rule, raw, current)
  }

  pub fn file(raw: &str, current: &PackageName) -> Result<Self, NamingError> {
    Self::parse(LabelKind::File, raw, current)
  }

  /// Parse a whitespace-separated string or an explicit list of label forms.
  pub fn parse_list(
    kind: LabelKind,
    raw: impl Into<RawLabels>,
    current: &PackageName,
  ) -> Result<Vec<Self>, NamingError> {
    raw
      .into()
      .into_items()
      .iter()
      .map(|item| Self::parse(kind, item, current))
      .collect()
  }

  pub fn kind(&self) -> LabelKind {
    self.kind
  }

  pub fn is_rule(&self) -> bool {
    self.kind == LabelKind::Rule
  }

  pub fn is_file(&self) -> bool {
    self.kind == LabelKind::File
  }

  pub fn package(&self) -> &PackageName {
    &self.package
  }

  pub fn target(&self) -> &TargetName {
    &self.target
  }

  /// `package/target` as a filesystem path.
  pub fn path(&self) -> PathBuf {
    PathBuf::from(self.package.path()).join(self.target.path())
  }

  /// The same package and target under another kind.
  pub fn with_kind(&self, kind: LabelKind) -> Self {
    Self {
      kind,
      package: self.package.clone(),
      target: self.target.clone(),
    }
  }

  /// Compare package and target, ignoring the kind.
  pub fn same_target(&self, other: &Label) -> bool {
    self.package == other.package && self.target == other.target
  }
}

impl fmt::Display for Label {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}:{}", self.package, self.target)
  }
}

impl Serialize for Label {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

/// Label forms as written by a declaration: a single whitespace-separated
/// string, or an explicit list where every item is one form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawLabels {
  Spaced(String),
  List(Vec<String>),
}

impl RawLabels {
  pub fn into_items(self) -> Vec<String> {
    match self {
      RawLabels::Spaced(raw) => raw.split_whitespace().map(str::to_string).collect(),
      RawLabels::List(items) => items,
    }
  }

  pub fn is_empty(&self) -> bool {
    match self {
      RawLabels::Spaced(raw) => raw.trim().is_empty(),
      RawLabels::List(items) => items.is_empty(),
    }
  }
}

impl Default for RawLabels {
  fn default() -> Self {
    RawLabels::List(Vec::new())
  }
}

impl From<&str> for RawLabels {
  fn from(raw: &str) -> Self {
    RawLabels::Spaced(raw.to_string())
  }
}

impl From<String> for RawLabels {
  fn from(raw: String) -> Self {
    RawLabels::Spaced(raw)
  }
}

impl From<Vec<String>> for RawLabels {
  fn from(items: Vec<String>) -> Self {
    RawLabels::List(items)
  }
}

impl From<Vec<&str>> for RawLabels {
  fn from(items: Vec<&str>) -> Self {
    RawLabels::List(items.into_iter().map(str::to_string).collect())
  }
}

impl From<&[&str]> for RawLabels {
  fn from(items: &[&str]) -> Self {
    RawLabels::List(items.iter().map(|s| s.to_string()).collect())
  }
}

impl From<&[String]> for RawLabels {
  fn from(items: &[String]) -> Self {
    RawLabels::List(items.to_vec())
  }
}

impl<const N: usize> From<[&str; N]> for RawLabels {
  fn from(items: [&str; N]) -> Self {
    RawLabels::List(items.iter().map(|s| s.to_string()).collect())
  }
}

impl<const N: usize> From<&[&str; N]> for RawLabels {
  fn from(items: &[&str; N]) -> Self {
    RawLabels::List(items.iter().map(|s| s.to_string()).collect())
  }
}
