use std::fmt;

use indexmap::IndexMap;
use tracing::{debug, error};

use super::types::{Rule, RuleError};
use crate::label::{Label, PackageName};
use crate::package::PackageTrie;
use crate::schedule::{CycleError, topological_sort};

/// Every rule declared for a build pass, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
  rules: IndexMap<Label, Rule>,
  packages: PackageTrie<()>,
}

impl RuleRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add(&mut self, rule: Rule) -> Result<(), RuleError> {
    if self.rules.contains_key(rule.name()) {
      return Err(RuleError::Duplicate(rule.name().clone()));
    }
    self.packages.insert(rule.name().package(), ())?;

    debug!(rule = %rule.name(), depends = rule.depends().len(), "rule added");
    self.rules.insert(rule.name().clone(), rule);
    Ok(())
  }

  pub fn contains(&self, label: &Label) -> bool {
    self.rules.contains_key(label)
  }

  pub fn get(&self, label: &Label) -> Option<&Rule> {
    self.rules.get(label)
  }

  pub fn iter(&self) -> impl Iterator<Item = &Rule> {
    self.rules.values()
  }

  pub fn labels(&self) -> impl Iterator<Item = &Label> {
    self.rules.keys()
  }

  pub fn len(&self) -> usize {
    self.rules.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rules.is_empty()
  }

  pub fn in_package<'a>(&'a self, package: &'a PackageName) -> impl Iterator<Item = &'a Rule> + 'a {
    self.rules.values().filter(move |rule| rule.name().package() == package)
  }

  /// The most specific package with declared rules that is `package` itself or
  /// one of its ancestors.
  pub fn enclosing_package(&self, package: &PackageName) -> Option<&PackageName> {
    self.packages.search(package).map(|(name, _)| name)
  }

  /// `(rule, dependency)` pairs where the dependency was never declared.
  pub fn missing_dependencies(&self) -> impl Iterator<Item = (&Label, &Label)> {
    self.rules.values().flat_map(move |rule| {
      rule
        .depends()
        .iter()
        .filter(move |depend| !self.rules.contains_key(*depend))
        .map(move |depend| (rule.name(), depend))
    })
  }

  /// Report every dangling dependency at once.
  pub fn check_dependencies(&self) -> Result<(), MissingDependencies> {
    let entries: Vec<MissingDependency> = self
      .missing_dependencies()
      .map(|(rule, missing)| {
        let candidate_package = self.candidate_package(missing.package());
        let candidates: Vec<Label> = candidate_package
          .map(|package| self.in_package(package).map(|rule| rule.name().clone()).collect())
          .unwrap_or_default();

        error!(
          rule = %rule,
          dependency = %missing,
          candidates = candidates.len(),
          "depends on non-existing rule"
        );

        MissingDependency {
          rule: rule.clone(),
          missing: missing.clone(),
          candidate_package: candidate_package.cloned(),
          candidates,
        }
      })
      .collect();

    if entries.is_empty() {
      Ok(())
    } else {
      Err(MissingDependencies { entries })
    }
  }

  /// All rules, each after the rules it depends on.
  ///
  /// Dependencies that are not declared are ignored; run
  /// [`check_dependencies`](Self::check_dependencies) first.
  pub fn sorted(&self) -> Result<Vec<Label>, CycleError<Label>> {
    topological_sort(self.rules.keys().cloned(), |label| {
      self
        .rules
        .get(label)
        .map(|rule| rule.depends().to_vec())
        .unwrap_or_default()
    })
  }

  fn candidate_package<'a>(&'a self, package: &'a PackageName) -> Option<&'a PackageName> {
    if self.packages.contains(package) {
      Some(package)
    } else {
      self.enclosing_package(package)
    }
  }
}

/// One dangling dependency, with the rules that exist near it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDependency {
  pub rule: Label,
  pub missing: Label,
  /// The missing label's package when it has rules, else its closest
  /// ancestor package that does.
  pub candidate_package: Option<PackageName>,
  pub candidates: Vec<Label>,
}

impl fmt::Display for MissingDependency {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} depends on non-existing {}", self.rule, self.missing)?;
    if let Some(package) = &self.candidate_package {
      write!(f, "\nTargets in package {}:", package)?;
      for candidate in &self.candidates {
        write!(f, "\n    {}", candidate)?;
      }
    }
    Ok(())
  }
}

/// Every dangling dependency found in a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDependencies {
  entries: Vec<MissingDependency>,
}

impl MissingDependencies {
  pub fn entries(&self) -> &[MissingDependency] {
    &self.entries
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl fmt::Display for MissingDependencies {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "missing dependencies")?;
    for entry in &self.entries {
      write!(f, "\n{}\n", entry)?;
    }
    Ok(())
  }
}

impl std::error::Error for MissingDependencies {}
