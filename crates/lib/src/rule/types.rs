use serde::Serialize;
use thiserror::Error;

use crate::label::{Label, LabelKind};
use crate::package::TrieError;

/// Errors raised while constructing or registering rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
  /// A label was used where a label of the other kind is required.
  #[error("{role} {label} is not a {expected} label")]
  WrongKind {
    role: &'static str,
    label: Label,
    expected: LabelKind,
  },

  #[error("input outside the package: {input}, {rule}")]
  InputOutsidePackage { rule: Label, input: Label },

  #[error("output outside the package: {output}, {rule}")]
  OutputOutsidePackage { rule: Label, output: Label },

  /// The rule lists itself as a dependency or as one of its inputs.
  #[error("{0} depends on itself")]
  SelfDependency(Label),

  #[error("rule already declared: {0}")]
  Duplicate(Label),

  /// The registry's package index rejected the rule's package.
  #[error(transparent)]
  PackageIndex(#[from] TrieError),
}

/// A build rule: what a target consumes, what it waits for, what it produces.
///
/// Inputs and outputs are file labels in the rule's own package. Dependencies
/// are rule labels anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
  name: Label,
  inputs: Vec<Label>,
  depends: Vec<Label>,
  outputs: Vec<Label>,
}

impl Rule {
  pub fn new(name: Label, inputs: Vec<Label>, depends: Vec<Label>, outputs: Vec<Label>) -> Result<Self, RuleError> {
    expect_kind("rule", &name, LabelKind::Rule)?;

    for input in &inputs {
      expect_kind("input", input, LabelKind::File)?;
      if input.package() != name.package() {
        return Err(RuleError::InputOutsidePackage {
          rule: name,
          input: input.clone(),
        });
      }
      if input.same_target(&name) {
        return Err(RuleError::SelfDependency(name));
      }
    }

    for depend in &depends {
      expect_kind("dependency", depend, LabelKind::Rule)?;
      if *depend == name {
        return Err(RuleError::SelfDependency(name));
      }
    }

    for output in &outputs {
      expect_kind("output", output, LabelKind::File)?;
      if output.package() != name.package() {
        return Err(RuleError::OutputOutsidePackage {
          rule: name,
          output: output.clone(),
        });
      }
    }

    Ok(Self {
      name,
      inputs,
      depends,
      outputs,
    })
  }

  pub fn name(&self) -> &Label {
    &self.name
  }

  pub fn inputs(&self) -> &[Label] {
    &self.inputs
  }

  pub fn depends(&self) -> &[Label] {
    &self.depends
  }

  pub fn outputs(&self) -> &[Label] {
    &self.outputs
  }
}

fn expect_kind(role: &'static str, label: &Label, expected: LabelKind) -> Result<(), RuleError> {
  if label.kind() == expected {
    Ok(())
  } else {
    Err(RuleError::WrongKind {
      role,
      label: label.clone(),
      expected,
    })
  }
}
