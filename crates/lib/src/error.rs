//! Crate-wide error type.
//!
//! Each module reports its own error enum; [`Error`] wraps all of them so
//! that entry points on [`BuildContext`](crate::context::BuildContext) can
//! propagate with `?` across modules.

use thiserror::Error;

use crate::context::StateError;
use crate::dispatch::DispatchError;
use crate::label::{Label, NamingError};
use crate::manifest::ManifestError;
use crate::order::BuildOrderError;
use crate::package::{ResolutionError, TrieError};
use crate::rule::RuleError;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Naming(#[from] NamingError),

  #[error(transparent)]
  Trie(#[from] TrieError),

  #[error(transparent)]
  Resolution(#[from] ResolutionError),

  #[error(transparent)]
  Rule(#[from] RuleError),

  #[error(transparent)]
  BuildOrder(#[from] BuildOrderError),

  #[error(transparent)]
  State(#[from] StateError),

  #[error(transparent)]
  Dispatch(#[from] DispatchError),

  #[error(transparent)]
  Manifest(#[from] ManifestError),

  /// An attribute or output was set for a rule that was never declared.
  #[error("unknown rule: {0}")]
  UnknownRule(Label),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
