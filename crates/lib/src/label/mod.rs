//! Package, target, and label names.
//!
//! A package is a slash-delimited namespace (`a/b/c`); a target is a name local
//! to a package. A [`Label`] pairs the two and records whether it refers to a
//! build rule or to a file. The canonical string form of a label is
//! `#<package>:<target>`.
//!
//! Labels are usually written relative to the package whose declarations are
//! being read, so parsing always takes the current package. See
//! [`Label::parse`] for the accepted shorthand forms.

mod name;
mod types;

pub use name::{NamingError, PackageName, TargetName, check_name};
pub use types::{Label, LabelKind, RawLabels};
