//! pkgsched-lib: build dependency modeling and scheduling
//!
//! This crate turns declared build rules into a deterministic build order:
//! - `label`: package, target, and label names with shorthand parsing
//! - `package`: longest-prefix package attributes (variant, environment)
//! - `rule`: validated rules and the rule registry
//! - `schedule`: a generic, stable topological sort
//! - `order`: variant-aware build order computation
//! - `context`: the phased state of one build pass
//! - `declare`: program and library declarations in label shorthand
//! - `dispatch`: running builder handlers over a build order
//! - `manifest`: declarations loaded from JSON

pub mod context;
pub mod declare;
pub mod dispatch;
pub mod error;
pub mod label;
pub mod manifest;
pub mod order;
pub mod package;
pub mod rule;
pub mod schedule;

pub use error::{Error, Result};
