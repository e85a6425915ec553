//! Running builders over a computed build order.
//!
//! Each rule is bound to a [`BuilderKind`] when it is declared, and a
//! [`Dispatcher`] maps every kind to a handler. Dispatch walks variants in
//! order and rules in bucket order, one at a time. A rule's sources are its
//! inputs followed by the outputs its dependencies produced earlier in the
//! same pass.

mod types;

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use tracing::{debug, info};

pub use types::{BuildStep, BuilderKind, BuiltRule, DispatchError, DispatchReport, Handler, HandlerError};

use crate::context::{BuildContext, Environment};
use crate::error::{Error, Result};
use crate::label::Label;
use crate::order::{BuildOrder, Variant};

/// A table of builder handlers keyed by builder kind.
pub struct Dispatcher<E: Environment> {
  handlers: HashMap<BuilderKind, Handler<E>>,
}

impl<E: Environment> Default for Dispatcher<E> {
  fn default() -> Self {
    Self::new()
  }
}

impl<E: Environment> Dispatcher<E> {
  pub fn new() -> Self {
    Self {
      handlers: HashMap::new(),
    }
  }

  /// Bind `handler` to `kind`, replacing any previous handler for it.
  pub fn register<F>(&mut self, kind: BuilderKind, handler: F)
  where
    F: FnMut(&BuildStep<'_, E>) -> std::result::Result<Vec<PathBuf>, HandlerError> + 'static,
  {
    self.handlers.insert(kind, Box::new(handler));
  }

  pub fn with_handler<F>(mut self, kind: BuilderKind, handler: F) -> Self
  where
    F: FnMut(&BuildStep<'_, E>) -> std::result::Result<Vec<PathBuf>, HandlerError> + 'static,
  {
    self.register(kind, handler);
    self
  }

  pub fn has_handler(&self, kind: BuilderKind) -> bool {
    self.handlers.contains_key(&kind)
  }

  /// Build every rule of `order`, moving `ctx` into the execution phase.
  ///
  /// Every scheduled rule is checked for a builder kind and a handler before
  /// the first handler runs. The first handler failure stops the pass.
  pub fn dispatch(&mut self, ctx: &mut BuildContext<E>, order: &BuildOrder) -> Result<DispatchReport> {
    self.preflight(ctx, order)?;
    ctx.begin_execution()?;
    info!(
      variants = order.variants_in_order().len(),
      rules = order.rule_count(),
      "dispatch started"
    );

    let mut report = DispatchReport::default();
    for (variant, labels) in order.iter() {
      debug!(variant = %variant, rules = labels.len(), "building variant");
      for label in labels {
        let outputs = self.build_rule(ctx, variant, label)?;
        ctx.set_rule_outputs(label, outputs.clone())?;
        report.record(label.clone(), variant.clone(), outputs);
      }
    }

    info!(built = report.len(), "dispatch finished");
    Ok(report)
  }

  fn preflight(&self, ctx: &BuildContext<E>, order: &BuildOrder) -> Result<()> {
    for (_, labels) in order.iter() {
      for label in labels {
        if !ctx.rules().contains(label) {
          return Err(Error::UnknownRule(label.clone()));
        }
        let kind = ctx
          .rule_kind(label)
          .ok_or_else(|| DispatchError::MissingKind(label.clone()))?;
        if !self.has_handler(kind) {
          return Err(
            DispatchError::NoHandler {
              rule: label.clone(),
              kind,
            }
            .into(),
          );
        }
      }
    }
    Ok(())
  }

  fn build_rule(&mut self, ctx: &BuildContext<E>, variant: &Variant, label: &Label) -> Result<Vec<PathBuf>> {
    let rule = ctx.rules().get(label).ok_or_else(|| Error::UnknownRule(label.clone()))?;
    let kind = ctx
      .rule_kind(label)
      .ok_or_else(|| DispatchError::MissingKind(label.clone()))?;

    let [output] = rule.outputs() else {
      return Err(
        DispatchError::OutputCount {
          rule: label.clone(),
          count: rule.outputs().len(),
        }
        .into(),
      );
    };

    let mut sources: Vec<PathBuf> = rule.inputs().iter().map(Label::path).collect();
    for depend in rule.depends() {
      let outputs = ctx
        .rule_outputs(depend)
        .ok_or_else(|| DispatchError::MissingUpstreamOutput {
          rule: label.clone(),
          dependency: depend.clone(),
        })?;
      sources.extend(outputs.iter().cloned());
    }

    let mut env = Cow::Borrowed(ctx.resolve_environment(label)?);
    for depend in rule.depends() {
      if let Some(export) = ctx.attributes().export(depend) {
        export(env.to_mut());
      }
    }

    let handler = self
      .handlers
      .get_mut(&kind)
      .ok_or_else(|| DispatchError::NoHandler {
        rule: label.clone(),
        kind,
      })?;

    let step = BuildStep {
      rule,
      kind,
      variant,
      env,
      target: output.path(),
      sources,
    };
    debug!(
      rule = %label,
      variant = %variant,
      kind = %kind,
      sources = step.sources.len(),
      exported_env = step.env_is_exported(),
      "dispatching rule"
    );

    handler(&step).map_err(|source| {
      Error::from(DispatchError::Handler {
        rule: label.clone(),
        source,
      })
    })
  }
}

impl<E: Environment> fmt::Debug for Dispatcher<E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut kinds: Vec<_> = self.handlers.keys().collect();
    kinds.sort();
    f.debug_struct("Dispatcher").field("handlers", &kinds).finish()
  }
}
