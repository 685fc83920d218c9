// SPDX-License-Identifier: GPL-3.0-only

//! Named UI actions
//!
//! Keys resolve to action names; names resolve to plain functions over the
//! UI context. Registering the same name twice replaces the handler.

use crate::errors::{AppError, AppResult};
use std::collections::BTreeMap;
use tracing::trace;

/// Handler invoked for an action
pub type ActionFn<C> = fn(&mut C) -> AppResult<()>;

/// Action name to handler lookup
pub struct ActionRegistry<C> {
    actions: BTreeMap<&'static str, ActionFn<C>>,
}

impl<C> Default for ActionRegistry<C> {
    fn default() -> Self {
        Self {
            actions: BTreeMap::new(),
        }
    }
}

impl<C> std::fmt::Debug for ActionRegistry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.names())
            .finish()
    }
}

impl<C> ActionRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &'static str, action: ActionFn<C>) {
        self.actions.insert(name, action);
    }

    /// Builder form of [`register`](Self::register)
    pub fn with(mut self, name: &'static str, action: ActionFn<C>) -> Self {
        self.register(name, action);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&'static str> {
        self.actions.keys().copied().collect()
    }

    /// Run the named action against `context`
    pub fn invoke(&self, name: &str, context: &mut C) -> AppResult<()> {
        let action = self
            .actions
            .get(name)
            .ok_or_else(|| AppError::Other(format!("unknown action '{}'", name)))?;
        trace!(action = name, "Invoking action");
        action(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        hits: u32,
    }

    fn bump(c: &mut Counter) -> AppResult<()> {
        c.hits += 1;
        Ok(())
    }

    fn fail(_: &mut Counter) -> AppResult<()> {
        Err(AppError::Other("nope".into()))
    }

    #[test]
    fn test_invoke_registered() {
        let registry = ActionRegistry::new().with("bump", bump);
        let mut ctx = Counter::default();
        registry.invoke("bump", &mut ctx).unwrap();
        registry.invoke("bump", &mut ctx).unwrap();
        assert_eq!(ctx.hits, 2);
    }

    #[test]
    fn test_invoke_unknown() {
        let registry: ActionRegistry<Counter> = ActionRegistry::new();
        let mut ctx = Counter::default();
        assert!(matches!(
            registry.invoke("missing", &mut ctx),
            Err(AppError::Other(_))
        ));
    }

    #[test]
    fn test_handler_error_propagates() {
        let registry = ActionRegistry::new().with("fail", fail);
        let mut ctx = Counter::default();
        assert!(registry.invoke("fail", &mut ctx).is_err());
    }

    #[test]
    fn test_names_sorted() {
        let registry = ActionRegistry::new().with("b", bump).with("a", fail);
        assert_eq!(registry.names(), vec!["a", "b"]);
        assert!(registry.contains("a"));
        assert!(!registry.contains("c"));
    }
}
