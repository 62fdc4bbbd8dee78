//! Context persistence listeners.
//!
//! # Spring Security Equivalent
//! `SecurityContextPersistenceFilter` / `SecurityContextRepository`
//!
//! Stateful firewalls sharing a context key share one listener, so an
//! authentication made behind one firewall is visible behind the other.

use std::collections::HashMap;

use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextListener {
    pub id: String,
    pub context: String,
}

/// Context listeners, one per context key.
///
/// Ids are `security.context_listener.<n>` with `n` counting from zero in
/// creation order.
#[derive(Debug, Clone, Default)]
pub struct ContextListenerRegistry {
    by_context: HashMap<String, usize>,
    listeners: Vec<ContextListener>,
}

impl ContextListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the listener id for `context`, creating the listener once.
    pub fn resolve(&mut self, context: &str) -> String {
        if let Some(index) = self.by_context.get(context) {
            let id = &self.listeners[*index].id;
            debug!(context = %context, listener = %id, "reusing context listener");
            return id.clone();
        }

        let id = format!("security.context_listener.{}", self.listeners.len());
        self.by_context.insert(context.to_string(), self.listeners.len());
        self.listeners.push(ContextListener {
            id: id.clone(),
            context: context.to_string(),
        });
        id
    }

    pub fn listeners(&self) -> &[ContextListener] {
        &self.listeners
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
