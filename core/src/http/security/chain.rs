//! Plugin registration and ordering.
//!
//! # Spring Security Equivalent
//! `FilterOrderRegistration`

use std::fmt;

use tracing::debug;

use crate::http::error::ConfigError;
use crate::http::security::plugin::{normalize_key, FirewallPlugin};
use crate::http::security::plugins::{
    AccessControlPlugin, AnonymousAuthenticationPlugin, FormLoginPlugin, HttpBasicPlugin,
    RememberMePlugin, StatefulPlugin, SwitchUserPlugin,
};
use crate::http::security::position::PluginPosition;

/// The plugins an application knows about, in registration order.
///
/// # Example
/// ```
/// use actix_security_config::http::security::{PluginPosition, PluginRegistry};
///
/// let registry = PluginRegistry::with_defaults();
/// let chain = registry.sorted();
///
/// assert_eq!(chain.first().unwrap().position(), PluginPosition::AuthenticationForm);
/// assert!(registry.has_position(PluginPosition::AuthenticationAnonymous));
/// ```
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Box<dyn FirewallPlugin>>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in plugins.
    pub fn with_defaults() -> Self {
        PluginRegistry {
            plugins: vec![
                Box::new(FormLoginPlugin),
                Box::new(HttpBasicPlugin),
                Box::new(RememberMePlugin),
                Box::new(AnonymousAuthenticationPlugin),
                Box::new(StatefulPlugin),
                Box::new(SwitchUserPlugin),
                Box::new(AccessControlPlugin),
            ],
        }
    }

    /// Registers a plugin.
    ///
    /// Fails when another plugin already uses the same normalized key.
    pub fn register<P: FirewallPlugin + 'static>(&mut self, plugin: P) -> Result<(), ConfigError> {
        self.register_boxed(Box::new(plugin))
    }

    /// Registers a boxed plugin.
    pub fn register_boxed(&mut self, plugin: Box<dyn FirewallPlugin>) -> Result<(), ConfigError> {
        let key = normalize_key(plugin.key());
        if self.get(&key).is_some() {
            return Err(ConfigError::DuplicatePluginKey { key });
        }
        debug!(plugin = %key, position = %plugin.position(), "registered firewall plugin");
        self.plugins.push(plugin);
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_plugin<P: FirewallPlugin + 'static>(mut self, plugin: P) -> Result<Self, ConfigError> {
        self.register(plugin)?;
        Ok(self)
    }

    /// Looks a plugin up by key (dashes and underscores are equivalent).
    pub fn get(&self, key: &str) -> Option<&dyn FirewallPlugin> {
        let key = normalize_key(key);
        self.plugins
            .iter()
            .find(|p| normalize_key(p.key()) == key)
            .map(|p| &**p)
    }

    /// Whether any registered plugin occupies `position`.
    pub fn has_position(&self, position: PluginPosition) -> bool {
        self.plugins.iter().any(|p| p.position() == position)
    }

    /// Returns the plugins in pipeline order.
    pub fn sorted(&self) -> PluginChain<'_> {
        PluginChain::sort(self.plugins.iter().map(|p| &**p))
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.plugins.iter().map(|p| (p.key(), p.position())))
            .finish()
    }
}

// =============================================================================
// Plugin Chain
// =============================================================================

/// Plugins ordered by position; ties keep registration order.
#[derive(Clone)]
pub struct PluginChain<'a> {
    plugins: Vec<&'a dyn FirewallPlugin>,
}

impl<'a> PluginChain<'a> {
    /// Bucket-sorts plugins by position.
    ///
    /// Positions are walked in their fixed order and each bucket is filled in
    /// input order, so the result is stable.
    pub fn sort(plugins: impl IntoIterator<Item = &'a dyn FirewallPlugin>) -> Self {
        let plugins: Vec<&'a dyn FirewallPlugin> = plugins.into_iter().collect();
        let mut sorted = Vec::with_capacity(plugins.len());
        for position in PluginPosition::ALL {
            sorted.extend(plugins.iter().copied().filter(|p| p.position() == position));
        }
        PluginChain { plugins: sorted }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a dyn FirewallPlugin> + '_ {
        self.plugins.iter().copied()
    }

    pub fn first(&self) -> Option<&'a dyn FirewallPlugin> {
        self.plugins.first().copied()
    }

    /// Normalized keys, in chain order.
    pub fn keys(&self) -> Vec<String> {
        self.plugins.iter().map(|p| normalize_key(p.key())).collect()
    }

    /// Whether any plugin in the chain occupies `position`.
    pub fn has_position(&self, position: PluginPosition) -> bool {
        self.plugins.iter().any(|p| p.position() == position)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl fmt::Debug for PluginChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}
