//! Explicit stateful authorization.

use crate::http::error::ConfigError;
use crate::http::security::plugin::{ActivationContext, FirewallPlugin, PluginActivation};
use crate::http::security::position::PluginPosition;

/// Persists the authorization state of a firewall under a context key.
///
/// `context` defaults to the firewall name.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatefulPlugin;

impl FirewallPlugin for StatefulPlugin {
    fn key(&self) -> &str {
        "stateful"
    }

    fn position(&self) -> PluginPosition {
        PluginPosition::PostAuthentication
    }

    fn activate(&self, ctx: &ActivationContext<'_>) -> Result<PluginActivation, ConfigError> {
        let context = ctx.options.get_str("context").unwrap_or(ctx.firewall).to_string();
        let mut options = ctx.options.clone();
        options.insert("context", context.as_str());

        Ok(PluginActivation::listener(format!("security.stateful_listener.{}", context))
            .with_options(&options))
    }
}
