//! Access-control enforcement.
//!
//! # Spring Security Equivalent
//! `AuthorizationFilter`

use crate::http::error::ConfigError;
use crate::http::security::plugin::{ActivationContext, FirewallPlugin, PluginActivation};
use crate::http::security::position::PluginPosition;

/// Listener id shared by every firewall: it consults the global access map.
pub const ACCESS_LISTENER: &str = "security.access_listener";

/// Enforces the global `access_control` rules.
///
/// When rules exist the builder enables it on every firewall, with the rules
/// as its `rules` option, overriding whatever the firewall sets for the key.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessControlPlugin;

impl FirewallPlugin for AccessControlPlugin {
    fn key(&self) -> &str {
        "access_control"
    }

    fn position(&self) -> PluginPosition {
        PluginPosition::AuthorizationDefaultRbac
    }

    fn activate(&self, ctx: &ActivationContext<'_>) -> Result<PluginActivation, ConfigError> {
        Ok(PluginActivation::listener(ACCESS_LISTENER).with_options(ctx.options))
    }
}
