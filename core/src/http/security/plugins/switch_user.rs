//! User impersonation.
//!
//! # Spring Security Equivalent
//! `SwitchUserFilter`

use crate::http::error::ConfigError;
use crate::http::security::plugin::{
    ActivationContext, FirewallPlugin, PluginActivation, PluginSchema,
};
use crate::http::security::position::PluginPosition;

/// Lets a user holding `role` act as another user by passing `parameter`.
///
/// Honours a plugin-level `provider` to load the impersonated user.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwitchUserPlugin;

impl FirewallPlugin for SwitchUserPlugin {
    fn key(&self) -> &str {
        "switch_user"
    }

    fn position(&self) -> PluginPosition {
        PluginPosition::PreAuthorization
    }

    fn schema(&self) -> PluginSchema {
        PluginSchema::new()
            .default_value("parameter", "_switch_user")
            .default_value("role", "ROLE_ALLOWED_TO_SWITCH")
    }

    fn activate(&self, ctx: &ActivationContext<'_>) -> Result<PluginActivation, ConfigError> {
        let mut options = ctx.options.clone();
        options.insert("user_provider", ctx.user_provider);
        options.insert("stateless", ctx.stateless);

        Ok(PluginActivation::listener(format!(
            "security.authentication.switchuser_listener.{}",
            ctx.firewall
        ))
        .with_options(&options))
    }
}
