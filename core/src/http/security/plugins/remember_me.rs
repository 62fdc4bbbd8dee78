//! Remember-me authentication.
//!
//! # Spring Security Equivalent
//! `HttpSecurity.rememberMe()` / `RememberMeAuthenticationFilter`

use crate::http::error::ConfigError;
use crate::http::security::plugin::{
    ActivationContext, FirewallPlugin, PluginActivation, PluginSchema,
};
use crate::http::security::position::PluginPosition;

/// Re-authenticates from a signed cookie. Requires `secret`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RememberMePlugin;

impl FirewallPlugin for RememberMePlugin {
    fn key(&self) -> &str {
        "remember_me"
    }

    fn position(&self) -> PluginPosition {
        PluginPosition::AuthenticationRememberMe
    }

    fn schema(&self) -> PluginSchema {
        PluginSchema::new()
            .required("secret")
            .default_value("name", "REMEMBERME")
            .default_value("lifetime", 31_536_000)
            .default_value("path", "/")
            .default_value("secure", false)
            .default_value("httponly", true)
            .default_value("always_remember_me", false)
            .default_value("remember_me_parameter", "_remember_me")
    }

    fn activate(&self, ctx: &ActivationContext<'_>) -> Result<PluginActivation, ConfigError> {
        let mut options = ctx.options.clone();
        options.insert("user_provider", ctx.user_provider);

        Ok(PluginActivation::listener(format!(
            "security.authentication.listener.rememberme.{}",
            ctx.firewall
        ))
        .with_provider(format!("security.authentication.provider.rememberme.{}", ctx.firewall))
        .with_options(&options))
    }
}
