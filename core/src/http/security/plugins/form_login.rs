//! Form login.
//!
//! # Spring Security Equivalent
//! `HttpSecurity.formLogin()` / `UsernamePasswordAuthenticationFilter`

use crate::http::error::ConfigError;
use crate::http::security::plugin::{
    ActivationContext, FirewallPlugin, PluginActivation, PluginSchema,
};
use crate::http::security::plugins::dao_provider_id;
use crate::http::security::position::PluginPosition;

/// Username/password login through an HTML form.
///
/// Always installs its own entry point (a redirect to `login_path`).
#[derive(Debug, Clone, Copy, Default)]
pub struct FormLoginPlugin;

impl FirewallPlugin for FormLoginPlugin {
    fn key(&self) -> &str {
        "form_login"
    }

    fn position(&self) -> PluginPosition {
        PluginPosition::AuthenticationForm
    }

    fn schema(&self) -> PluginSchema {
        PluginSchema::new()
            .default_value("login_path", "/login")
            .default_value("check_path", "/login_check")
            .default_value("use_forward", false)
            .default_value("username_parameter", "_username")
            .default_value("password_parameter", "_password")
    }

    fn activate(&self, ctx: &ActivationContext<'_>) -> Result<PluginActivation, ConfigError> {
        let mut options = ctx.options.clone();
        options.insert("user_provider", ctx.user_provider);

        Ok(
            PluginActivation::listener(format!("security.authentication.listener.form.{}", ctx.firewall))
                .with_provider(dao_provider_id(ctx.firewall))
                .with_entry_point(format!("security.authentication.form_entry_point.{}", ctx.firewall))
                .with_options(&options),
        )
    }
}
