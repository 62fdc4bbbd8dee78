//! HTTP Basic authentication.
//!
//! # Spring Security Equivalent
//! `HttpSecurity.httpBasic()` / `BasicAuthenticationFilter`

use crate::http::error::ConfigError;
use crate::http::security::plugin::{
    ActivationContext, FirewallPlugin, PluginActivation, PluginSchema,
};
use crate::http::security::plugins::dao_provider_id;
use crate::http::security::position::PluginPosition;

/// Default realm sent in `WWW-Authenticate`.
pub const DEFAULT_REALM: &str = "Secured Area";

/// `Authorization: Basic` credentials.
///
/// Keeps an entry point installed by an earlier plugin; otherwise installs a
/// `WWW-Authenticate` challenge for `realm`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpBasicPlugin;

impl FirewallPlugin for HttpBasicPlugin {
    fn key(&self) -> &str {
        "http_basic"
    }

    fn position(&self) -> PluginPosition {
        PluginPosition::AuthenticationHttp
    }

    fn schema(&self) -> PluginSchema {
        PluginSchema::new().default_value("realm", DEFAULT_REALM)
    }

    fn activate(&self, ctx: &ActivationContext<'_>) -> Result<PluginActivation, ConfigError> {
        let entry_point = match ctx.entry_point {
            Some(existing) => existing.to_string(),
            None => format!("security.authentication.basic_entry_point.{}", ctx.firewall),
        };

        let mut options = ctx.options.clone();
        options.insert("user_provider", ctx.user_provider);

        Ok(
            PluginActivation::listener(format!("security.authentication.listener.basic.{}", ctx.firewall))
                .with_provider(dao_provider_id(ctx.firewall))
                .with_entry_point(entry_point)
                .with_options(&options),
        )
    }
}
