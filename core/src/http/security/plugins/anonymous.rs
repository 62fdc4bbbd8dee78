//! Anonymous authentication.
//!
//! # Spring Security Equivalent
//! `HttpSecurity.anonymous()` / `AnonymousAuthenticationFilter`

use rand::Rng;
use tracing::warn;

use crate::http::error::ConfigError;
use crate::http::security::firewall::{FirewallConfig, FirewallSpec};
use crate::http::security::plugin::{
    ActivationContext, FirewallConfigAmender, FirewallPlugin, PluginActivation,
};
use crate::http::security::position::PluginPosition;

/// Gives unauthenticated requests an anonymous token.
///
/// Without a configured `secret` a random one is generated per firewall.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousAuthenticationPlugin;

impl AnonymousAuthenticationPlugin {
    fn generate_secret() -> String {
        let mut rng = rand::thread_rng();
        let bytes: [u8; 16] = rng.gen();
        hex::encode(bytes)
    }
}

impl FirewallPlugin for AnonymousAuthenticationPlugin {
    fn key(&self) -> &str {
        "anonymous"
    }

    fn position(&self) -> PluginPosition {
        PluginPosition::AuthenticationAnonymous
    }

    fn activate(&self, ctx: &ActivationContext<'_>) -> Result<PluginActivation, ConfigError> {
        let mut options = ctx.options.clone();
        if options.get_str("secret").is_none() {
            options.insert("secret", Self::generate_secret());
        }

        Ok(PluginActivation::listener(format!(
            "security.authentication.listener.anonymous.{}",
            ctx.firewall
        ))
        .with_provider(format!("security.authentication.provider.anonymous.{}", ctx.firewall))
        .with_options(&options))
    }

    fn as_amender(&self) -> Option<&dyn FirewallConfigAmender> {
        Some(self)
    }
}

impl FirewallConfigAmender for AnonymousAuthenticationPlugin {
    /// Leaves the flag alone; only reports firewalls that are flagged as
    /// allowing anonymous access without running this plugin.
    fn amend(&self, firewall: &str, spec: &FirewallSpec, config: &mut FirewallConfig) {
        if config.allows_anonymous()
            && config.is_security_enabled()
            && spec.plugin_options(self.key()).is_none()
        {
            warn!(
                firewall = %firewall,
                "firewall allows anonymous access without an anonymous plugin of its own"
            );
        }
    }
}
