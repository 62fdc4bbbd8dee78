//! Plugins described by data.

use serde::Deserialize;

use crate::http::error::ConfigError;
use crate::http::security::plugin::{
    ActivationContext, FirewallPlugin, PluginActivation, PluginSchema,
};
use crate::http::security::position::PluginPosition;

/// A plugin whose ids are templates.
///
/// `{firewall}` expands to the firewall name and `{user_provider}` to the
/// resolved user provider id. The position is given by its code and checked
/// when the plugin is declared.
///
/// # Example
/// ```
/// use actix_security_config::http::security::plugins::DeclaredPlugin;
/// use actix_security_config::http::security::{ConfigError, PluginPosition, FirewallPlugin};
///
/// let x509: DeclaredPlugin = serde_json::from_str(r#"{
///     "key": "x509",
///     "position": "pre_auth",
///     "listener": "security.authentication.listener.x509.{firewall}",
///     "provider": "security.authentication.provider.pre_authenticated.{firewall}"
/// }"#).unwrap();
/// assert_eq!(x509.position(), PluginPosition::PreAuthentication);
///
/// let err = DeclaredPlugin::new("request_matcher", "match_request", "listener").unwrap_err();
/// assert!(matches!(err, ConfigError::UnknownPosition { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "DeclaredPluginDef")]
pub struct DeclaredPlugin {
    key: String,
    position: PluginPosition,
    listener: String,
    provider: Option<String>,
    entry_point: Option<String>,
    required: Vec<String>,
}

#[derive(Deserialize)]
struct DeclaredPluginDef {
    key: String,
    position: String,
    listener: String,
    provider: Option<String>,
    entry_point: Option<String>,
    #[serde(default)]
    required: Vec<String>,
}

impl TryFrom<DeclaredPluginDef> for DeclaredPlugin {
    type Error = ConfigError;

    fn try_from(def: DeclaredPluginDef) -> Result<Self, Self::Error> {
        Ok(DeclaredPlugin {
            position: PluginPosition::parse(&def.key, &def.position)?,
            key: def.key,
            listener: def.listener,
            provider: def.provider,
            entry_point: def.entry_point,
            required: def.required,
        })
    }
}

impl DeclaredPlugin {
    /// Fails with [`ConfigError::UnknownPosition`] for an unknown position code.
    pub fn new(key: &str, position: &str, listener: &str) -> Result<Self, ConfigError> {
        Ok(DeclaredPlugin {
            key: key.to_string(),
            position: PluginPosition::parse(key, position)?,
            listener: listener.to_string(),
            provider: None,
            entry_point: None,
            required: Vec::new(),
        })
    }

    pub fn provider(mut self, template: &str) -> Self {
        self.provider = Some(template.to_string());
        self
    }

    pub fn entry_point(mut self, template: &str) -> Self {
        self.entry_point = Some(template.to_string());
        self
    }

    pub fn required(mut self, option: &str) -> Self {
        self.required.push(option.to_string());
        self
    }

    fn expand(template: &str, ctx: &ActivationContext<'_>) -> String {
        template
            .replace("{firewall}", ctx.firewall)
            .replace("{user_provider}", ctx.user_provider)
    }
}

impl FirewallPlugin for DeclaredPlugin {
    fn key(&self) -> &str {
        &self.key
    }

    fn position(&self) -> PluginPosition {
        self.position
    }

    fn schema(&self) -> PluginSchema {
        self.required
            .iter()
            .fold(PluginSchema::new(), |schema, name| schema.required(name))
    }

    fn activate(&self, ctx: &ActivationContext<'_>) -> Result<PluginActivation, ConfigError> {
        let activation: PluginActivation = (
            self.provider.as_deref().map(|t| Self::expand(t, ctx)),
            Self::expand(&self.listener, ctx),
            self.entry_point.as_deref().map(|t| Self::expand(t, ctx)),
        )
            .into();
        Ok(activation.with_options(ctx.options))
    }
}
