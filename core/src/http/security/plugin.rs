//! Firewall plugin contract.
//!
//! # Spring Security Equivalent
//! `SecurityConfigurer` / `AbstractHttpConfigurer`
//!
//! A plugin is registered once, at bootstrap, and reused for every firewall.
//! For each firewall whose configuration contains the plugin's key, the
//! assembler calls [`FirewallPlugin::activate`] with the plugin's options and
//! collects the ids it returns.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::http::error::ConfigError;
use crate::http::security::firewall::{FirewallConfig, FirewallSpec};
use crate::http::security::position::PluginPosition;

/// Normalizes a configuration key: dashes become underscores.
pub fn normalize_key(key: &str) -> String {
    key.replace('-', "_")
}

/// A registered unit of authentication/authorization behaviour.
///
/// # Example
/// ```
/// use actix_security_config::http::security::{
///     ActivationContext, ConfigError, FirewallPlugin, PluginActivation, PluginPosition,
/// };
///
/// struct ApiKeyPlugin;
///
/// impl FirewallPlugin for ApiKeyPlugin {
///     fn key(&self) -> &str {
///         "api-key"
///     }
///
///     fn position(&self) -> PluginPosition {
///         PluginPosition::PreAuthentication
///     }
///
///     fn activate(&self, ctx: &ActivationContext<'_>) -> Result<PluginActivation, ConfigError> {
///         Ok(PluginActivation::listener(format!("app.api_key_listener.{}", ctx.firewall))
///             .with_provider(format!("app.api_key_provider.{}", ctx.firewall)))
///     }
/// }
/// ```
pub trait FirewallPlugin {
    /// The configuration key selecting this plugin in a firewall.
    fn key(&self) -> &str;

    /// The pipeline stage this plugin occupies.
    fn position(&self) -> PluginPosition;

    /// Options accepted by this plugin.
    fn schema(&self) -> PluginSchema {
        PluginSchema::new()
    }

    /// Builds the plugin for one firewall.
    fn activate(&self, ctx: &ActivationContext<'_>) -> Result<PluginActivation, ConfigError>;

    /// Optional capability: plugins that also adjust the published firewall
    /// config return themselves here.
    fn as_amender(&self) -> Option<&dyn FirewallConfigAmender> {
        None
    }
}

/// Optional second capability of a plugin.
///
/// Amenders run for every registered plugin offering the capability, whether
/// or not the plugin is active on the firewall being assembled.
pub trait FirewallConfigAmender {
    fn amend(&self, firewall: &str, spec: &FirewallSpec, config: &mut FirewallConfig);
}

/// Everything a plugin sees while it is activated for one firewall.
#[derive(Debug, Clone, Copy)]
pub struct ActivationContext<'a> {
    /// The firewall name
    pub firewall: &'a str,
    /// The plugin's normalized options
    pub options: &'a PluginOptions,
    /// Resolved user provider id (plugin `provider` override already applied)
    pub user_provider: &'a str,
    /// Entry point set by plugins activated earlier on this firewall
    pub entry_point: Option<&'a str>,
    /// Whether the firewall is stateless
    pub stateless: bool,
}

// =============================================================================
// Activation Result
// =============================================================================

/// The ids a plugin contributes to a firewall.
///
/// `listener_id` is always present; `authentication_provider_id` marks the
/// plugin as an authentication mechanism; `entry_point_id` replaces the
/// firewall's current default entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginActivation {
    pub authentication_provider_id: Option<String>,
    pub listener_id: String,
    pub entry_point_id: Option<String>,
    /// Resolved options, kept for introspection
    pub options: Map<String, Value>,
}

impl PluginActivation {
    /// A plugin contributing only a listener.
    pub fn listener(listener_id: impl Into<String>) -> Self {
        PluginActivation {
            authentication_provider_id: None,
            listener_id: listener_id.into(),
            entry_point_id: None,
            options: Map::new(),
        }
    }

    pub fn with_provider(mut self, provider_id: impl Into<String>) -> Self {
        self.authentication_provider_id = Some(provider_id.into());
        self
    }

    pub fn with_entry_point(mut self, entry_point_id: impl Into<String>) -> Self {
        self.entry_point_id = Some(entry_point_id.into());
        self
    }

    pub fn with_options(mut self, options: &PluginOptions) -> Self {
        self.options = options.as_map().clone();
        self
    }
}

/// The `(provider, listener, entry point)` tuple shape.
impl From<(Option<String>, String, Option<String>)> for PluginActivation {
    fn from((provider, listener, entry_point): (Option<String>, String, Option<String>)) -> Self {
        PluginActivation {
            authentication_provider_id: provider,
            listener_id: listener,
            entry_point_id: entry_point,
            options: Map::new(),
        }
    }
}

// =============================================================================
// Plugin Options
// =============================================================================

/// The options a firewall gives to one plugin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginOptions(Map<String, Value>);

impl PluginOptions {
    pub fn new() -> Self {
        PluginOptions(Map::new())
    }

    /// Reads the value configured under a plugin key.
    ///
    /// `null` and `true` enable the plugin with defaults, `false` disables
    /// it (`Ok(None)`), an object is the option set.
    pub fn from_value(firewall: &str, key: &str, value: &Value) -> Result<Option<Self>, ConfigError> {
        match value {
            Value::Null | Value::Bool(true) => Ok(Some(PluginOptions::new())),
            Value::Bool(false) => Ok(None),
            Value::Object(map) => Ok(Some(PluginOptions(map.clone()))),
            other => Err(ConfigError::plugin_config(
                firewall,
                key,
                format!("expected a mapping, got {}", other),
            )),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// A string option; empty strings count as absent.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str).filter(|s| !s.is_empty())
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.0.get(name).and_then(Value::as_bool)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Deserializes the options into a typed structure.
    pub fn parse<T: DeserializeOwned>(&self, firewall: &str, key: &str) -> Result<T, ConfigError> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|e| ConfigError::plugin_config(firewall, key, e.to_string()))
    }
}

impl From<Map<String, Value>> for PluginOptions {
    fn from(map: Map<String, Value>) -> Self {
        PluginOptions(map)
    }
}

// =============================================================================
// Plugin Schema
// =============================================================================

/// Options a plugin accepts: required names and defaults.
#[derive(Debug, Clone, Default)]
pub struct PluginSchema {
    required: Vec<String>,
    defaults: Vec<(String, Value)>,
}

impl PluginSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires a non-empty option.
    pub fn required(mut self, name: &str) -> Self {
        self.required.push(name.to_string());
        self
    }

    /// Fills an option when the firewall does not set it.
    pub fn default_value(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.defaults.push((name.to_string(), value.into()));
        self
    }

    pub fn required_options(&self) -> impl Iterator<Item = &str> {
        self.required.iter().map(String::as_str)
    }

    /// Applies defaults and checks required options.
    pub fn normalize(
        &self,
        firewall: &str,
        key: &str,
        mut options: PluginOptions,
    ) -> Result<PluginOptions, ConfigError> {
        for (name, value) in &self.defaults {
            if !options.contains(name) {
                options.insert(name, value.clone());
            }
        }

        for name in &self.required {
            let present = match options.get(name) {
                None | Some(Value::Null) => false,
                Some(Value::String(s)) => !s.is_empty(),
                Some(_) => true,
            };
            if !present {
                return Err(ConfigError::plugin_config(
                    firewall,
                    key,
                    format!("option '{}' is required", name),
                ));
            }
        }

        Ok(options)
    }
}
