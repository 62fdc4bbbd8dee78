//! Errors raised while assembling the security pipeline.
//!
//! Every variant aborts the whole build: there is no partially assembled
//! pipeline. Variants name the firewall (or provider, or plugin) involved so
//! a misconfiguration can be located from the message alone.

use derive_more::{Display, Error};

/// Errors that can occur while building firewalls from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ConfigError {
    /// A plugin declared a position code outside the fixed pipeline order.
    #[display("plugin '{key}' declares unknown position '{position}'")]
    UnknownPosition {
        /// The plugin key
        key: String,
        /// The rejected position code
        position: String,
    },

    /// Two plugins were registered under the same (normalized) key.
    #[display("a plugin is already registered under key '{key}'")]
    DuplicatePluginKey {
        /// The normalized plugin key
        key: String,
    },

    /// The firewall needs a user provider and none is declared.
    #[display("no user provider is configured for firewall '{firewall}'")]
    NoUserProvider {
        /// The firewall name
        firewall: String,
    },

    /// No active plugin contributed an authentication provider.
    #[display("no authentication listener registered for firewall '{firewall}'")]
    NoAuthenticationListener {
        /// The firewall name
        firewall: String,
    },

    /// A firewall, plugin or provider chain names an undeclared provider.
    #[display("'{referrer}' references undeclared user provider '{provider}'")]
    InvalidProviderReference {
        /// The firewall (or provider chain) holding the reference
        referrer: String,
        /// The provider name as written in the configuration
        provider: String,
    },

    /// A provider declaration matches no factory, service id or chain.
    #[display("unable to create definition for user provider '{provider}'")]
    InvalidProviderDefinition {
        /// The provider name
        provider: String,
    },

    /// The options given to a plugin are malformed.
    #[display("invalid '{key}' configuration for firewall '{firewall}': {reason}")]
    InvalidPluginConfig {
        /// The firewall name
        firewall: String,
        /// The plugin key
        key: String,
        /// What is wrong with the options
        reason: String,
    },

    /// An `allow_if` expression could not be parsed.
    #[display("invalid expression '{expression}': {reason}")]
    InvalidExpression {
        /// The expression source
        expression: String,
        /// The parse failure
        reason: String,
    },

    /// An optional capability is used but was not compiled in.
    #[display("{component} is not available: enable the '{feature}' feature")]
    MissingOptionalComponent {
        /// The missing capability
        component: &'static str,
        /// The cargo feature providing it
        feature: &'static str,
    },

    /// The configuration document could not be decoded.
    #[display("invalid security configuration: {reason}")]
    InvalidConfiguration {
        /// The decoder message
        reason: String,
    },
}

impl ConfigError {
    /// Returns the firewall this error is attributed to, if any.
    pub fn firewall(&self) -> Option<&str> {
        match self {
            ConfigError::NoUserProvider { firewall }
            | ConfigError::NoAuthenticationListener { firewall }
            | ConfigError::InvalidPluginConfig { firewall, .. } => Some(firewall),
            ConfigError::InvalidProviderReference { referrer, .. } => Some(referrer),
            _ => None,
        }
    }

    pub(crate) fn plugin_config(firewall: &str, key: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidPluginConfig {
            firewall: firewall.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::InvalidConfiguration {
            reason: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::InvalidConfiguration {
            reason: err.to_string(),
        }
    }
}
