//! User provider declarations.
//!
//! # Spring Security Equivalent
//! `UserDetailsService` beans (`InMemoryUserDetailsManager`, custom services)
//!
//! Every declared provider gets the id
//! `security.user.provider.concrete.<lowercased name>`, which is what
//! firewalls and plugins receive when they reference a provider by name.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::http::error::ConfigError;
use crate::http::security::config::{ProviderSpec, RoleList};
use crate::http::security::plugin::normalize_key;

/// Prefix of user provider ids.
pub const USER_PROVIDER_PREFIX: &str = "security.user.provider.concrete.";

/// The id of the provider declared under `name`.
pub fn provider_id(name: &str) -> String {
    format!("{}{}", USER_PROVIDER_PREFIX, name.to_lowercase())
}

/// Builds a user provider from its declared options.
///
/// # Spring Security Equivalent
/// A `UserDetailsService` `@Bean` method
pub trait UserProviderFactory {
    /// The configuration key selecting this factory, e.g. `memory`.
    fn key(&self) -> &str;

    /// Validates the options and returns the provider's arguments.
    fn create(&self, id: &str, options: &Value) -> Result<Value, ConfigError>;
}

// =============================================================================
// In-Memory Provider
// =============================================================================

/// Users declared inline in the configuration.
///
/// ```yaml
/// providers:
///   in_memory:
///     memory:
///       users:
///         admin: { password: admin, roles: [ROLE_ADMIN] }
///         user: { password: user, roles: ROLE_USER }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct InMemoryUserProviderFactory;

#[derive(Deserialize)]
struct InMemoryOptions {
    #[serde(default)]
    users: BTreeMap<String, InMemoryUser>,
}

#[derive(Deserialize)]
struct InMemoryUser {
    password: String,
    #[serde(default)]
    roles: RoleList,
}

impl UserProviderFactory for InMemoryUserProviderFactory {
    fn key(&self) -> &str {
        "memory"
    }

    fn create(&self, id: &str, options: &Value) -> Result<Value, ConfigError> {
        let options = InMemoryOptions::deserialize(options).map_err(|e| {
            ConfigError::InvalidConfiguration {
                reason: format!("{}: {}", id, e),
            }
        })?;

        let users: Vec<Value> = options
            .users
            .into_iter()
            .map(|(username, user)| {
                json!({
                    "username": username,
                    "password": user.password,
                    "roles": user.roles.0,
                })
            })
            .collect();
        Ok(json!({ "users": users }))
    }
}

// =============================================================================
// Resolved Providers
// =============================================================================

/// How a declared provider is backed.
#[derive(Debug, Clone, PartialEq)]
pub enum UserProviderKind {
    /// Built by the factory registered under `key`
    Factory { key: String, arguments: Value },
    /// Alias of an existing service
    Alias { target: String },
    /// Asks each provider in turn
    Chain { providers: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserProviderDefinition {
    pub name: String,
    pub id: String,
    pub kind: UserProviderKind,
}

impl UserProviderDefinition {
    /// The service the id finally points to.
    pub fn service_id(&self) -> &str {
        match &self.kind {
            UserProviderKind::Alias { target } => target,
            _ => &self.id,
        }
    }
}

/// All declared providers, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct UserProviders {
    definitions: Vec<UserProviderDefinition>,
}

impl UserProviders {
    /// Resolves every declared provider.
    ///
    /// For each provider the first factory with a non-null entry wins, then
    /// an `id`, then a `chain`.
    pub fn resolve(
        specs: &[ProviderSpec],
        factories: &[Box<dyn UserProviderFactory>],
    ) -> Result<Self, ConfigError> {
        let declared: HashSet<String> = specs.iter().map(|s| s.name.to_lowercase()).collect();
        let mut definitions = Vec::with_capacity(specs.len());

        for spec in specs {
            let id = provider_id(&spec.name);
            let kind = resolve_kind(spec, &id, factories, &declared)?;
            debug!(provider = %spec.name, id = %id, "resolved user provider");
            definitions.push(UserProviderDefinition {
                name: spec.name.clone(),
                id,
                kind,
            });
        }

        Ok(UserProviders { definitions })
    }

    /// The provider used when a firewall names none: the first declared.
    pub fn default_id(&self) -> Option<&str> {
        self.definitions.first().map(|d| d.id.as_str())
    }

    /// Resolves a provider reference made by `referrer`.
    pub fn reference(&self, referrer: &str, name: &str) -> Result<String, ConfigError> {
        let id = provider_id(name);
        if self.definitions.iter().any(|d| d.id == id) {
            Ok(id)
        } else {
            Err(ConfigError::InvalidProviderReference {
                referrer: referrer.to_string(),
                provider: name.to_string(),
            })
        }
    }

    pub fn get(&self, name: &str) -> Option<&UserProviderDefinition> {
        let id = provider_id(name);
        self.definitions.iter().find(|d| d.id == id)
    }

    pub fn definitions(&self) -> &[UserProviderDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

fn resolve_kind(
    spec: &ProviderSpec,
    id: &str,
    factories: &[Box<dyn UserProviderFactory>],
    declared: &HashSet<String>,
) -> Result<UserProviderKind, ConfigError> {
    for factory in factories {
        let key = normalize_key(factory.key());
        let options = spec
            .factories
            .iter()
            .find(|(k, v)| normalize_key(k) == key && !v.is_null())
            .map(|(_, v)| v);
        if let Some(options) = options {
            return Ok(UserProviderKind::Factory {
                arguments: factory.create(id, options)?,
                key,
            });
        }
    }

    if let Some(target) = spec.id.as_deref().filter(|t| !t.is_empty()) {
        return Ok(UserProviderKind::Alias {
            target: target.to_string(),
        });
    }

    if let Some(chain) = &spec.chain {
        let providers = chain
            .providers
            .iter()
            .map(|name| {
                if declared.contains(&name.to_lowercase()) {
                    Ok(provider_id(name))
                } else {
                    Err(ConfigError::InvalidProviderReference {
                        referrer: spec.name.clone(),
                        provider: name.clone(),
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(UserProviderKind::Chain { providers });
    }

    Err(ConfigError::InvalidProviderDefinition {
        provider: spec.name.clone(),
    })
}
