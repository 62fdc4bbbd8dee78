//! The security configuration document.
//!
//! # Spring Security Equivalent
//! The `@EnableWebSecurity` configuration class as a whole
//!
//! # Example
//! ```rust
//! use actix_security_config::http::security::SecurityConfig;
//!
//! let config = SecurityConfig::from_yaml_str(r#"
//! providers:
//!   users:
//!     memory:
//!       users:
//!         admin: { password: secret, roles: [ROLE_ADMIN] }
//! firewalls:
//!   dev:
//!     pattern: ^/(_profiler|css|js)
//!     security: false
//!   main:
//!     anonymous: ~
//! "#).unwrap();
//!
//! let names: Vec<_> = config.firewalls.iter().map(|f| f.name.as_str()).collect();
//! assert_eq!(names, ["dev", "main"]);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::http::error::ConfigError;
use crate::http::security::firewall::FirewallSpec;

/// The whole security configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// User providers, in declaration order
    #[serde(deserialize_with = "ordered_map")]
    pub providers: Vec<ProviderSpec>,
    /// Firewalls, in declaration order (first match wins)
    #[serde(deserialize_with = "ordered_map")]
    pub firewalls: Vec<FirewallSpec>,
    pub access_control: Vec<AccessControlRule>,
    pub role_hierarchy: BTreeMap<String, RoleList>,
    pub access_denied_url: Option<String>,
    pub session_fixation_strategy: SessionFixationStrategy,
    pub erase_credentials: bool,
    pub hide_user_not_found: bool,
    pub always_authenticate_before_granting: bool,
    pub access_decision_manager: AccessDecisionManagerConfig,
}

impl SecurityConfig {
    pub fn new() -> Self {
        SecurityConfig {
            erase_credentials: true,
            hide_user_not_found: true,
            ..Default::default()
        }
    }

    /// Loads a configuration from YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str::<RawSecurityConfig>(yaml)?.into())
    }

    /// Loads a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str::<RawSecurityConfig>(json)?.into())
    }

    pub fn provider(mut self, provider: ProviderSpec) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn firewall(mut self, firewall: FirewallSpec) -> Self {
        self.firewalls.push(firewall);
        self
    }

    pub fn access_rule(mut self, rule: AccessControlRule) -> Self {
        self.access_control.push(rule);
        self
    }

    pub fn role(mut self, role: &str, inherits: &[&str]) -> Self {
        self.role_hierarchy.insert(
            role.to_string(),
            RoleList(inherits.iter().map(|r| r.to_string()).collect()),
        );
        self
    }
}

/// Document-level defaults that differ from `bool::default()`.
#[derive(Deserialize)]
struct RawSecurityConfig {
    #[serde(flatten)]
    config: SecurityConfig,
    #[serde(default = "default_true")]
    erase_credentials: bool,
    #[serde(default = "default_true")]
    hide_user_not_found: bool,
}

impl From<RawSecurityConfig> for SecurityConfig {
    fn from(raw: RawSecurityConfig) -> Self {
        let mut config = raw.config;
        config.erase_credentials = raw.erase_credentials;
        config.hide_user_not_found = raw.hide_user_not_found;
        for firewall in &mut config.firewalls {
            firewall.normalize_plugin_keys();
        }
        config
    }
}

fn default_true() -> bool {
    true
}

/// A value that knows its map key.
trait Named {
    fn set_name(&mut self, name: String);
}

impl Named for FirewallSpec {
    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

impl Named for ProviderSpec {
    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

/// Deserializes a map into a `Vec`, keeping document order.
fn ordered_map<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Named,
{
    struct OrderedVisitor<T>(PhantomData<T>);

    impl<'de, T: DeserializeOwned + Named> Visitor<'de> for OrderedVisitor<T> {
        type Value = Vec<T>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of named entries")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, mut value)) = map.next_entry::<String, T>()? {
                value.set_name(name);
                entries.push(value);
            }
            Ok(entries)
        }

        fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(OrderedVisitor(PhantomData))
}

// =============================================================================
// User Providers
// =============================================================================

/// One declared user provider.
///
/// Exactly one of: a factory key (e.g. `memory`), `id` (an existing
/// service) or `chain`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderSpec {
    #[serde(skip)]
    pub name: String,
    /// Existing provider service id
    pub id: Option<String>,
    pub chain: Option<ChainSpec>,
    /// Factory keys and their options
    #[serde(flatten)]
    pub factories: Map<String, Value>,
}

impl ProviderSpec {
    pub fn new(name: impl Into<String>) -> Self {
        ProviderSpec {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn chain(mut self, providers: &[&str]) -> Self {
        self.chain = Some(ChainSpec {
            providers: providers.iter().map(|p| p.to_string()).collect(),
        });
        self
    }

    pub fn factory(mut self, key: &str, options: Value) -> Self {
        self.factories.insert(key.to_string(), options);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChainSpec {
    pub providers: Vec<String>,
}

// =============================================================================
// Access Control
// =============================================================================

/// A global access rule.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, serde::Serialize)]
#[serde(default)]
pub struct AccessControlRule {
    pub path: Option<String>,
    pub host: Option<String>,
    pub methods: Vec<String>,
    pub ips: Vec<String>,
    pub roles: Vec<String>,
    pub allow_if: Option<String>,
    pub requires_channel: Option<String>,
}

impl AccessControlRule {
    pub fn path(path: &str) -> Self {
        AccessControlRule {
            path: Some(path.to_string()),
            ..Default::default()
        }
    }

    pub fn roles(mut self, roles: &[&str]) -> Self {
        self.roles = roles.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn allow_if(mut self, expression: &str) -> Self {
        self.allow_if = Some(expression.to_string());
        self
    }

    pub fn requires_channel(mut self, channel: &str) -> Self {
        self.requires_channel = Some(channel.to_string());
        self
    }
}

/// Roles written either as `ROLE_A, ROLE_B` or as a list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleList(pub Vec<String>);

impl<'de> Deserialize<'de> for RoleList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            One(String),
            Many(Vec<String>),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::One(s) => RoleList(s.split(',').map(|r| r.trim().to_string()).collect()),
            Raw::Many(roles) => RoleList(roles),
        })
    }
}

// =============================================================================
// Global Settings
// =============================================================================

/// Session fixation protection applied after authentication.
///
/// # Spring Security Equivalent
/// `SessionFixationProtectionStrategy`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionFixationStrategy {
    None,
    #[default]
    Migrate,
    Invalidate,
}

/// Voting strategy of the access decision manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStrategy {
    #[default]
    Affirmative,
    Consensus,
    Unanimous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AccessDecisionManagerConfig {
    pub strategy: DecisionStrategy,
    pub allow_if_all_abstain: bool,
    pub allow_if_equal_granted_denied: bool,
}

impl Default for AccessDecisionManagerConfig {
    fn default() -> Self {
        AccessDecisionManagerConfig {
            strategy: DecisionStrategy::Affirmative,
            allow_if_all_abstain: false,
            allow_if_equal_granted_denied: true,
        }
    }
}
