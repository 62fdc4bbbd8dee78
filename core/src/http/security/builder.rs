//! Pipeline builder and its outputs.
//!
//! # Spring Security Equivalent
//! `WebSecurity.performBuild()` / `FilterChainProxy`
//!
//! # Example
//! ```
//! use actix_security_config::http::security::{
//!     FirewallSpec, PluginRegistry, ProviderSpec, SecurityConfig, SecurityPipelineBuilder,
//! };
//! use serde_json::Value;
//!
//! let config = SecurityConfig::new()
//!     .provider(ProviderSpec::new("users").id("app.user_provider"))
//!     .firewall(FirewallSpec::new("main").plugin("http_basic", Value::Null));
//!
//! let pipeline = SecurityPipelineBuilder::new(PluginRegistry::with_defaults())
//!     .build(&config)
//!     .unwrap();
//!
//! assert_eq!(
//!     pipeline.authentication_providers,
//!     vec!["security.authentication.provider.dao.main"]
//! );
//! ```

use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::http::error::ConfigError;
use crate::http::security::access_map::AccessMap;
use crate::http::security::assembler::{FirewallAssembler, SharedState};
use crate::http::security::chain::PluginRegistry;
use crate::http::security::config::{
    AccessControlRule, AccessDecisionManagerConfig, SecurityConfig, SessionFixationStrategy,
};
use crate::http::security::context_listener::ContextListenerRegistry;
use crate::http::security::exception::ExceptionListener;
use crate::http::security::firewall::{FirewallConfig, FirewallSpec};
use crate::http::security::logout::{LogoutListener, LogoutUrlRegistry};
use crate::http::security::plugin::{normalize_key, FirewallPlugin, PluginActivation};
use crate::http::security::plugins::AccessControlPlugin;
use crate::http::security::request_matcher::RequestMatcherRegistry;
use crate::http::security::user_provider::{
    InMemoryUserProviderFactory, UserProviderFactory, UserProviders,
};

// =============================================================================
// Outputs
// =============================================================================

/// A plugin activated on a firewall.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivatedPlugin {
    pub key: String,
    pub activation: PluginActivation,
}

/// Everything the request dispatcher needs for one firewall.
#[derive(Debug, Clone)]
pub struct FirewallContext {
    /// `security.firewall.map.context.<firewall>`
    pub context_id: String,
    /// `None` matches every request
    pub matcher: Option<String>,
    pub config: FirewallConfig,
    /// Listener ids in dispatch order
    pub listeners: Vec<String>,
    pub plugins: Vec<ActivatedPlugin>,
    pub logout: Option<LogoutListener>,
    /// Wraps the listener chain; `None` when security is disabled
    pub exception_listener: Option<ExceptionListener>,
}

impl FirewallContext {
    pub(crate) fn new(
        config: FirewallConfig,
        listeners: Vec<String>,
        plugins: Vec<ActivatedPlugin>,
        logout: Option<LogoutListener>,
        exception_listener: Option<ExceptionListener>,
    ) -> Self {
        FirewallContext {
            context_id: format!("security.firewall.map.context.{}", config.name()),
            matcher: config.request_matcher().map(str::to_string),
            config,
            listeners,
            plugins,
            logout,
            exception_listener,
        }
    }

    pub fn name(&self) -> &str {
        self.config.name()
    }

    /// The activation of the plugin configured under `key`, if it ran.
    pub fn plugin(&self, key: &str) -> Option<&PluginActivation> {
        self.plugins
            .iter()
            .find(|p| p.key == key)
            .map(|p| &p.activation)
    }
}

/// Firewall contexts in declaration order; the first matching one applies.
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    contexts: Vec<FirewallContext>,
}

impl RoutingTable {
    pub fn get(&self, firewall: &str) -> Option<&FirewallContext> {
        self.contexts.iter().find(|c| c.name() == firewall)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FirewallContext> {
        self.contexts.iter()
    }

    /// Firewall names in routing order.
    pub fn names(&self) -> Vec<&str> {
        self.contexts.iter().map(FirewallContext::name).collect()
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

impl<'a> IntoIterator for &'a RoutingTable {
    type Item = &'a FirewallContext;
    type IntoIter = std::slice::Iter<'a, FirewallContext>;

    fn into_iter(self) -> Self::IntoIter {
        self.contexts.iter()
    }
}

/// Which role voter decides role attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleVoter {
    Simple,
    /// Expands roles through `role_hierarchy` first
    Hierarchy,
}

/// Settings passed through to the access decision and authentication
/// components.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalParameters {
    pub access_denied_url: Option<String>,
    pub session_fixation_strategy: SessionFixationStrategy,
    pub erase_credentials: bool,
    pub hide_user_not_found: bool,
    pub always_authenticate_before_granting: bool,
    pub access_decision_manager: AccessDecisionManagerConfig,
    pub role_hierarchy: BTreeMap<String, Vec<String>>,
    pub role_voter: RoleVoter,
}

impl GlobalParameters {
    fn from_config(config: &SecurityConfig) -> Self {
        let role_hierarchy: BTreeMap<String, Vec<String>> = config
            .role_hierarchy
            .iter()
            .map(|(role, inherits)| (role.clone(), inherits.0.clone()))
            .collect();

        GlobalParameters {
            access_denied_url: config.access_denied_url.clone(),
            session_fixation_strategy: config.session_fixation_strategy,
            erase_credentials: config.erase_credentials,
            hide_user_not_found: config.hide_user_not_found,
            always_authenticate_before_granting: config.always_authenticate_before_granting,
            access_decision_manager: config.access_decision_manager,
            role_voter: if role_hierarchy.is_empty() {
                RoleVoter::Simple
            } else {
                RoleVoter::Hierarchy
            },
            role_hierarchy,
        }
    }
}

/// The result of a build.
#[derive(Debug)]
pub struct SecurityPipeline {
    pub routing_table: RoutingTable,
    /// Deduplicated, first occurrence first
    pub authentication_providers: Vec<String>,
    pub user_providers: UserProviders,
    pub request_matchers: RequestMatcherRegistry,
    pub access_map: AccessMap,
    pub logout_urls: LogoutUrlRegistry,
    pub context_listeners: ContextListenerRegistry,
    pub parameters: GlobalParameters,
}

// =============================================================================
// Builder
// =============================================================================

/// Builds a [`SecurityPipeline`] from a [`SecurityConfig`].
///
/// # Spring Security Equivalent
/// `@EnableWebSecurity` processing of all `SecurityFilterChain` beans
pub struct SecurityPipelineBuilder {
    registry: PluginRegistry,
    user_provider_factories: Vec<Box<dyn UserProviderFactory>>,
}

impl SecurityPipelineBuilder {
    /// Creates a builder with the in-memory user provider factory.
    pub fn new(registry: PluginRegistry) -> Self {
        SecurityPipelineBuilder {
            registry,
            user_provider_factories: vec![Box::new(InMemoryUserProviderFactory)],
        }
    }

    /// Adds a user provider factory; earlier factories are tried first.
    pub fn user_provider_factory<F: UserProviderFactory + 'static>(mut self, factory: F) -> Self {
        self.user_provider_factories.push(Box::new(factory));
        self
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Assembles every firewall, in declaration order.
    ///
    /// The first failure aborts the build.
    pub fn build(&self, config: &SecurityConfig) -> Result<SecurityPipeline, ConfigError> {
        let user_providers = UserProviders::resolve(&config.providers, &self.user_provider_factories)?;
        let mut shared = SharedState::default();

        let mut access_map = AccessMap::new();
        for rule in &config.access_control {
            access_map.add_rule(rule, &mut shared.matchers)?;
        }

        let chain = self.registry.sorted();
        debug!(chain = ?chain, "sorted firewall plugins");
        let assembler = FirewallAssembler::new(&self.registry, &chain, &user_providers);

        let access_control = access_control_options(&config.access_control)?;
        let mut contexts = Vec::with_capacity(config.firewalls.len());
        for spec in &config.firewalls {
            let spec = with_access_control(spec, access_control.as_ref());
            contexts.push(assembler.assemble(&spec, &mut shared)?);
        }

        let authentication_providers = dedup(shared.authentication_providers);
        info!(
            firewalls = contexts.len(),
            providers = authentication_providers.len(),
            "security pipeline built"
        );

        Ok(SecurityPipeline {
            routing_table: RoutingTable { contexts },
            authentication_providers,
            user_providers,
            request_matchers: shared.matchers,
            access_map,
            logout_urls: shared.logout_urls,
            context_listeners: shared.context_listeners,
            parameters: GlobalParameters::from_config(config),
        })
    }
}

/// Options of the access-control plugin: the global rules, if any.
fn access_control_options(rules: &[AccessControlRule]) -> Result<Option<Value>, ConfigError> {
    if rules.is_empty() {
        return Ok(None);
    }
    Ok(Some(json!({ "rules": serde_json::to_value(rules)? })))
}

/// Enables the access-control plugin with the global rules, replacing
/// anything the firewall configures under that key.
fn with_access_control<'a>(spec: &'a FirewallSpec, options: Option<&Value>) -> Cow<'a, FirewallSpec> {
    let Some(options) = options else {
        return Cow::Borrowed(spec);
    };
    let key = normalize_key(AccessControlPlugin.key());
    if spec.plugin_options(&key).is_some() {
        debug!(firewall = %spec.name, "firewall access_control setting replaced by global rules");
    }
    let mut spec = spec.clone();
    spec.plugins.retain(|k, _| normalize_key(k) != key);
    spec.plugins.insert(key, options.clone());
    Cow::Owned(spec)
}

/// Removes duplicates, keeping first occurrences in order.
fn dedup(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}
