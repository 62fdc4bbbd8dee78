//! Per-firewall assembly.
//!
//! # Spring Security Equivalent
//! `HttpSecurity.build()` producing one `DefaultSecurityFilterChain`
//!
//! # Listener Order
//! 1. channel listener
//! 2. context listener (stateful firewalls)
//! 3. logout listener (when `logout` is configured)
//! 4. plugin listeners, in chain order
//!
//! The exception listener is kept apart: it wraps the whole chain.

use tracing::{debug, info};

use crate::http::error::ConfigError;
use crate::http::security::builder::{ActivatedPlugin, FirewallContext};
use crate::http::security::chain::{PluginChain, PluginRegistry};
use crate::http::security::context_listener::ContextListenerRegistry;
use crate::http::security::exception::ExceptionListener;
use crate::http::security::firewall::{FirewallConfig, FirewallSpec};
use crate::http::security::logout::{LogoutListener, LogoutUrl, LogoutUrlRegistry};
use crate::http::security::plugin::{normalize_key, ActivationContext, PluginOptions};
use crate::http::security::position::PluginPosition;
use crate::http::security::request_matcher::{RequestMatcherRegistry, RequestMatcherSpec};
use crate::http::security::user_provider::UserProviders;

/// Always the first listener of an enabled firewall.
pub const CHANNEL_LISTENER: &str = "security.channel_listener";

/// State shared by all firewalls of one build.
#[derive(Debug, Default)]
pub struct SharedState {
    pub matchers: RequestMatcherRegistry,
    pub context_listeners: ContextListenerRegistry,
    pub logout_urls: LogoutUrlRegistry,
    /// Append-only; deduplicated once every firewall is assembled
    pub authentication_providers: Vec<String>,
}

/// Accumulator for one firewall; dropped once its context is produced.
#[derive(Debug, Default)]
struct AssemblyState {
    listeners: Vec<String>,
    providers: Vec<String>,
    entry_point: Option<String>,
    plugin_keys: Vec<String>,
    plugins: Vec<ActivatedPlugin>,
}

impl AssemblyState {
    fn has_authentication_provider(&self) -> bool {
        !self.providers.is_empty()
    }
}

/// Builds one [`FirewallContext`] from one [`FirewallSpec`].
pub struct FirewallAssembler<'a> {
    registry: &'a PluginRegistry,
    chain: &'a PluginChain<'a>,
    user_providers: &'a UserProviders,
}

impl<'a> FirewallAssembler<'a> {
    pub fn new(
        registry: &'a PluginRegistry,
        chain: &'a PluginChain<'a>,
        user_providers: &'a UserProviders,
    ) -> Self {
        FirewallAssembler {
            registry,
            chain,
            user_providers,
        }
    }

    pub fn assemble(
        &self,
        spec: &FirewallSpec,
        shared: &mut SharedState,
    ) -> Result<FirewallContext, ConfigError> {
        let name = spec.name.as_str();
        let matcher = resolve_matcher(spec, &mut shared.matchers);

        let mut config = FirewallConfig {
            name: name.to_string(),
            user_checker: spec.user_checker.clone(),
            request_matcher: matcher.clone(),
            security_enabled: spec.security,
            stateless: spec.stateless,
            provider: None,
            context: None,
            entry_point: None,
            access_denied_handler: None,
            access_denied_url: None,
            plugin_keys: Vec::new(),
            allows_anonymous: false,
        };

        if !spec.security {
            info!(firewall = %name, "security disabled, no listeners");
            return Ok(FirewallContext::new(config, Vec::new(), Vec::new(), None, None));
        }

        let default_provider = match &spec.provider {
            Some(provider) => self.user_providers.reference(name, provider)?,
            None => self
                .user_providers
                .default_id()
                .map(str::to_string)
                .ok_or_else(|| ConfigError::NoUserProvider {
                    firewall: name.to_string(),
                })?,
        };

        let mut state = AssemblyState {
            entry_point: spec.entry_point.clone(),
            ..AssemblyState::default()
        };
        state.listeners.push(CHANNEL_LISTENER.to_string());

        if !spec.stateless {
            let context = spec.context.as_deref().unwrap_or(name);
            state.listeners.push(shared.context_listeners.resolve(context));
            config.context = Some(context.to_string());
        }

        let logout = spec.logout.as_ref().map(|logout| {
            let listener = LogoutListener::build(name, logout, spec.stateless);
            shared.logout_urls.register(LogoutUrl {
                firewall: name.to_string(),
                path: logout.path.clone(),
                csrf_token_id: logout.csrf_token_id.clone(),
                csrf_parameter: logout.csrf_parameter.clone(),
                csrf_token_generator: logout.csrf_token_generator.clone(),
                context: spec.context.clone().filter(|_| !spec.stateless),
            });
            state.listeners.push(listener.id.clone());
            state.plugin_keys.push("logout".to_string());
            listener
        });

        self.run_plugins(spec, &default_provider, &mut state)?;

        if !state.has_authentication_provider() {
            return Err(ConfigError::NoAuthenticationListener {
                firewall: name.to_string(),
            });
        }
        shared.authentication_providers.extend(state.providers.iter().cloned());

        let entry_point = spec.entry_point.clone().or(state.entry_point);
        let exception_listener = ExceptionListener::build(
            name,
            entry_point.as_deref(),
            spec.access_denied_handler.as_deref(),
            spec.access_denied_url.as_deref(),
            spec.stateless,
        );

        config.provider = Some(default_provider);
        config.entry_point = entry_point;
        config.access_denied_handler = spec.access_denied_handler.clone();
        config.access_denied_url = spec.access_denied_url.clone();
        config.plugin_keys = state.plugin_keys;
        config.allows_anonymous = self.registry.has_position(PluginPosition::AuthenticationAnonymous);

        for plugin in self.chain.iter() {
            if let Some(amender) = plugin.as_amender() {
                amender.amend(name, spec, &mut config);
            }
        }

        info!(
            firewall = %name,
            listeners = state.listeners.len(),
            entry_point = ?config.entry_point,
            "assembled firewall"
        );

        Ok(FirewallContext::new(
            config,
            state.listeners,
            state.plugins,
            logout,
            Some(exception_listener),
        ))
    }

    /// Activates, in chain order, every plugin the firewall configures.
    fn run_plugins(
        &self,
        spec: &FirewallSpec,
        default_provider: &str,
        state: &mut AssemblyState,
    ) -> Result<(), ConfigError> {
        let name = spec.name.as_str();

        for plugin in self.chain.iter() {
            let key = normalize_key(plugin.key());
            let Some(value) = spec.plugin_options(&key) else {
                continue;
            };
            let Some(options) = PluginOptions::from_value(name, &key, value)? else {
                debug!(firewall = %name, plugin = %key, "plugin disabled");
                continue;
            };
            let options = plugin.schema().normalize(name, &key, options)?;

            let user_provider = match options.get_str("provider") {
                Some(provider) => self.user_providers.reference(name, provider)?,
                None => default_provider.to_string(),
            };

            let activation = plugin.activate(&ActivationContext {
                firewall: name,
                options: &options,
                user_provider: &user_provider,
                entry_point: state.entry_point.as_deref(),
                stateless: spec.stateless,
            })?;
            debug!(firewall = %name, plugin = %key, listener = %activation.listener_id, "activated plugin");

            state.listeners.push(activation.listener_id.clone());
            if let Some(entry_point) = &activation.entry_point_id {
                if state.entry_point.as_ref() != Some(entry_point) {
                    debug!(firewall = %name, plugin = %key, entry_point = %entry_point, "entry point replaced");
                }
                state.entry_point = Some(entry_point.clone());
            }
            if let Some(provider) = &activation.authentication_provider_id {
                state.providers.push(provider.clone());
            }
            state.plugin_keys.push(key.clone());
            state.plugins.push(ActivatedPlugin { key, activation });
        }

        Ok(())
    }
}

/// An explicit matcher id wins; otherwise one is synthesized from
/// pattern/host/methods. `None` matches every request.
fn resolve_matcher(spec: &FirewallSpec, matchers: &mut RequestMatcherRegistry) -> Option<String> {
    if let Some(id) = &spec.request_matcher {
        return Some(id.clone());
    }
    if spec.pattern.is_none() && spec.host.is_none() {
        return None;
    }

    let mut matcher = RequestMatcherSpec::new().methods(&spec.methods);
    matcher.path = spec.pattern.clone();
    matcher.host = spec.host.clone();
    Some(matchers.resolve(matcher))
}
