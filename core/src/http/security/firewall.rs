//! Firewall input specs and assembled firewall configs.
//!
//! # Spring Security Equivalent
//! `HttpSecurity` (input) and `SecurityFilterChain` (output)

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::http::security::plugin::normalize_key;

/// Default user checker service.
pub const DEFAULT_USER_CHECKER: &str = "security.user_checker";

// =============================================================================
// Firewall Spec
// =============================================================================

/// One firewall as declared in configuration.
///
/// Known options are typed fields; every other key is a plugin key and is
/// kept (normalized) in [`plugins`](Self::plugins).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FirewallSpec {
    /// Firewall name; filled from the map key when loaded from a document
    #[serde(skip)]
    pub name: String,
    pub pattern: Option<String>,
    pub host: Option<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub methods: Vec<String>,
    /// Explicit matcher service id; wins over pattern/host
    pub request_matcher: Option<String>,
    #[serde(default = "default_true")]
    pub security: bool,
    #[serde(default)]
    pub stateless: bool,
    /// Provider name (not id)
    pub provider: Option<String>,
    pub context: Option<String>,
    pub entry_point: Option<String>,
    pub access_denied_handler: Option<String>,
    pub access_denied_url: Option<String>,
    #[serde(default = "default_user_checker")]
    pub user_checker: String,
    /// `logout: ~` enables logout with defaults
    #[serde(default, deserialize_with = "enabled_with_defaults")]
    pub logout: Option<LogoutSpec>,
    /// Per-plugin options, keyed by normalized plugin key
    #[serde(flatten)]
    pub plugins: Map<String, Value>,
}

fn default_true() -> bool {
    true
}

fn default_user_checker() -> String {
    DEFAULT_USER_CHECKER.to_string()
}

impl FirewallSpec {
    /// Creates a security-enabled, stateful firewall with no plugins.
    pub fn new(name: impl Into<String>) -> Self {
        FirewallSpec {
            name: name.into(),
            pattern: None,
            host: None,
            methods: Vec::new(),
            request_matcher: None,
            security: true,
            stateless: false,
            provider: None,
            context: None,
            entry_point: None,
            access_denied_handler: None,
            access_denied_url: None,
            user_checker: default_user_checker(),
            logout: None,
            plugins: Map::new(),
        }
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn methods(mut self, methods: &[&str]) -> Self {
        self.methods = methods.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn request_matcher(mut self, id: impl Into<String>) -> Self {
        self.request_matcher = Some(id.into());
        self
    }

    pub fn security(mut self, enabled: bool) -> Self {
        self.security = enabled;
        self
    }

    pub fn stateless(mut self, stateless: bool) -> Self {
        self.stateless = stateless;
        self
    }

    pub fn provider(mut self, name: impl Into<String>) -> Self {
        self.provider = Some(name.into());
        self
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn entry_point(mut self, id: impl Into<String>) -> Self {
        self.entry_point = Some(id.into());
        self
    }

    pub fn access_denied_handler(mut self, id: impl Into<String>) -> Self {
        self.access_denied_handler = Some(id.into());
        self
    }

    pub fn access_denied_url(mut self, url: impl Into<String>) -> Self {
        self.access_denied_url = Some(url.into());
        self
    }

    pub fn user_checker(mut self, id: impl Into<String>) -> Self {
        self.user_checker = id.into();
        self
    }

    pub fn logout(mut self, logout: LogoutSpec) -> Self {
        self.logout = Some(logout);
        self
    }

    /// Enables a plugin with the given options (`Value::Null` for defaults).
    pub fn plugin(mut self, key: &str, options: Value) -> Self {
        self.plugins.insert(normalize_key(key), options);
        self
    }

    /// Options configured for a plugin, matching keys after dash
    /// normalization on both sides.
    pub fn plugin_options(&self, key: &str) -> Option<&Value> {
        let key = normalize_key(key);
        self.plugins
            .get(&key)
            .or_else(|| self.plugins.iter().find(|(k, _)| normalize_key(k) == key).map(|(_, v)| v))
    }

    /// Re-keys plugin options with normalized keys.
    pub(crate) fn normalize_plugin_keys(&mut self) {
        if self.plugins.keys().all(|k| !k.contains('-')) {
            return;
        }
        let plugins = std::mem::take(&mut self.plugins);
        self.plugins = plugins
            .into_iter()
            .map(|(k, v)| (normalize_key(&k), v))
            .collect();
    }
}

// =============================================================================
// Logout Spec
// =============================================================================

/// Logout options of a firewall.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogoutSpec {
    pub csrf_parameter: String,
    pub csrf_token_id: String,
    pub csrf_token_generator: Option<String>,
    pub path: String,
    pub target: String,
    pub success_handler: Option<String>,
    pub invalidate_session: bool,
    pub delete_cookies: Vec<String>,
    pub handlers: Vec<String>,
}

impl Default for LogoutSpec {
    fn default() -> Self {
        LogoutSpec {
            csrf_parameter: "_csrf_token".to_string(),
            csrf_token_id: "logout".to_string(),
            csrf_token_generator: None,
            path: "/logout".to_string(),
            target: "/".to_string(),
            success_handler: None,
            invalidate_session: true,
            delete_cookies: Vec::new(),
            handlers: Vec::new(),
        }
    }
}

impl LogoutSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    pub fn target(mut self, target: &str) -> Self {
        self.target = target.to_string();
        self
    }

    pub fn success_handler(mut self, id: &str) -> Self {
        self.success_handler = Some(id.to_string());
        self
    }

    pub fn csrf_token_generator(mut self, id: &str) -> Self {
        self.csrf_token_generator = Some(id.to_string());
        self
    }

    pub fn invalidate_session(mut self, invalidate: bool) -> Self {
        self.invalidate_session = invalidate;
        self
    }

    pub fn delete_cookies(mut self, cookies: &[&str]) -> Self {
        self.delete_cookies = cookies.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn handler(mut self, id: &str) -> Self {
        self.handlers.push(id.to_string());
        self
    }
}

// =============================================================================
// Firewall Config
// =============================================================================

/// The assembled, read-only description of one firewall.
///
/// # Spring Security Equivalent
/// `SecurityFilterChain` metadata
#[derive(Debug, Clone, PartialEq)]
pub struct FirewallConfig {
    pub(crate) name: String,
    pub(crate) user_checker: String,
    pub(crate) request_matcher: Option<String>,
    pub(crate) security_enabled: bool,
    pub(crate) stateless: bool,
    pub(crate) provider: Option<String>,
    pub(crate) context: Option<String>,
    pub(crate) entry_point: Option<String>,
    pub(crate) access_denied_handler: Option<String>,
    pub(crate) access_denied_url: Option<String>,
    pub(crate) plugin_keys: Vec<String>,
    pub(crate) allows_anonymous: bool,
}

impl FirewallConfig {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn user_checker(&self) -> &str {
        &self.user_checker
    }

    /// The matcher id, or `None` when the firewall matches every request.
    pub fn request_matcher(&self) -> Option<&str> {
        self.request_matcher.as_deref()
    }

    pub fn is_security_enabled(&self) -> bool {
        self.security_enabled
    }

    pub fn is_stateless(&self) -> bool {
        self.stateless
    }

    /// The default user provider id.
    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    /// The context key; `None` for stateless firewalls.
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn entry_point(&self) -> Option<&str> {
        self.entry_point.as_deref()
    }

    pub fn access_denied_handler(&self) -> Option<&str> {
        self.access_denied_handler.as_deref()
    }

    pub fn access_denied_url(&self) -> Option<&str> {
        self.access_denied_url.as_deref()
    }

    /// Keys of the plugins configured on this firewall, in chain order.
    pub fn plugin_keys(&self) -> &[String] {
        &self.plugin_keys
    }

    pub fn allows_anonymous(&self) -> bool {
        self.allows_anonymous
    }

    /// Overrides the anonymous flag; meant for [`FirewallConfigAmender`]s.
    ///
    /// [`FirewallConfigAmender`]: crate::http::security::FirewallConfigAmender
    pub fn set_allows_anonymous(&mut self, allows: bool) {
        self.allows_anonymous = allows;
    }

    /// Appends a plugin key; meant for [`FirewallConfigAmender`]s.
    ///
    /// [`FirewallConfigAmender`]: crate::http::security::FirewallConfigAmender
    pub fn push_plugin_key(&mut self, key: &str) {
        let key = normalize_key(key);
        if !self.plugin_keys.contains(&key) {
            self.plugin_keys.push(key);
        }
    }
}

fn enabled_with_defaults<'de, D>(deserializer: D) -> Result<Option<LogoutSpec>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Some(Option::<LogoutSpec>::deserialize(deserializer)?.unwrap_or_default()))
}

/// Accepts `"GET, POST"` as well as `[GET, POST]`.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        String(String),
        List(Vec<String>),
    }

    Ok(match StringOrList::deserialize(deserializer)? {
        StringOrList::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        StringOrList::List(list) => list,
    })
}
