//! Logout listener and logout URL table.
//!
//! # Spring Security Equivalent
//! `LogoutConfigurer` / `LogoutFilter`
//!
//! # Example
//! ```
//! use actix_security_config::http::security::{LogoutListener, LogoutSpec};
//!
//! let listener = LogoutListener::build("main", &LogoutSpec::new().delete_cookies(&["REMEMBERME"]), false);
//!
//! assert_eq!(listener.id, "security.logout_listener.main");
//! assert_eq!(listener.handlers.len(), 2);
//! ```

use crate::http::security::firewall::LogoutSpec;

/// Session handler id, shared by all firewalls.
pub const SESSION_LOGOUT_HANDLER: &str = "security.logout.handler.session";

/// A handler called on logout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoutHandler {
    /// Invalidates the session
    Session,
    /// Expires the listed cookies
    CookieClearing { id: String, cookies: Vec<String> },
    /// A handler service configured by the application
    Custom(String),
}

impl LogoutHandler {
    pub fn id(&self) -> &str {
        match self {
            LogoutHandler::Session => SESSION_LOGOUT_HANDLER,
            LogoutHandler::CookieClearing { id, .. } => id,
            LogoutHandler::Custom(id) => id,
        }
    }
}

/// What happens after logout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoutSuccessHandler {
    /// Redirects to `target`
    Default { id: String, target: String },
    Custom(String),
}

impl LogoutSuccessHandler {
    pub fn id(&self) -> &str {
        match self {
            LogoutSuccessHandler::Default { id, .. } => id,
            LogoutSuccessHandler::Custom(id) => id,
        }
    }
}

/// The logout listener of one firewall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutListener {
    pub id: String,
    pub path: String,
    pub csrf_parameter: String,
    pub csrf_token_id: String,
    pub csrf_token_generator: Option<String>,
    pub success_handler: LogoutSuccessHandler,
    /// Called in order: session, cookie clearing, then custom handlers
    pub handlers: Vec<LogoutHandler>,
}

impl LogoutListener {
    pub fn build(firewall: &str, spec: &LogoutSpec, stateless: bool) -> Self {
        let success_handler = match &spec.success_handler {
            Some(id) => LogoutSuccessHandler::Custom(id.clone()),
            None => LogoutSuccessHandler::Default {
                id: format!("security.logout.success_handler.{}", firewall),
                target: spec.target.clone(),
            },
        };

        let mut handlers = Vec::new();
        if spec.invalidate_session && !stateless {
            handlers.push(LogoutHandler::Session);
        }
        if !spec.delete_cookies.is_empty() {
            handlers.push(LogoutHandler::CookieClearing {
                id: format!("security.logout.handler.cookie_clearing.{}", firewall),
                cookies: spec.delete_cookies.clone(),
            });
        }
        handlers.extend(spec.handlers.iter().cloned().map(LogoutHandler::Custom));

        LogoutListener {
            id: format!("security.logout_listener.{}", firewall),
            path: spec.path.clone(),
            csrf_parameter: spec.csrf_parameter.clone(),
            csrf_token_id: spec.csrf_token_id.clone(),
            csrf_token_generator: spec.csrf_token_generator.clone(),
            success_handler,
            handlers,
        }
    }
}

// =============================================================================
// Logout URLs
// =============================================================================

/// What a logout URL generator needs to know about one firewall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutUrl {
    pub firewall: String,
    pub path: String,
    pub csrf_token_id: String,
    pub csrf_parameter: String,
    pub csrf_token_generator: Option<String>,
    /// Set only for stateful firewalls with an explicit `context`
    pub context: Option<String>,
}

/// Logout URLs by firewall, in registration order.
#[derive(Debug, Clone, Default)]
pub struct LogoutUrlRegistry {
    entries: Vec<LogoutUrl>,
}

impl LogoutUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, entry: LogoutUrl) {
        self.entries.push(entry);
    }

    pub fn get(&self, firewall: &str) -> Option<&LogoutUrl> {
        self.entries.iter().find(|e| e.firewall == firewall)
    }

    pub fn entries(&self) -> &[LogoutUrl] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
