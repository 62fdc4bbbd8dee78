//! Pipeline positions.
//!
//! # Spring Security Equivalent
//! `SecurityWebFiltersOrder` / the fixed filter order of `HttpSecurity`

use std::fmt;
use std::str::FromStr;

use crate::http::error::ConfigError;

/// The fixed stages a firewall plugin can occupy.
///
/// The declaration order is the pipeline order: plugins at an earlier
/// position always run before plugins at a later one, whatever order they
/// were registered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PluginPosition {
    PreAuthentication,
    AuthenticationForm,
    AuthenticationHttp,
    AuthenticationRememberMe,
    AuthenticationAnonymous,
    PostAuthentication,
    PreAuthorization,
    AuthorizationDefaultRbac,
    PostAuthorization,
}

impl PluginPosition {
    /// All positions, in pipeline order.
    pub const ALL: [PluginPosition; 9] = [
        PluginPosition::PreAuthentication,
        PluginPosition::AuthenticationForm,
        PluginPosition::AuthenticationHttp,
        PluginPosition::AuthenticationRememberMe,
        PluginPosition::AuthenticationAnonymous,
        PluginPosition::PostAuthentication,
        PluginPosition::PreAuthorization,
        PluginPosition::AuthorizationDefaultRbac,
        PluginPosition::PostAuthorization,
    ];

    /// The position code used in configuration.
    pub fn code(&self) -> &'static str {
        match self {
            PluginPosition::PreAuthentication => "pre_auth",
            PluginPosition::AuthenticationForm => "form",
            PluginPosition::AuthenticationHttp => "http",
            PluginPosition::AuthenticationRememberMe => "remember_me",
            PluginPosition::AuthenticationAnonymous => "anon",
            PluginPosition::PostAuthentication => "post_authentication",
            PluginPosition::PreAuthorization => "pre_authorization",
            PluginPosition::AuthorizationDefaultRbac => "default_rbac",
            PluginPosition::PostAuthorization => "post_authorization",
        }
    }

    /// Parses a position code declared by the plugin registered under `key`.
    pub fn parse(key: &str, code: &str) -> Result<Self, ConfigError> {
        PluginPosition::ALL
            .iter()
            .copied()
            .find(|p| p.code() == code)
            .ok_or_else(|| ConfigError::UnknownPosition {
                key: key.to_string(),
                position: code.to_string(),
            })
    }

    /// Whether plugins at this position authenticate requests.
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            PluginPosition::AuthenticationForm
                | PluginPosition::AuthenticationHttp
                | PluginPosition::AuthenticationRememberMe
                | PluginPosition::AuthenticationAnonymous
        )
    }
}

impl fmt::Display for PluginPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for PluginPosition {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PluginPosition::parse("<unnamed>", s)
    }
}
