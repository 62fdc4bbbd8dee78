//! Exception translation listener.
//!
//! # Spring Security Equivalent
//! `ExceptionTranslationFilter`

/// How an access-denied failure is answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDenied {
    /// A handler service
    Handler(String),
    /// Forward to an error page
    Url(String),
}

/// Wraps a firewall's listener chain and turns security failures into
/// responses: starts authentication via the entry point, or denies access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionListener {
    pub id: String,
    pub entry_point: Option<String>,
    pub access_denied: Option<AccessDenied>,
    pub stateless: bool,
}

impl ExceptionListener {
    /// A handler wins over a URL; only one is bound.
    pub fn build(
        firewall: &str,
        entry_point: Option<&str>,
        access_denied_handler: Option<&str>,
        access_denied_url: Option<&str>,
        stateless: bool,
    ) -> Self {
        let access_denied = access_denied_handler
            .map(|id| AccessDenied::Handler(id.to_string()))
            .or_else(|| access_denied_url.map(|url| AccessDenied::Url(url.to_string())));

        ExceptionListener {
            id: format!("security.exception_listener.{}", firewall),
            entry_point: entry_point.map(str::to_string),
            access_denied,
            stateless,
        }
    }
}
