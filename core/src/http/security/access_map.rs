//! Global access-control rules.
//!
//! # Spring Security Equivalent
//! `AuthorizationManagerRequestMatcherRegistry` (`authorizeHttpRequests`)
//!
//! Each rule becomes one entry: the id of its request matcher (shared with
//! firewalls through the matcher registry), the attributes to vote on (roles
//! and compiled `allow_if` expressions) and an optional channel requirement.

#[cfg(feature = "expression")]
use crate::http::security::expression::ExpressionRegistry;
use crate::http::error::ConfigError;
use crate::http::security::config::AccessControlRule;
use crate::http::security::request_matcher::{RequestMatcherRegistry, RequestMatcherSpec};

/// One attribute an access decision votes on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessAttribute {
    Role(String),
    /// Id of a compiled expression
    Expression(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessMapEntry {
    pub matcher: String,
    pub attributes: Vec<AccessAttribute>,
    /// `http` or `https`
    pub requires_channel: Option<String>,
}

/// Ordered access rules; the first matching entry applies at request time.
#[derive(Debug, Clone, Default)]
pub struct AccessMap {
    entries: Vec<AccessMapEntry>,
    #[cfg(feature = "expression")]
    expressions: ExpressionRegistry,
}

impl AccessMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule, registering its matcher and compiling its expression.
    pub fn add_rule(
        &mut self,
        rule: &AccessControlRule,
        matchers: &mut RequestMatcherRegistry,
    ) -> Result<(), ConfigError> {
        let mut spec = RequestMatcherSpec::new().methods(&rule.methods).ips(&rule.ips);
        spec.path = rule.path.clone();
        spec.host = rule.host.clone();
        let matcher = matchers.resolve(spec);

        let mut attributes: Vec<AccessAttribute> =
            rule.roles.iter().cloned().map(AccessAttribute::Role).collect();
        if let Some(source) = &rule.allow_if {
            attributes.push(AccessAttribute::Expression(self.compile(source)?));
        }

        self.entries.push(AccessMapEntry {
            matcher,
            attributes,
            requires_channel: rule.requires_channel.clone(),
        });
        Ok(())
    }

    #[cfg(feature = "expression")]
    fn compile(&mut self, source: &str) -> Result<String, ConfigError> {
        self.expressions.register(source)
    }

    #[cfg(not(feature = "expression"))]
    fn compile(&mut self, _source: &str) -> Result<String, ConfigError> {
        Err(ConfigError::MissingOptionalComponent {
            component: "expression language",
            feature: "expression",
        })
    }

    pub fn entries(&self) -> &[AccessMapEntry] {
        &self.entries
    }

    /// Compiled `allow_if` expressions.
    #[cfg(feature = "expression")]
    pub fn expressions(&self) -> &ExpressionRegistry {
        &self.expressions
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
