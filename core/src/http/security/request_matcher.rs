//! Request matcher definitions.
//!
//! # Spring Security Equivalent
//! `RequestMatcher` beans registered by `HttpSecurity.securityMatcher(..)`
//!
//! Matchers are content-addressed: the id is derived from the matcher's
//! arguments, so two firewalls (or access rules) using the same
//! path/host/methods/ips/attributes share one definition.

use std::collections::BTreeMap;
use std::collections::HashMap;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Prefix of synthesized matcher ids.
pub const REQUEST_MATCHER_PREFIX: &str = "security.request_matcher.";

/// The arguments of a request matcher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestMatcherSpec {
    /// Path regex
    pub path: Option<String>,
    /// Host regex
    pub host: Option<String>,
    /// HTTP methods (upper-cased)
    pub methods: Vec<String>,
    /// Client IP allow-list
    pub ips: Vec<String>,
    /// Request attributes to match
    pub attributes: BTreeMap<String, String>,
}

impl RequestMatcherSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Methods are matched case-insensitively and stored upper-cased.
    pub fn methods<S: AsRef<str>>(mut self, methods: &[S]) -> Self {
        self.methods = methods.iter().map(|m| m.as_ref().to_uppercase()).collect();
        self
    }

    pub fn ips<S: AsRef<str>>(mut self, ips: &[S]) -> Self {
        self.ips = ips.iter().map(|ip| ip.as_ref().to_string()).collect();
        self
    }

    pub fn attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    /// The content-addressed id of this matcher.
    pub fn id(&self) -> String {
        // Serializing plain strings, vectors and a BTreeMap cannot fail.
        let canonical = serde_json::to_vec(self).unwrap_or_default();
        let digest = Sha256::digest(&canonical);
        format!("{}{}", REQUEST_MATCHER_PREFIX, hex::encode(digest))
    }

    /// Number of leading arguments a matcher needs: trailing empty
    /// arguments are dropped.
    pub fn argument_count(&self) -> usize {
        let present = [
            self.path.is_some(),
            self.host.is_some(),
            !self.methods.is_empty(),
            !self.ips.is_empty(),
            !self.attributes.is_empty(),
        ];
        present.iter().rposition(|p| *p).map_or(0, |i| i + 1)
    }
}

/// A registered matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMatcherDefinition {
    pub id: String,
    pub spec: RequestMatcherSpec,
    /// See [`RequestMatcherSpec::argument_count`]
    pub argument_count: usize,
}

/// Memoizes matcher definitions by content.
#[derive(Debug, Clone, Default)]
pub struct RequestMatcherRegistry {
    index: HashMap<String, usize>,
    definitions: Vec<RequestMatcherDefinition>,
}

impl RequestMatcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of the matcher for `spec`, registering it on first use.
    pub fn resolve(&mut self, spec: RequestMatcherSpec) -> String {
        let id = spec.id();
        if self.index.contains_key(&id) {
            debug!(matcher = %id, "reusing request matcher");
            return id;
        }

        let argument_count = spec.argument_count();
        self.index.insert(id.clone(), self.definitions.len());
        self.definitions.push(RequestMatcherDefinition {
            id: id.clone(),
            spec,
            argument_count,
        });
        id
    }

    pub fn get(&self, id: &str) -> Option<&RequestMatcherDefinition> {
        self.index.get(id).map(|i| &self.definitions[*i])
    }

    /// Definitions in registration order.
    pub fn definitions(&self) -> &[RequestMatcherDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
