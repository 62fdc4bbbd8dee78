//! Expression language for `allow_if` access rules.
//!
//! # Spring Security Equivalent
//! `org.springframework.security.access.expression`
//!
//! # Supported Expressions
//!
//! ## Functions
//! - `is_granted('ROLE')`, `has_role('ROLE')`
//! - `is_anonymous()`, `is_authenticated()`, `is_fully_authenticated()`,
//!   `is_remember_me()`
//!
//! ## Variables
//! `token`, `user`, `object`, `roles`, `request`, `trust_resolver`, with
//! property access (`user.username`) and method calls
//! (`request.client_ip()`).
//!
//! ## Operators
//! - `and` / `&&`, `or` / `||`, `not` / `!`
//! - `==`, `!=`, `<`, `>`, `<=`, `>=`, `in`, `not in`, `matches`
//! - `(` `)` grouping, `[a, b]` arrays
//!
//! Expressions are only compiled here. Evaluating them against a request
//! belongs to the runtime access decision layer.

mod ast;
mod parser;

use std::collections::HashMap;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::http::error::ConfigError;

pub use ast::{BinaryOp, Expression, Literal, UnaryOp};
pub use parser::{ParseError, SecurityExpression, ALLOWED_VARIABLES, FUNCTIONS};

/// Prefix of compiled expression ids.
pub const EXPRESSION_PREFIX: &str = "security.expression.";

/// A compiled expression and its id.
#[derive(Debug, Clone)]
pub struct ExpressionDefinition {
    pub id: String,
    pub expression: SecurityExpression,
}

/// Compiles expressions once per distinct source text.
#[derive(Debug, Clone, Default)]
pub struct ExpressionRegistry {
    index: HashMap<String, usize>,
    definitions: Vec<ExpressionDefinition>,
}

impl ExpressionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of the compiled expression, compiling it on first use.
    pub fn register(&mut self, source: &str) -> Result<String, ConfigError> {
        let id = format!("{}{}", EXPRESSION_PREFIX, hex::encode(Sha256::digest(source.as_bytes())));
        if self.index.contains_key(&id) {
            debug!(expression = %id, "reusing compiled expression");
            return Ok(id);
        }

        let expression =
            SecurityExpression::parse(source).map_err(|e| ConfigError::InvalidExpression {
                expression: source.to_string(),
                reason: e.to_string(),
            })?;

        self.index.insert(id.clone(), self.definitions.len());
        self.definitions.push(ExpressionDefinition {
            id: id.clone(),
            expression,
        });
        Ok(id)
    }

    pub fn get(&self, id: &str) -> Option<&ExpressionDefinition> {
        self.index.get(id).map(|i| &self.definitions[*i])
    }

    pub fn definitions(&self) -> &[ExpressionDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
