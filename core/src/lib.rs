//! # Actix Security Config
//!
//! Firewall configuration and authentication-pipeline assembly for
//! `actix-security`.
//!
//! A [`SecurityConfig`](http::security::SecurityConfig) declares named
//! firewalls; a [`PluginRegistry`](http::security::PluginRegistry) holds the
//! authentication/authorization plugins the application knows about. The
//! [`SecurityPipelineBuilder`](http::security::SecurityPipelineBuilder) turns
//! both into an ordered routing table of firewall contexts.
//!
//! ## Example
//!
//! ```rust
//! use actix_security_config::http::security::{
//!     PluginRegistry, SecurityConfig, SecurityPipelineBuilder,
//! };
//!
//! let config = SecurityConfig::from_yaml_str(r#"
//! providers:
//!   in_memory:
//!     memory:
//!       users:
//!         admin: { password: admin, roles: [ROLE_ADMIN] }
//! firewalls:
//!   api:
//!     pattern: ^/api
//!     stateless: true
//!     http_basic: ~
//!   main:
//!     pattern: ^/
//!     form_login: { login_path: /login }
//!     anonymous: ~
//! "#).unwrap();
//!
//! let pipeline = SecurityPipelineBuilder::new(PluginRegistry::with_defaults())
//!     .build(&config)
//!     .unwrap();
//!
//! assert_eq!(pipeline.routing_table.len(), 2);
//! assert_eq!(pipeline.routing_table.get("main").unwrap().config.context(), Some("main"));
//! ```

pub mod http;
