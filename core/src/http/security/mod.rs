//! Firewall configuration and pipeline assembly.
//!
//! # Spring Equivalent
//! `org.springframework.security.config.annotation.web` package
//!
//! # Module Structure
//!
//! - `position` - Fixed pipeline stages (PluginPosition)
//! - `plugin` - Plugin contract (FirewallPlugin, PluginActivation, PluginSchema)
//! - `chain` - Plugin registration and ordering (PluginRegistry, PluginChain)
//! - `plugins` - Built-in plugins (form login, HTTP basic, remember-me, ...)
//! - `config` - The configuration document (SecurityConfig)
//! - `firewall` - Firewall specs and assembled firewall configs
//! - `request_matcher` - Content-addressed request matchers
//! - `user_provider` - User provider declarations and factories
//! - `context_listener` - Context persistence listeners
//! - `logout` - Logout listener and logout URL table
//! - `exception` - Exception translation listener
//! - `access_map` - Global access-control rules
//! - `expression` - `allow_if` expression language
//! - `assembler` - Per-firewall assembly (FirewallAssembler)
//! - `builder` - Whole-pipeline build (SecurityPipelineBuilder)
//!
//! # Feature Flags
//! - `expression`: Enables `allow_if` access rules (enabled by default)

// Re-exports for convenience
pub use crate::http::error::ConfigError;
pub use access_map::{AccessAttribute, AccessMap, AccessMapEntry};
pub use assembler::{FirewallAssembler, SharedState, CHANNEL_LISTENER};
pub use builder::{
    ActivatedPlugin, FirewallContext, GlobalParameters, RoleVoter, RoutingTable, SecurityPipeline,
    SecurityPipelineBuilder,
};
pub use chain::{PluginChain, PluginRegistry};
pub use config::{
    AccessControlRule, AccessDecisionManagerConfig, ChainSpec, DecisionStrategy, ProviderSpec,
    RoleList, SecurityConfig, SessionFixationStrategy,
};
pub use context_listener::{ContextListener, ContextListenerRegistry};
pub use exception::{AccessDenied, ExceptionListener};
pub use firewall::{FirewallConfig, FirewallSpec, LogoutSpec, DEFAULT_USER_CHECKER};
pub use logout::{
    LogoutHandler, LogoutListener, LogoutSuccessHandler, LogoutUrl, LogoutUrlRegistry,
    SESSION_LOGOUT_HANDLER,
};
pub use plugin::{
    normalize_key, ActivationContext, FirewallConfigAmender, FirewallPlugin, PluginActivation,
    PluginOptions, PluginSchema,
};
pub use position::PluginPosition;
pub use request_matcher::{
    RequestMatcherDefinition, RequestMatcherRegistry, RequestMatcherSpec, REQUEST_MATCHER_PREFIX,
};
pub use user_provider::{
    provider_id, InMemoryUserProviderFactory, UserProviderDefinition, UserProviderFactory,
    UserProviderKind, UserProviders, USER_PROVIDER_PREFIX,
};

// Internal modules
mod assembler;
mod builder;
mod context_listener;
mod exception;

// Public modules
pub mod access_map;
pub mod chain;
pub mod config;
#[cfg(feature = "expression")]
pub mod expression;
pub mod firewall;
pub mod logout;
pub mod plugin;
pub mod plugins;
pub mod position;
pub mod request_matcher;
pub mod user_provider;
