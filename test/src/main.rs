//! Security Configuration Demo Application
//!
//! Builds the security pipeline described by a YAML document and logs the
//! resulting routing table.
//!
//! ```text
//! RUST_LOG=debug cargo run -p actix-security-config-test -- security.yaml
//! ```
//!
//! Without an argument the bundled `security.yaml` is used.

use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use actix_security_config::http::security::{
    ConfigError, PluginRegistry, SecurityConfig, SecurityPipeline, SecurityPipelineBuilder,
};

const DEFAULT_CONFIG: &str = include_str!("../security.yaml");

/// Reads the document named on the command line, or the bundled one.
fn load_config() -> Result<SecurityConfig, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => {
            let yaml = std::fs::read_to_string(&path).map_err(|e| ConfigError::InvalidConfiguration {
                reason: format!("{}: {}", path, e),
            })?;
            SecurityConfig::from_yaml_str(&yaml)
        }
        None => SecurityConfig::from_yaml_str(DEFAULT_CONFIG),
    }
}

fn log_pipeline(pipeline: &SecurityPipeline) {
    for context in &pipeline.routing_table {
        let config = &context.config;
        info!(
            firewall = %context.name(),
            matcher = ?context.matcher,
            security = config.is_security_enabled(),
            stateless = config.is_stateless(),
            context = ?config.context(),
            entry_point = ?config.entry_point(),
            plugins = ?config.plugin_keys(),
            "firewall"
        );
        for listener in &context.listeners {
            info!(firewall = %context.name(), listener = %listener, "  listener");
        }
    }

    info!(providers = ?pipeline.authentication_providers, "authentication providers");
    for entry in pipeline.access_map.entries() {
        info!(matcher = %entry.matcher, attributes = ?entry.attributes, "access rule");
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let pipeline = load_config()
        .and_then(|config| SecurityPipelineBuilder::new(PluginRegistry::with_defaults()).build(&config));

    match pipeline {
        Ok(pipeline) => {
            log_pipeline(&pipeline);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "security configuration rejected");
            ExitCode::FAILURE
        }
    }
}
