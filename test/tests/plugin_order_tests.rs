//! Plugin ordering tests.
//!
//! Plugins run in the fixed position order whatever order they were
//! registered in; plugins sharing a position keep registration order.


use serde_json::Value;

use actix_security_config::http::security::{
    FirewallPlugin, FirewallSpec, PluginChain, PluginPosition, PluginRegistry,
};

use common::{activation_log, base_config, build, ActivationLog, RecordingPlugin};

const KEYS: [&str; 12] = [
    "k0", "k1", "k2", "k3", "k4", "k5", "k6", "k7", "k8", "k9", "k10", "k11",
];

/// Registers `KEYS[i]` at `positions[i]`.
fn registry(positions: &[PluginPosition], log: &ActivationLog) -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    for (key, position) in KEYS.iter().zip(positions) {
        registry
            .register(RecordingPlugin::new(*key, *position, log).authenticates())
            .unwrap();
    }
    registry
}

/// Deterministic pseudo-random positions.
fn scrambled_positions(seed: usize, count: usize) -> Vec<PluginPosition> {
    (0..count)
        .map(|i| PluginPosition::ALL[(i * 7 + seed * 5 + i * i * seed) % PluginPosition::ALL.len()])
        .collect()
}

// =============================================================================
// Sort Tests
// =============================================================================

#[test]
fn test_sort_positions_non_decreasing() {
    let log = activation_log();
    for seed in 0..20 {
        let positions = scrambled_positions(seed, KEYS.len());
        let registry = registry(&positions, &log);
        let sorted: Vec<_> = registry.sorted().iter().map(|p| p.position()).collect();

        assert_eq!(sorted.len(), KEYS.len());
        assert!(
            sorted.windows(2).all(|w| w[0] <= w[1]),
            "seed {} gave {:?}",
            seed,
            sorted
        );
    }
}

#[test]
fn test_sort_stable_within_position() {
    let log = activation_log();
    for seed in 0..20 {
        let positions = scrambled_positions(seed, KEYS.len());
        let registry = registry(&positions, &log);
        let chain = registry.sorted();

        for position in PluginPosition::ALL {
            let expected: Vec<&str> = KEYS
                .iter()
                .zip(&positions)
                .filter(|(_, p)| **p == position)
                .map(|(k, _)| *k)
                .collect();
            let actual: Vec<&str> = chain
                .iter()
                .filter(|p| p.position() == position)
                .map(|p| p.key())
                .collect();
            assert_eq!(actual, expected, "seed {} position {}", seed, position.code());
        }
    }
}

#[test]
fn test_sort_from_plain_slice() {
    let log = activation_log();
    let late = RecordingPlugin::new("late", PluginPosition::PostAuthorization, &log);
    let early = RecordingPlugin::new("early", PluginPosition::PreAuthentication, &log);
    let plugins: [&dyn FirewallPlugin; 2] = [&late, &early];

    let chain = PluginChain::sort(plugins);
    assert_eq!(chain.keys(), vec!["early", "late"]);
}

#[test]
fn test_position_codes_round_trip() {
    for position in PluginPosition::ALL {
        assert_eq!(PluginPosition::parse("p", position.code()), Ok(position));
    }
    assert!(PluginPosition::parse("p", "match_request").is_err());
}

// =============================================================================
// Activation Order Tests
// =============================================================================

#[test]
fn test_activation_follows_position_order() {
    let log = activation_log();
    let registry = PluginRegistry::new()
        .with_plugin(RecordingPlugin::new("authorize", PluginPosition::AuthorizationDefaultRbac, &log))
        .unwrap()
        .with_plugin(RecordingPlugin::new("basic", PluginPosition::AuthenticationHttp, &log).authenticates())
        .unwrap()
        .with_plugin(RecordingPlugin::new("x509", PluginPosition::PreAuthentication, &log).authenticates())
        .unwrap();

    let config = base_config().firewall(
        FirewallSpec::new("main")
            .stateless(true)
            .plugin("authorize", Value::Null)
            .plugin("basic", Value::Null)
            .plugin("x509", Value::Null),
    );
    let pipeline = build(registry, &config).unwrap();

    let keys: Vec<String> = log.borrow().iter().map(|a| a.key.clone()).collect();
    assert_eq!(keys, vec!["x509", "basic", "authorize"]);

    let main = pipeline.routing_table.get("main").unwrap();
    assert_eq!(
        main.listeners,
        vec![
            "security.channel_listener",
            "x509.listener.main",
            "basic.listener.main",
            "authorize.listener.main",
        ]
    );
    assert_eq!(main.config.plugin_keys(), ["x509", "basic", "authorize"]);
}

#[test]
fn test_unconfigured_plugins_not_activated() {
    let log = activation_log();
    let registry = PluginRegistry::new()
        .with_plugin(RecordingPlugin::new("basic", PluginPosition::AuthenticationHttp, &log).authenticates())
        .unwrap()
        .with_plugin(RecordingPlugin::new("unused", PluginPosition::PreAuthentication, &log))
        .unwrap();

    let config = base_config().firewall(
        FirewallSpec::new("main")
            .plugin("basic", Value::Null)
            .plugin("nobody_knows_me", Value::Null),
    );
    let pipeline = build(registry, &config).unwrap();

    assert_eq!(log.borrow().len(), 1);
    assert_eq!(
        pipeline.routing_table.get("main").unwrap().config.plugin_keys(),
        ["basic"]
    );
}

#[test]
fn test_disabled_plugin_not_activated() {
    let log = activation_log();
    let registry = PluginRegistry::new()
        .with_plugin(RecordingPlugin::new("basic", PluginPosition::AuthenticationHttp, &log).authenticates())
        .unwrap()
        .with_plugin(RecordingPlugin::new("remember", PluginPosition::AuthenticationRememberMe, &log).authenticates())
        .unwrap();

    let config = base_config().firewall(
        FirewallSpec::new("main")
            .plugin("basic", Value::Bool(true))
            .plugin("remember", Value::Bool(false)),
    );
    build(registry, &config).unwrap();

    let keys: Vec<String> = log.borrow().iter().map(|a| a.key.clone()).collect();
    assert_eq!(keys, vec!["basic"]);
}

#[test]
fn test_dashed_keys_select_plugins() {
    let log = activation_log();
    let registry = PluginRegistry::new()
        .with_plugin(RecordingPlugin::new("api-key", PluginPosition::PreAuthentication, &log).authenticates())
        .unwrap();

    let config = base_config().firewall(FirewallSpec::new("main").plugin("api_key", Value::Null));
    let pipeline = build(registry, &config).unwrap();

    assert_eq!(log.borrow()[0].key, "api-key");
    assert_eq!(
        pipeline.routing_table.get("main").unwrap().config.plugin_keys(),
        ["api_key"]
    );
}

#[test]
fn test_dashed_keys_inserted_into_spec() {
    let log = activation_log();
    let registry = PluginRegistry::new()
        .with_plugin(RecordingPlugin::new("api_key", PluginPosition::PreAuthentication, &log).authenticates())
        .unwrap();

    let mut spec = FirewallSpec::new("main");
    spec.plugins.insert("api-key".to_string(), Value::Null);
    let pipeline = build(registry, &base_config().firewall(spec)).unwrap();

    assert_eq!(log.borrow().len(), 1);
    assert_eq!(
        pipeline.routing_table.get("main").unwrap().config.plugin_keys(),
        ["api_key"]
    );
}
