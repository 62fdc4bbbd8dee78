//! Configuration document tests.
//!
//! Tests for building a whole pipeline from YAML and JSON documents:
//! - Providers, firewalls and global settings
//! - Data-declared plugins
//! - Load and build failures


use actix_security_config::http::security::plugins::DeclaredPlugin;
use actix_security_config::http::security::{
    ConfigError, DecisionStrategy, LogoutHandler, PluginRegistry, RoleVoter, SecurityConfig,
    SessionFixationStrategy, UserProviderKind,
};

use common::{build, build_with_defaults};

const APP_SECURITY: &str = r#"
role_hierarchy:
  ROLE_ADMIN: ROLE_USER
  ROLE_SUPER_ADMIN: [ROLE_ADMIN, ROLE_ALLOWED_TO_SWITCH]

session_fixation_strategy: invalidate
access_decision_manager:
  strategy: unanimous

providers:
  in_memory:
    memory:
      users:
        admin: { password: admin, roles: [ROLE_ADMIN] }
        user: { password: user, roles: ROLE_USER }
  legacy:
    id: app.legacy_user_provider
  all_users:
    chain:
      providers: [in_memory, legacy]

firewalls:
  dev:
    pattern: ^/(_profiler|_wdt|css|images|js)/
    security: false
  api:
    pattern: ^/api
    stateless: true
    provider: legacy
    http-basic:
      realm: API
  main:
    pattern: ^/
    provider: all_users
    form-login:
      login_path: /sign-in
      check_path: /sign-in/check
    remember-me:
      secret: s3cr3t
      lifetime: 604800
    switch_user: ~
    anonymous: ~
    logout:
      path: /sign-out
      delete_cookies: [REMEMBERME]

access_control:
  - { path: ^/admin, roles: [ROLE_ADMIN] }
  - { path: ^/api, roles: [ROLE_API], requires_channel: https }
  - { path: ^/account, allow_if: "is_fully_authenticated() and has_role('ROLE_USER')" }
"#;

// =============================================================================
// Whole Document
// =============================================================================

#[test]
fn test_yaml_document_builds() {
    let config = SecurityConfig::from_yaml_str(APP_SECURITY).unwrap();
    let pipeline = build_with_defaults(&config).unwrap();

    assert_eq!(pipeline.routing_table.names(), ["dev", "api", "main"]);
    assert!(!pipeline.routing_table.get("dev").unwrap().config.is_security_enabled());

    let api = &pipeline.routing_table.get("api").unwrap().config;
    assert_eq!(api.provider(), Some("security.user.provider.concrete.legacy"));
    assert_eq!(api.context(), None);
    assert_eq!(api.plugin_keys(), ["http_basic", "access_control"]);

    let main = pipeline.routing_table.get("main").unwrap();
    assert_eq!(main.config.provider(), Some("security.user.provider.concrete.all_users"));
    assert_eq!(main.config.context(), Some("main"));
    assert_eq!(
        main.config.entry_point(),
        Some("security.authentication.form_entry_point.main")
    );
    assert_eq!(
        main.config.plugin_keys(),
        [
            "logout",
            "form_login",
            "remember_me",
            "anonymous",
            "switch_user",
            "access_control",
        ]
    );
}

#[test]
fn test_yaml_plugin_options_reach_plugins() {
    let config = SecurityConfig::from_yaml_str(APP_SECURITY).unwrap();
    let pipeline = build_with_defaults(&config).unwrap();

    let api = pipeline.routing_table.get("api").unwrap();
    assert_eq!(api.plugin("http_basic").unwrap().options["realm"], "API");

    let main = pipeline.routing_table.get("main").unwrap();
    let form = main.plugin("form_login").unwrap();
    assert_eq!(form.options["login_path"], "/sign-in");
    assert_eq!(form.options["check_path"], "/sign-in/check");

    let remember_me = main.plugin("remember_me").unwrap();
    assert_eq!(remember_me.options["lifetime"], 604800);
    assert_eq!(remember_me.options["name"], "REMEMBERME");
}

#[test]
fn test_yaml_providers() {
    let config = SecurityConfig::from_yaml_str(APP_SECURITY).unwrap();
    let pipeline = build_with_defaults(&config).unwrap();
    let providers = &pipeline.user_providers;

    assert_eq!(providers.len(), 3);
    assert_eq!(providers.default_id(), Some("security.user.provider.concrete.in_memory"));
    assert_eq!(
        providers.get("legacy").unwrap().service_id(),
        "app.legacy_user_provider"
    );
    assert_eq!(
        providers.get("all_users").unwrap().kind,
        UserProviderKind::Chain {
            providers: vec![
                "security.user.provider.concrete.in_memory".to_string(),
                "security.user.provider.concrete.legacy".to_string(),
            ]
        }
    );

    let UserProviderKind::Factory { key, arguments } = &providers.get("in_memory").unwrap().kind else {
        panic!("in_memory should be built by a factory");
    };
    assert_eq!(key, "memory");
    assert_eq!(arguments["users"][1]["username"], "user");
    assert_eq!(arguments["users"][1]["roles"][0], "ROLE_USER");
}

#[test]
fn test_yaml_global_parameters() {
    let config = SecurityConfig::from_yaml_str(APP_SECURITY).unwrap();
    let pipeline = build_with_defaults(&config).unwrap();
    let parameters = &pipeline.parameters;

    assert_eq!(parameters.role_voter, RoleVoter::Hierarchy);
    assert_eq!(parameters.role_hierarchy["ROLE_ADMIN"], vec!["ROLE_USER"]);
    assert_eq!(
        parameters.role_hierarchy["ROLE_SUPER_ADMIN"],
        vec!["ROLE_ADMIN", "ROLE_ALLOWED_TO_SWITCH"]
    );
    assert_eq!(parameters.session_fixation_strategy, SessionFixationStrategy::Invalidate);
    assert_eq!(parameters.access_decision_manager.strategy, DecisionStrategy::Unanimous);
    assert!(parameters.access_decision_manager.allow_if_equal_granted_denied);
    assert!(parameters.erase_credentials);
    assert!(parameters.hide_user_not_found);
}

#[test]
fn test_yaml_logout() {
    let config = SecurityConfig::from_yaml_str(APP_SECURITY).unwrap();
    let pipeline = build_with_defaults(&config).unwrap();

    let main = pipeline.routing_table.get("main").unwrap();
    let logout = main.logout.as_ref().unwrap();
    assert_eq!(logout.path, "/sign-out");
    assert_eq!(logout.handlers.len(), 2);
    assert_eq!(logout.handlers[0], LogoutHandler::Session);
    assert_eq!(main.listeners[2], "security.logout_listener.main");

    assert_eq!(pipeline.logout_urls.len(), 1);
    let url = pipeline.logout_urls.get("main").unwrap();
    assert_eq!(url.path, "/sign-out");
    assert_eq!(url.csrf_token_id, "logout");
    assert_eq!(url.context, None);
}

#[test]
fn test_yaml_access_control() {
    let config = SecurityConfig::from_yaml_str(APP_SECURITY).unwrap();
    let pipeline = build_with_defaults(&config).unwrap();
    let access_map = &pipeline.access_map;

    assert_eq!(access_map.len(), 3);
    assert_eq!(access_map.entries()[1].requires_channel.as_deref(), Some("https"));
    assert_eq!(access_map.expressions().len(), 1);

    // `^/api` is shared by the api firewall and the second rule.
    let api_matcher = pipeline.routing_table.get("api").unwrap().matcher.clone();
    assert_eq!(api_matcher.as_deref(), Some(access_map.entries()[1].matcher.as_str()));
}

#[test]
fn test_json_document_builds() {
    let config = SecurityConfig::from_json_str(
        r#"{
            "providers": {"users": {"id": "app.users"}},
            "firewalls": {
                "main": {"http_basic": {"realm": "Intranet"}, "stateless": true}
            },
            "erase_credentials": false
        }"#,
    )
    .unwrap();
    let pipeline = build_with_defaults(&config).unwrap();

    assert!(!pipeline.parameters.erase_credentials);
    assert!(pipeline.parameters.hide_user_not_found);
    let main = pipeline.routing_table.get("main").unwrap();
    assert_eq!(main.plugin("http_basic").unwrap().options["realm"], "Intranet");
}

// =============================================================================
// Declared Plugins
// =============================================================================

#[test]
fn test_declared_plugins_from_yaml() {
    let x509: DeclaredPlugin = serde_yaml::from_str(
        r#"
key: x509
position: pre_auth
listener: "security.authentication.listener.x509.{firewall}"
provider: "security.authentication.provider.pre_authenticated.{firewall}"
required: [user]
"#,
    )
    .unwrap();
    let registry = PluginRegistry::with_defaults().with_plugin(x509).unwrap();

    let config = SecurityConfig::from_yaml_str(
        r#"
providers:
  users: { id: app.users }
firewalls:
  main:
    x509: { user: SSL_CLIENT_S_DN_Email }
    form_login: ~
"#,
    )
    .unwrap();
    let pipeline = build(registry, &config).unwrap();
    let main = pipeline.routing_table.get("main").unwrap();

    assert_eq!(main.listeners[2], "security.authentication.listener.x509.main");
    assert_eq!(
        pipeline.authentication_providers,
        vec![
            "security.authentication.provider.pre_authenticated.main",
            "security.authentication.provider.dao.main",
        ]
    );
}

#[test]
fn test_declared_plugin_missing_required_option() {
    let plugin = DeclaredPlugin::new("x509", "pre_auth", "x509.{firewall}")
        .unwrap()
        .provider("x509.provider.{firewall}")
        .required("user");
    let registry = PluginRegistry::with_defaults().with_plugin(plugin).unwrap();

    let config = SecurityConfig::from_yaml_str(
        r#"
providers:
  users: { id: app.users }
firewalls:
  main:
    x509: ~
"#,
    )
    .unwrap();
    let err = build(registry, &config).unwrap_err();

    assert_eq!(err.firewall(), Some("main"));
    assert!(err.to_string().contains("option 'user' is required"));
}

#[test]
fn test_declared_plugin_unknown_position() {
    let parsed: Result<DeclaredPlugin, _> = serde_yaml::from_str(
        "{key: request_matcher, position: match_request, listener: l}",
    );
    assert!(parsed.is_err());
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_malformed_document() {
    let err = SecurityConfig::from_yaml_str("firewalls: [main]").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidConfiguration { .. }));
}

#[test]
fn test_invalid_allow_if_aborts_build() {
    let config = SecurityConfig::from_yaml_str(
        r#"
providers:
  users: { id: app.users }
access_control:
  - { path: ^/, allow_if: "has_role('ROLE_USER') and" }
firewalls:
  main:
    http_basic: ~
"#,
    )
    .unwrap();
    let err = build_with_defaults(&config).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidExpression { .. }));
}

#[test]
fn test_provider_without_backing_aborts_build() {
    let config = SecurityConfig::from_yaml_str(
        r#"
providers:
  broken: {}
firewalls:
  main:
    http_basic: ~
"#,
    )
    .unwrap();
    let err = build_with_defaults(&config).unwrap_err();
    assert_eq!(
        err,
        ConfigError::InvalidProviderDefinition {
            provider: "broken".to_string()
        }
    );
}
