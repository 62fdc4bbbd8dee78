//! Built-in firewall plugins.
//!
//! | key | position |
//! |---|---|
//! | `form_login` | `form` |
//! | `http_basic` | `http` |
//! | `remember_me` | `remember_me` |
//! | `anonymous` | `anon` |
//! | `stateful` | `post_authentication` |
//! | `switch_user` | `pre_authorization` |
//! | `access_control` | `default_rbac` |
//!
//! [`DeclaredPlugin`] describes a plugin with data instead of code.

mod access_control;
mod anonymous;
mod declared;
mod form_login;
mod http_basic;
mod remember_me;
mod stateful;
mod switch_user;

pub use access_control::{AccessControlPlugin, ACCESS_LISTENER};
pub use anonymous::AnonymousAuthenticationPlugin;
pub use declared::DeclaredPlugin;
pub use form_login::FormLoginPlugin;
pub use http_basic::HttpBasicPlugin;
pub use remember_me::RememberMePlugin;
pub use stateful::StatefulPlugin;
pub use switch_user::SwitchUserPlugin;

/// Id of the DAO authentication provider shared by form login and HTTP basic.
pub(crate) fn dao_provider_id(firewall: &str) -> String {
    format!("security.authentication.provider.dao.{}", firewall)
}
