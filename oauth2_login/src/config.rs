//! Central configuration for the oauth2_login crate

use std::sync::LazyLock;

/// Route prefix under which the per-provider login endpoints are mounted.
///
/// Default: "/auth"
pub static O2L_ROUTE_PREFIX: LazyLock<String> =
    LazyLock::new(|| std::env::var("O2L_ROUTE_PREFIX").unwrap_or_else(|_| "/auth".to_string()));

/// Public origin of the host application, used to build provider redirect URIs.
///
/// Default: "http://localhost:3000"
pub static O2L_ORIGIN: LazyLock<String> = LazyLock::new(|| {
    std::env::var("O2L_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string())
});
