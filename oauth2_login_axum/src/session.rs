use async_trait::async_trait;
use axum::http::HeaderValue;
use std::{env, sync::LazyLock};

use oauth2_login::{Actor, gen_random_string};

/// Name of the cookie carrying the anonymous flow session id.
pub static O2L_SESSION_COOKIE_NAME: LazyLock<String> =
    LazyLock::new(|| env::var("O2L_SESSION_COOKIE_NAME").unwrap_or_else(|_| "o2l_session".to_string()));

/// Resolves the acting user for a flow request from the incoming cookies.
///
/// The flow itself is host-agnostic; the host application knows how its own
/// login session maps onto an [`Actor`]. Implement this to let logged-in
/// users link accounts.
#[async_trait]
pub trait ActorResolver: Send + Sync {
    async fn resolve(&self, cookies: Option<&headers::Cookie>) -> Actor;
}

/// Treats every request as anonymous. Login works, linking does not.
pub struct GuestResolver;

#[async_trait]
impl ActorResolver for GuestResolver {
    async fn resolve(&self, _cookies: Option<&headers::Cookie>) -> Actor {
        Actor::Guest
    }
}

/// Session id from the flow cookie, or a fresh one plus the `Set-Cookie`
/// value that pins it to the user agent.
pub(super) fn session_id_from(
    cookies: Option<&headers::Cookie>,
) -> Result<(String, Option<HeaderValue>), String> {
    if let Some(id) = cookies.and_then(|c| c.get(O2L_SESSION_COOKIE_NAME.as_str())) {
        return Ok((id.to_string(), None));
    }

    let id = gen_random_string(32).map_err(|e| e.to_string())?;
    let cookie = format!(
        "{}={id}; Path=/; HttpOnly; SameSite=Lax",
        O2L_SESSION_COOKIE_NAME.as_str()
    );
    let header = HeaderValue::from_str(&cookie).map_err(|e| e.to_string())?;

    Ok((id, Some(header)))
}
