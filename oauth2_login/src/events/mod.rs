//! Login and linking notification events.
//!
//! Events are dispatched synchronously, fire-and-forget; no return value is
//! consumed. Host applications implement [`EventDispatcher`] to feed their own
//! event bus; [`TracingDispatcher`] just logs.

use crate::oauth2::{AccessToken, Actor, ResourceOwner};

/// Dispatched after the callback leg completes, before the login response is
/// returned to the user agent.
///
/// For a normal login the actor is still the guest identity: the event fires
/// before the host application finishes its own login flow. When a logged-in
/// user links an account, the actor is that user.
#[derive(Debug, Clone)]
pub struct OAuthLoginSuccessful {
    /// The access token provided by the service.
    pub token: AccessToken,
    /// The complete resource-owner profile.
    pub resource_owner: ResourceOwner,
    /// The provider name, as stored in the `provider` column.
    pub provider: String,
    /// The provider's unique identifier, as stored in the `identifier` column.
    pub identifier: String,
    /// The pre-link actor identity.
    pub actor: Actor,
}

/// Dispatched just before a provider identity is linked to a local account.
#[derive(Debug, Clone)]
pub struct LinkingToProvider {
    pub provider: String,
    pub identifier: String,
    /// The local user account being linked.
    pub user_id: i64,
}

#[derive(Debug, Clone)]
pub enum AuthEvent {
    LoginSuccessful(OAuthLoginSuccessful),
    LinkingToProvider(LinkingToProvider),
}

pub trait EventDispatcher: Send + Sync {
    fn dispatch(&self, event: AuthEvent);
}

/// Default dispatcher that records events in the log.
pub struct TracingDispatcher;

impl EventDispatcher for TracingDispatcher {
    fn dispatch(&self, event: AuthEvent) {
        match event {
            AuthEvent::LoginSuccessful(e) => {
                tracing::info!(
                    provider = %e.provider,
                    identifier = %e.identifier,
                    "OAuth login successful"
                );
            }
            AuthEvent::LinkingToProvider(e) => {
                tracing::info!(
                    provider = %e.provider,
                    identifier = %e.identifier,
                    user_id = e.user_id,
                    "Linking provider identity to user"
                );
            }
        }
    }
}
