//! oauth2-login - OAuth2 third-party login and account linking
//!
//! This crate provides the authorization-code login/link flow: the redirect
//! leg with a session-bound CSRF state nonce, the callback leg with code
//! exchange and resource-owner fetch, and the branching into "link to an
//! existing account" vs. "log in or register" outcomes. Provider specifics
//! (GitHub, Discord, ...) are pluggable strategies; the host application
//! supplies the registration response factory and event handling.

mod config;
mod events;
mod oauth2;
mod storage;
mod utils;

#[cfg(test)]
mod test_utils;

pub use config::{O2L_ORIGIN, O2L_ROUTE_PREFIX};

pub use events::{
    AuthEvent, EventDispatcher, LinkingToProvider, OAuthLoginSuccessful, TracingDispatcher,
};

pub use oauth2::{
    AccessToken, Actor, AfterSuccessInterceptor, CallbackQuery, FlowRequest, FlowResponse,
    LINK_COMPLETE_HTML, LoginProviderLink, OAuth2Error, OAuth2Provider, OAuthFlow, OAuthSession,
    RegistrationSuggestions, ResourceOwner, ResponseFactory,
};

pub use oauth2::providers::{DiscordProvider, GithubProvider};

pub use utils::gen_random_string;

/// Initialize the storage layer and database tables.
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    oauth2::init().await?;
    Ok(())
}
