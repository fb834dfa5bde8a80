//! Built-in provider implementations.
//!
//! Each provider is a thin [`OAuth2Provider`](crate::OAuth2Provider) over the
//! service's authorization, token and profile endpoints. Host applications
//! with other providers implement the trait themselves.

mod discord;
mod github;

pub use discord::DiscordProvider;
pub use github::GithubProvider;

use serde::Deserialize;

use crate::oauth2::types::AccessToken;

/// Token endpoint response shared by the built-in providers.
#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    access_token: String,
    token_type: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
    scope: Option<String>,
}

impl From<TokenResponse> for AccessToken {
    fn from(response: TokenResponse) -> Self {
        Self {
            access_token: response.access_token,
            token_type: response.token_type,
            refresh_token: response.refresh_token,
            expires_in: response.expires_in,
            scope: response.scope,
        }
    }
}

/// Read a client credential from the environment or fail with a
/// configuration error naming the variable.
pub(super) fn env_credential(name: &str) -> Result<String, crate::oauth2::errors::OAuth2Error> {
    std::env::var(name).map_err(|_| {
        crate::oauth2::errors::OAuth2Error::Configuration(format!("{name} must be set"))
    })
}
