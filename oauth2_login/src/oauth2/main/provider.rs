use async_trait::async_trait;
use std::time::Duration;

use crate::oauth2::errors::OAuth2Error;
use crate::oauth2::types::{AccessToken, RegistrationSuggestions, ResourceOwner};

/// Creates a configured HTTP client for OAuth2 operations.
///
/// - `timeout`: 30 seconds, to prevent indefinite hanging of requests.
/// - `pool_idle_timeout` / `pool_max_idle_per_host`: reqwest defaults, which
///   are a good balance for parallel token exchanges.
pub(crate) fn get_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(32)
        .build()
        .expect("Failed to create reqwest client")
}

/// Provider-specific behavior of the login flow.
///
/// One implementation per third-party provider. The flow controller never
/// switches on provider identity; everything provider-shaped goes through
/// this trait.
#[async_trait]
pub trait OAuth2Provider: Send + Sync + 'static {
    /// Provider name, as stored in the `provider` column and used as the
    /// route segment, e.g. "github".
    fn name(&self) -> &'static str;

    /// Full authorization URL for the redirect leg, including configured
    /// scopes and the CSRF state parameter.
    fn authorization_url(&self, redirect_uri: &str, state: &str) -> Result<String, OAuth2Error>;

    /// Exchange the authorization code for an access token at the provider's
    /// token endpoint. Not retried on failure.
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<AccessToken, OAuth2Error>;

    /// Fetch the resource-owner profile with the access token.
    async fn fetch_resource_owner(&self, token: &AccessToken)
    -> Result<ResourceOwner, OAuth2Error>;

    /// Provider-scoped external identity key for the resource owner.
    fn identifier(&self, resource_owner: &ResourceOwner) -> Result<String, OAuth2Error>;

    /// Registration form pre-fill derived from the profile and raw token.
    fn suggestions(
        &self,
        resource_owner: &ResourceOwner,
        token: &AccessToken,
    ) -> RegistrationSuggestions;
}
