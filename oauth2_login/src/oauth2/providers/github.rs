use async_trait::async_trait;
use url::Url;

use crate::oauth2::errors::OAuth2Error;
use crate::oauth2::main::{OAuth2Provider, get_client};
use crate::oauth2::types::{AccessToken, RegistrationSuggestions, ResourceOwner};

use super::{TokenResponse, env_credential};

const GITHUB_AUTH_URL: &str = "https://github.com/login/oauth/authorize";
const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const GITHUB_USER_URL: &str = "https://api.github.com/user";

/// Login with a GitHub account.
pub struct GithubProvider {
    client_id: String,
    client_secret: String,
    scopes: String,
}

impl GithubProvider {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        scopes: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scopes: scopes.into(),
        }
    }

    /// Build from `OAUTH2_GITHUB_CLIENT_ID` / `OAUTH2_GITHUB_CLIENT_SECRET`.
    pub fn from_env() -> Result<Self, OAuth2Error> {
        Ok(Self::new(
            env_credential("OAUTH2_GITHUB_CLIENT_ID")?,
            env_credential("OAUTH2_GITHUB_CLIENT_SECRET")?,
            "user:email",
        ))
    }
}

#[async_trait]
impl OAuth2Provider for GithubProvider {
    fn name(&self) -> &'static str {
        "github"
    }

    fn authorization_url(&self, redirect_uri: &str, state: &str) -> Result<String, OAuth2Error> {
        let mut url = Url::parse(GITHUB_AUTH_URL)
            .map_err(|e| OAuth2Error::Configuration(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("scope", &self.scopes)
            .append_pair("state", state);
        Ok(url.into())
    }

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<AccessToken, OAuth2Error> {
        let client = get_client();
        let response = client
            .post(GITHUB_TOKEN_URL)
            // GitHub answers in form encoding unless JSON is requested.
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await
            .map_err(|e| OAuth2Error::TokenExchange(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OAuth2Error::TokenExchange(status.to_string()));
        }

        let response_body = response
            .text()
            .await
            .map_err(|e| OAuth2Error::TokenExchange(e.to_string()))?;

        tracing::debug!("Token exchange response body: {response_body}");

        // GitHub reports errors with a 200 status and an `error` field, so a
        // deserialization failure here usually means a rejected code.
        let token: TokenResponse = serde_json::from_str(&response_body)
            .map_err(|e| OAuth2Error::TokenExchange(e.to_string()))?;

        Ok(token.into())
    }

    async fn fetch_resource_owner(
        &self,
        token: &AccessToken,
    ) -> Result<ResourceOwner, OAuth2Error> {
        let client = get_client();
        let response = client
            .get(GITHUB_USER_URL)
            .bearer_auth(&token.access_token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            // The GitHub API rejects requests without a user agent.
            .header(reqwest::header::USER_AGENT, "oauth2-login")
            .send()
            .await
            .map_err(|e| OAuth2Error::FetchResourceOwner(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OAuth2Error::FetchResourceOwner(status.to_string()));
        }

        let raw = response
            .json()
            .await
            .map_err(|e| OAuth2Error::FetchResourceOwner(e.to_string()))?;

        Ok(ResourceOwner::new(raw))
    }

    fn identifier(&self, resource_owner: &ResourceOwner) -> Result<String, OAuth2Error> {
        resource_owner
            .id_field("id")
            .ok_or_else(|| OAuth2Error::FetchResourceOwner("Profile has no id".to_string()))
    }

    fn suggestions(
        &self,
        resource_owner: &ResourceOwner,
        _token: &AccessToken,
    ) -> RegistrationSuggestions {
        RegistrationSuggestions {
            email: resource_owner.str_field("email").map(str::to_string),
            // The public profile email is user-supplied, never trusted.
            email_verified: false,
            username: resource_owner.str_field("login").map(str::to_string),
            avatar_url: resource_owner.str_field("avatar_url").map(str::to_string),
        }
    }
}
