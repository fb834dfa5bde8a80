use async_trait::async_trait;
use url::Url;

use crate::oauth2::errors::OAuth2Error;
use crate::oauth2::main::{OAuth2Provider, get_client};
use crate::oauth2::types::{AccessToken, RegistrationSuggestions, ResourceOwner};

use super::{TokenResponse, env_credential};

const DISCORD_AUTH_URL: &str = "https://discord.com/api/oauth2/authorize";
const DISCORD_TOKEN_URL: &str = "https://discord.com/api/oauth2/token";
const DISCORD_USER_URL: &str = "https://discord.com/api/users/@me";
const DISCORD_CDN_URL: &str = "https://cdn.discordapp.com";

/// Login with a Discord account.
pub struct DiscordProvider {
    client_id: String,
    client_secret: String,
    scopes: String,
}

impl DiscordProvider {
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

    /// Build from `OAUTH2_DISCORD_CLIENT_ID` / `OAUTH2_DISCORD_CLIENT_SECRET`.
    pub fn from_env() -> Result<Self, OAuth2Error> {
        Ok(Self::new(
            env_credential("OAUTH2_DISCORD_CLIENT_ID")?,
            env_credential("OAUTH2_DISCORD_CLIENT_SECRET")?,
            "identify email",
        ))
    }
}

#[async_trait]
impl OAuth2Provider for DiscordProvider {
    fn name(&self) -> &'static str {
        "discord"
    }

    fn authorization_url(&self, redirect_uri: &str, state: &str) -> Result<String, OAuth2Error> {
        let mut url = Url::parse(DISCORD_AUTH_URL)
            .map_err(|e| OAuth2Error::Configuration(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
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
            .post(DISCORD_TOKEN_URL)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "authorization_code"),
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

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| OAuth2Error::TokenExchange(e.to_string()))?;

        Ok(token.into())
    }

    async fn fetch_resource_owner(
        &self,
        token: &AccessToken,
    ) -> Result<ResourceOwner, OAuth2Error> {
        let client = get_client();
        let response = client
            .get(DISCORD_USER_URL)
            .bearer_auth(&token.access_token)
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
        let avatar_url = match (
            resource_owner.id_field("id"),
            resource_owner.str_field("avatar"),
        ) {
            (Some(id), Some(avatar)) => {
                Some(format!("{DISCORD_CDN_URL}/avatars/{id}/{avatar}.png"))
            }
            _ => None,
        };

        RegistrationSuggestions {
            email: resource_owner.str_field("email").map(str::to_string),
            email_verified: resource_owner.bool_field("verified").unwrap_or(false),
            username: resource_owner.str_field("username").map(str::to_string),
            avatar_url,
        }
    }
}
