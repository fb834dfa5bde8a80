use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use super::errors::OAuth2Error;
use crate::storage::CacheData;

/// Opaque credential returned by the provider's token endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    pub scope: Option<String>,
}

impl AccessToken {
    /// Plain bearer token with no refresh/expiry metadata.
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: Some("bearer".to_string()),
            refresh_token: None,
            expires_in: None,
            scope: None,
        }
    }
}

/// Third-party user profile, as returned by the provider's user endpoint.
///
/// The raw JSON is kept as-is; the provider strategy knows which fields carry
/// the external identifier and registration suggestions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceOwner {
    pub raw: Value,
}

impl ResourceOwner {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.raw.get(name).and_then(Value::as_str)
    }

    pub fn bool_field(&self, name: &str) -> Option<bool> {
        self.raw.get(name).and_then(Value::as_bool)
    }

    /// Field as a string, accepting both JSON strings and numbers. Providers
    /// disagree on whether ids are numeric.
    pub fn id_field(&self, name: &str) -> Option<String> {
        match self.raw.get(name) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Query parameters carried by both legs of the per-provider route.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    #[serde(rename = "linkTo")]
    pub link_to: Option<String>,
}

/// One in-flight request to the flow controller.
#[derive(Debug, Clone)]
pub struct FlowRequest {
    /// Correlates the redirect and callback legs through the cache store.
    pub session_id: String,
    pub query: CallbackQuery,
}

impl FlowRequest {
    pub fn new(session_id: impl Into<String>, query: CallbackQuery) -> Self {
        Self {
            session_id: session_id.into(),
            query,
        }
    }
}

/// Framework-neutral flow outcome; the integration layer turns this into an
/// HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowResponse {
    Redirect(String),
    Html(String),
}

/// The requesting user.
#[derive(Debug, Clone, PartialEq)]
pub enum Actor {
    Guest,
    Member {
        id: i64,
        /// False for accounts that have not completed registration.
        registered: bool,
    },
}

impl Actor {
    pub fn is_guest(&self) -> bool {
        matches!(self, Actor::Guest)
    }
}

/// Registration form pre-fill derived from the resource owner.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RegistrationSuggestions {
    pub email: Option<String>,
    /// Whether the provider vouches for the email; trusted emails may skip
    /// confirmation in the host application.
    pub email_verified: bool,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
}

/// Persistent `(provider, identifier)` → user link record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct LoginProviderLink {
    pub id: String,
    pub user_id: i64,
    pub provider: String,
    pub identifier: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Token/profile pair stashed in the session cache for fast-track resumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredOAuthData {
    pub(crate) token: AccessToken,
    pub(crate) resource_owner: ResourceOwner,
}

impl From<StoredOAuthData> for CacheData {
    fn from(data: StoredOAuthData) -> Self {
        Self {
            value: serde_json::to_string(&data).expect("Failed to serialize StoredOAuthData"),
        }
    }
}

impl TryFrom<CacheData> for StoredOAuthData {
    type Error = OAuth2Error;

    fn try_from(data: CacheData) -> Result<Self, Self::Error> {
        serde_json::from_str(&data.value).map_err(|e| OAuth2Error::Serde(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_owner_id_field_accepts_numbers_and_strings() {
        let numeric = ResourceOwner::new(json!({"id": 583231}));
        assert_eq!(numeric.id_field("id"), Some("583231".to_string()));

        let stringy = ResourceOwner::new(json!({"id": "80351110224678912"}));
        assert_eq!(stringy.id_field("id"), Some("80351110224678912".to_string()));

        let missing = ResourceOwner::new(json!({}));
        assert_eq!(missing.id_field("id"), None);
    }

    #[test]
    fn test_callback_query_deserializes_link_to() {
        let query: CallbackQuery =
            serde_json::from_value(json!({"code": "abc", "state": "s1", "linkTo": "42"})).unwrap();
        assert_eq!(query.code.as_deref(), Some("abc"));
        assert_eq!(query.state.as_deref(), Some("s1"));
        assert_eq!(query.link_to.as_deref(), Some("42"));
    }

    #[test]
    fn test_callback_query_all_params_optional() {
        let query: CallbackQuery = serde_json::from_value(json!({})).unwrap();
        assert!(query.code.is_none());
        assert!(query.state.is_none());
        assert!(query.link_to.is_none());
    }

    #[test]
    fn test_stored_oauth_data_cache_roundtrip() {
        let data = StoredOAuthData {
            token: AccessToken::bearer("tok"),
            resource_owner: ResourceOwner::new(json!({"id": 7, "login": "octocat"})),
        };

        let cached: CacheData = data.clone().into();
        let back = StoredOAuthData::try_from(cached).unwrap();

        assert_eq!(back.token, data.token);
        assert_eq!(back.resource_owner, data.resource_owner);
    }

    #[test]
    fn test_stored_oauth_data_rejects_wrong_shape() {
        let cached = CacheData {
            value: "{\"unexpected\": true}".to_string(),
        };
        assert!(StoredOAuthData::try_from(cached).is_err());
    }

    #[test]
    fn test_actor_is_guest() {
        assert!(Actor::Guest.is_guest());
        assert!(
            !Actor::Member {
                id: 42,
                registered: true
            }
            .is_guest()
        );
    }
}
