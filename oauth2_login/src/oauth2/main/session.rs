use crate::oauth2::config::{OAUTH2_CACHE_PREFIX, OAUTH_DATA_CACHE_TTL};
use crate::oauth2::errors::OAuth2Error;
use crate::oauth2::types::{AccessToken, ResourceOwner, StoredOAuthData};
use crate::storage::{CacheData, GENERIC_CACHE_STORE};

/// Cache key for the OAuth2 CSRF state nonce.
pub(crate) const SESSION_OAUTH2_STATE: &str = "oauth2state";

/// Cache key for the provider name.
pub(crate) const SESSION_OAUTH2_PROVIDER: &str = "oauth2provider";

/// Cache key for the link target user id.
pub(crate) const SESSION_LINK_TO: &str = "linkTo";

/// Cache key for stashed token/resource-owner credentials.
pub(crate) const SESSION_OAUTH_DATA: &str = "oauth_data";

/// Cache key for the fast-track flag.
pub(crate) const SESSION_FAST_TRACK: &str = "fastTrack";

/// Per-session view of the shared cache store.
///
/// Entries are keyed `"{key}_{session_id}"` so that flow state survives the
/// provider round trip even when the host's own session store is volatile
/// across the redirect. Transient entries carry a 5-minute TTL; the provider
/// name is kept indefinitely.
pub struct OAuthSession {
    session_id: String,
}

impl OAuthSession {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }

    fn build_key(&self, key: &str) -> String {
        format!("{}_{}", key, self.session_id)
    }

    pub(crate) async fn put(&self, key: &str, value: &str) -> Result<(), OAuth2Error> {
        let cache_key = self.build_key(key);
        GENERIC_CACHE_STORE
            .lock()
            .await
            .put_with_ttl(
                OAUTH2_CACHE_PREFIX,
                &cache_key,
                CacheData {
                    value: value.to_string(),
                },
                OAUTH_DATA_CACHE_TTL as usize,
            )
            .await?;
        Ok(())
    }

    pub(crate) async fn put_forever(&self, key: &str, value: &str) -> Result<(), OAuth2Error> {
        let cache_key = self.build_key(key);
        GENERIC_CACHE_STORE
            .lock()
            .await
            .put(
                OAUTH2_CACHE_PREFIX,
                &cache_key,
                CacheData {
                    value: value.to_string(),
                },
            )
            .await?;
        Ok(())
    }

    pub(crate) async fn get(&self, key: &str) -> Result<Option<String>, OAuth2Error> {
        let cache_key = self.build_key(key);
        let data = GENERIC_CACHE_STORE
            .lock()
            .await
            .get(OAUTH2_CACHE_PREFIX, &cache_key)
            .await?;
        Ok(data.map(|d| d.value))
    }

    /// Get and remove in one step; a concurrent duplicate consumer sees None.
    pub(crate) async fn take(&self, key: &str) -> Result<Option<String>, OAuth2Error> {
        let cache_key = self.build_key(key);
        let data = GENERIC_CACHE_STORE
            .lock()
            .await
            .take(OAUTH2_CACHE_PREFIX, &cache_key)
            .await?;
        Ok(data.map(|d| d.value))
    }

    pub(crate) async fn forget(&self, key: &str) -> Result<(), OAuth2Error> {
        let cache_key = self.build_key(key);
        GENERIC_CACHE_STORE
            .lock()
            .await
            .remove(OAUTH2_CACHE_PREFIX, &cache_key)
            .await?;
        Ok(())
    }

    pub(crate) async fn has(&self, key: &str) -> Result<bool, OAuth2Error> {
        Ok(self.get(key).await?.is_some())
    }

    /// Stash validated credentials so a later request on this session can
    /// resume the flow without repeating the provider round trip.
    ///
    /// Call this only with a token/profile pair obtained through a fully
    /// validated callback leg, e.g. before diverting the user into a second
    /// authentication factor. The pair expires after five minutes and is
    /// consumed on first use.
    pub async fn enable_fast_track(
        &self,
        token: &AccessToken,
        resource_owner: &ResourceOwner,
    ) -> Result<(), OAuth2Error> {
        let data = StoredOAuthData {
            token: token.clone(),
            resource_owner: resource_owner.clone(),
        };
        let encoded = CacheData::from(data).value;
        self.put(SESSION_OAUTH_DATA, &encoded).await?;
        self.put(SESSION_FAST_TRACK, "true").await?;
        Ok(())
    }

    pub(crate) async fn fast_track_enabled(&self) -> Result<bool, OAuth2Error> {
        Ok(self.get(SESSION_FAST_TRACK).await?.as_deref() == Some("true"))
    }

    /// Stashed credentials, if present and well-formed.
    pub(crate) async fn fast_track_data(&self) -> Result<Option<StoredOAuthData>, OAuth2Error> {
        let Some(raw) = self.get(SESSION_OAUTH_DATA).await? else {
            return Ok(None);
        };
        // Malformed cached data is treated as absent so the caller falls
        // through to the normal flow.
        Ok(StoredOAuthData::try_from(CacheData { value: raw }).ok())
    }

    pub(crate) async fn clear_fast_track(&self) -> Result<(), OAuth2Error> {
        self.forget(SESSION_OAUTH_DATA).await?;
        self.forget(SESSION_FAST_TRACK).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_environment;
    use serde_json::json;
    use serial_test::serial;

    #[test]
    fn test_build_key_namespaces_by_session() {
        let session = OAuthSession::new("abc123");
        assert_eq!(session.build_key(SESSION_OAUTH2_STATE), "oauth2state_abc123");
        assert_eq!(session.build_key(SESSION_LINK_TO), "linkTo_abc123");
    }

    #[tokio::test]
    #[serial]
    async fn test_put_get_forget() {
        init_test_environment().await;
        let session = OAuthSession::new("sess-put-get");

        session.put(SESSION_OAUTH2_STATE, "nonce1").await.unwrap();
        assert_eq!(
            session.get(SESSION_OAUTH2_STATE).await.unwrap(),
            Some("nonce1".to_string())
        );
        assert!(session.has(SESSION_OAUTH2_STATE).await.unwrap());

        session.forget(SESSION_OAUTH2_STATE).await.unwrap();
        assert!(!session.has(SESSION_OAUTH2_STATE).await.unwrap());
    }

    #[tokio::test]
    #[serial]
    async fn test_take_consumes_entry() {
        init_test_environment().await;
        let session = OAuthSession::new("sess-take");

        session.put(SESSION_OAUTH2_STATE, "nonce2").await.unwrap();
        assert_eq!(
            session.take(SESSION_OAUTH2_STATE).await.unwrap(),
            Some("nonce2".to_string())
        );
        assert_eq!(session.take(SESSION_OAUTH2_STATE).await.unwrap(), None);
    }

    #[tokio::test]
    #[serial]
    async fn test_sessions_are_isolated() {
        init_test_environment().await;
        let a = OAuthSession::new("sess-iso-a");
        let b = OAuthSession::new("sess-iso-b");

        a.put(SESSION_LINK_TO, "42").await.unwrap();
        assert_eq!(b.get(SESSION_LINK_TO).await.unwrap(), None);
    }

    #[tokio::test]
    #[serial]
    async fn test_fast_track_stash_and_clear() {
        init_test_environment().await;
        let session = OAuthSession::new("sess-fast-track");

        assert!(!session.fast_track_enabled().await.unwrap());

        let token = AccessToken::bearer("tok");
        let owner = ResourceOwner::new(json!({"id": 1, "login": "octocat"}));
        session.enable_fast_track(&token, &owner).await.unwrap();

        assert!(session.fast_track_enabled().await.unwrap());
        let data = session.fast_track_data().await.unwrap().unwrap();
        assert_eq!(data.token, token);
        assert_eq!(data.resource_owner, owner);

        session.clear_fast_track().await.unwrap();
        assert!(!session.fast_track_enabled().await.unwrap());
        assert!(session.fast_track_data().await.unwrap().is_none());
    }

    #[tokio::test]
    #[serial]
    async fn test_malformed_fast_track_data_reads_as_absent() {
        init_test_environment().await;
        let session = OAuthSession::new("sess-fast-track-bad");

        session.put(SESSION_OAUTH_DATA, "not json").await.unwrap();
        assert!(session.fast_track_data().await.unwrap().is_none());
    }
}
