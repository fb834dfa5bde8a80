use crate::oauth2::errors::OAuth2Error;
use crate::oauth2::types::LoginProviderLink;
use crate::storage::GENERIC_DATA_STORE;

use super::postgres::*;
use super::sqlite::*;

/// Persistence for provider/identifier links to local user accounts.
pub(crate) struct LinkStore;

impl LinkStore {
    /// Initialize the login provider table.
    pub(crate) async fn init() -> Result<(), OAuth2Error> {
        let store = GENERIC_DATA_STORE.lock().await;

        match (store.as_sqlite(), store.as_postgres()) {
            (Some(pool), _) => create_tables_sqlite(pool).await,
            (_, Some(pool)) => create_tables_postgres(pool).await,
            _ => Err(OAuth2Error::Storage(
                "Unsupported database type".to_string(),
            )),
        }
    }

    /// Look up a link by its provider-scoped identity key.
    pub(crate) async fn get_by_identifier(
        provider: &str,
        identifier: &str,
    ) -> Result<Option<LoginProviderLink>, OAuth2Error> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            get_link_by_identifier_sqlite(pool, provider, identifier).await
        } else if let Some(pool) = store.as_postgres() {
            get_link_by_identifier_postgres(pool, provider, identifier).await
        } else {
            Err(OAuth2Error::Storage(
                "Unsupported database type".to_string(),
            ))
        }
    }

    /// All links belonging to a local user account.
    pub(crate) async fn get_for_user(user_id: i64) -> Result<Vec<LoginProviderLink>, OAuth2Error> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            get_links_for_user_sqlite(pool, user_id).await
        } else if let Some(pool) = store.as_postgres() {
            get_links_for_user_postgres(pool, user_id).await
        } else {
            Err(OAuth2Error::Storage(
                "Unsupported database type".to_string(),
            ))
        }
    }

    /// Create the link if absent, otherwise refresh its `updated_at`.
    /// Existing rows never change owner here; the caller enforces the
    /// ownership rules first.
    pub(crate) async fn create_or_touch(
        user_id: i64,
        provider: &str,
        identifier: &str,
    ) -> Result<LoginProviderLink, OAuth2Error> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            upsert_link_sqlite(pool, user_id, provider, identifier).await
        } else if let Some(pool) = store.as_postgres() {
            upsert_link_postgres(pool, user_id, provider, identifier).await
        } else {
            Err(OAuth2Error::Storage(
                "Unsupported database type".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_environment;
    use serial_test::serial;

    #[tokio::test]
    #[serial]
    async fn test_get_by_identifier_unknown_is_none() {
        init_test_environment().await;

        let link = LinkStore::get_by_identifier("storetest", "never-linked")
            .await
            .unwrap();
        assert!(link.is_none());
    }

    #[tokio::test]
    #[serial]
    async fn test_create_or_touch_creates_then_touches() {
        init_test_environment().await;

        let created = LinkStore::create_or_touch(41, "storetest", "identity-touch")
            .await
            .unwrap();
        assert_eq!(created.user_id, 41);
        assert_eq!(created.provider, "storetest");
        assert_eq!(created.identifier, "identity-touch");

        let touched = LinkStore::create_or_touch(41, "storetest", "identity-touch")
            .await
            .unwrap();
        assert_eq!(touched.id, created.id);
        assert_eq!(touched.created_at, created.created_at);
        assert!(touched.updated_at >= created.updated_at);
    }

    #[tokio::test]
    #[serial]
    async fn test_identifier_is_scoped_by_provider() {
        init_test_environment().await;

        LinkStore::create_or_touch(42, "storetest-a", "shared-identity")
            .await
            .unwrap();
        LinkStore::create_or_touch(43, "storetest-b", "shared-identity")
            .await
            .unwrap();

        let a = LinkStore::get_by_identifier("storetest-a", "shared-identity")
            .await
            .unwrap()
            .unwrap();
        let b = LinkStore::get_by_identifier("storetest-b", "shared-identity")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(a.user_id, 42);
        assert_eq!(b.user_id, 43);
    }

    #[tokio::test]
    #[serial]
    async fn test_get_for_user_lists_all_links() {
        init_test_environment().await;

        LinkStore::create_or_touch(44, "storetest-x", "identity-1")
            .await
            .unwrap();
        LinkStore::create_or_touch(44, "storetest-y", "identity-2")
            .await
            .unwrap();

        let links = LinkStore::get_for_user(44).await.unwrap();
        assert_eq!(links.len(), 2);
        assert!(links.iter().all(|l| l.user_id == 44));
    }
}
