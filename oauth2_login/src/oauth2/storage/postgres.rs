use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::oauth2::errors::OAuth2Error;
use crate::oauth2::types::LoginProviderLink;
use crate::storage::DB_TABLE_LOGIN_PROVIDERS;

pub(super) async fn create_tables_postgres(pool: &Pool<Postgres>) -> Result<(), OAuth2Error> {
    let table = DB_TABLE_LOGIN_PROVIDERS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id TEXT PRIMARY KEY NOT NULL,
            user_id BIGINT NOT NULL,
            provider TEXT NOT NULL,
            identifier TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
            UNIQUE(provider, identifier)
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(|e| OAuth2Error::Storage(e.to_string()))?;

    sqlx::query(&format!(
        r#"
        CREATE INDEX IF NOT EXISTS idx_{}_user_id ON {}(user_id)
        "#,
        table.replace(".", "_"),
        table
    ))
    .execute(pool)
    .await
    .map_err(|e| OAuth2Error::Storage(e.to_string()))?;

    Ok(())
}

pub(super) async fn get_link_by_identifier_postgres(
    pool: &Pool<Postgres>,
    provider: &str,
    identifier: &str,
) -> Result<Option<LoginProviderLink>, OAuth2Error> {
    let table = DB_TABLE_LOGIN_PROVIDERS.as_str();

    // Ensure tables exist before any operations
    create_tables_postgres(pool).await?;

    sqlx::query_as::<_, LoginProviderLink>(&format!(
        "SELECT * FROM {table} WHERE provider = $1 AND identifier = $2"
    ))
    .bind(provider)
    .bind(identifier)
    .fetch_optional(pool)
    .await
    .map_err(|e| OAuth2Error::Storage(e.to_string()))
}

pub(super) async fn get_links_for_user_postgres(
    pool: &Pool<Postgres>,
    user_id: i64,
) -> Result<Vec<LoginProviderLink>, OAuth2Error> {
    let table = DB_TABLE_LOGIN_PROVIDERS.as_str();

    create_tables_postgres(pool).await?;

    sqlx::query_as::<_, LoginProviderLink>(&format!(
        "SELECT * FROM {table} WHERE user_id = $1 ORDER BY created_at"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(|e| OAuth2Error::Storage(e.to_string()))
}

pub(super) async fn upsert_link_postgres(
    pool: &Pool<Postgres>,
    user_id: i64,
    provider: &str,
    identifier: &str,
) -> Result<LoginProviderLink, OAuth2Error> {
    let table = DB_TABLE_LOGIN_PROVIDERS.as_str();

    create_tables_postgres(pool).await?;

    let now = Utc::now();
    let id = uuid::Uuid::new_v4().to_string();

    // An existing row keeps its id, user_id and created_at; only updated_at
    // moves forward.
    sqlx::query(&format!(
        r#"
        INSERT INTO {table} (id, user_id, provider, identifier, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (provider, identifier) DO UPDATE SET updated_at = EXCLUDED.updated_at
        "#
    ))
    .bind(&id)
    .bind(user_id)
    .bind(provider)
    .bind(identifier)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| OAuth2Error::Storage(e.to_string()))?;

    get_link_by_identifier_postgres(pool, provider, identifier)
        .await?
        .ok_or_else(|| OAuth2Error::Storage("Upserted link not found".to_string()))
}
