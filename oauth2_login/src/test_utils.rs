//! Shared test initialization.
//!
//! Loads `.env_test` once per process, wipes any leftover SQLite test
//! database file, and makes sure the stores are initialized. Tables are also
//! created at the point of use, so store initialization here only needs to
//! happen once and failures are non-fatal.

use std::sync::Once;

/// Centralized test setup, call at the top of every test that touches the
/// cache or data store.
pub(crate) async fn init_test_environment() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        if dotenvy::from_filename(".env_test").is_err() {
            dotenvy::dotenv().ok();
        }

        // A stale database file would leak state between test runs.
        if let Some(db_path) = std::env::var("O2L_DATA_STORE_URL")
            .ok()
            .as_deref()
            .and_then(sqlite_file_path)
        {
            let _ = std::fs::remove_file(&db_path);
        }
    });

    if let Err(e) = crate::storage::init().await {
        eprintln!("Warning: failed to initialize storage: {e}");
    }
    if let Err(e) = crate::oauth2::LinkStore::init().await {
        eprintln!("Warning: failed to initialize LinkStore: {e}");
    }
}

/// File path of a SQLite database URL, when it points at a file on disk.
fn sqlite_file_path(url: &str) -> Option<String> {
    let path = url.strip_prefix("sqlite:")?;
    if path.contains(":memory:") {
        return None;
    }
    Some(path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_file_path_parsing() {
        assert_eq!(
            sqlite_file_path("sqlite:/tmp/o2l_test.db"),
            Some("/tmp/o2l_test.db".to_string())
        );
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path("postgres://localhost/db"), None);
    }
}
