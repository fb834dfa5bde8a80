use thiserror::Error;

use crate::storage::StorageError;
use crate::utils::UtilError;

#[derive(Debug, Error, Clone)]
pub enum OAuth2Error {
    /// Provider credentials or endpoints are missing or malformed.
    #[error("Provider configuration error: {0}")]
    Configuration(String),

    /// CSRF state nonce absent or mismatched on the callback leg.
    #[error("Invalid state")]
    InvalidState,

    #[error("Token exchange error: {0}")]
    TokenExchange(String),

    #[error("Fetch resource owner error: {0}")]
    FetchResourceOwner(String),

    /// Link attempted by an actor that is not a fully registered account.
    #[error("Registration required to link an account")]
    RegistrationRequired,

    /// Session-stored link target does not match the acting user.
    #[error("User data mismatch")]
    AccountMismatch,

    /// The provider identity is already linked to another local account.
    #[error("Account already linked to another user")]
    AlreadyLinked,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serde error: {0}")]
    Serde(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}

impl From<StorageError> for OAuth2Error {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}
