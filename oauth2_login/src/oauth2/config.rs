//! Flow constants

/// How long transient flow entries (state nonce, link target, stashed
/// credentials) live in the cache, in seconds.
pub(crate) const OAUTH_DATA_CACHE_TTL: u64 = 60 * 5; // 5 minutes

/// Cache namespace for flow entries.
pub(crate) const OAUTH2_CACHE_PREFIX: &str = "oauth2";

/// Display hint appended to the authorization URL.
pub(crate) const OAUTH2_DISPLAY_TYPE: &str = "popup";
