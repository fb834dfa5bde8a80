use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use ring::rand::SecureRandom;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum UtilError {
    #[error("Crypto error: {0}")]
    Crypto(String),
}

pub(crate) fn base64url_encode(input: Vec<u8>) -> Result<String, UtilError> {
    Ok(URL_SAFE_NO_PAD.encode(input))
}

/// Generate `len` random bytes from the system CSPRNG, base64url-encoded.
pub fn gen_random_string(len: usize) -> Result<String, UtilError> {
    let rng = ring::rand::SystemRandom::new();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes)
        .map_err(|_| UtilError::Crypto("Failed to generate random string".to_string()))?;
    let encoded = base64url_encode(bytes)
        .map_err(|_| UtilError::Crypto("Failed to encode random string".to_string()))?;
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gen_random_string_length() {
        // 32 bytes of entropy encode to 43 base64url characters (no padding)
        let s = gen_random_string(32).unwrap();
        assert_eq!(s.len(), 43);
    }

    #[test]
    fn test_gen_random_string_unique() {
        let a = gen_random_string(32).unwrap();
        let b = gen_random_string(32).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_base64url_encode_is_url_safe() {
        let encoded = base64url_encode(vec![251, 255, 190, 239]).unwrap();
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert!(!encoded.contains('='));
    }
}
