//! Session token generation and hashing.
//!
//! Session tokens are opaque 256-bit random values handed to the browser
//! once; only their SHA-256 hash is persisted in the `sessions` table.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Computes SHA-256 of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generates a random session token: 32 bytes of OS randomness,
/// URL-safe base64 encoded (43 characters, no padding).
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_known_vector() {
        assert_eq!(
            sha256_hex("test"),
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn test_sha256_hex_deterministic() {
        assert_eq!(sha256_hex("same_input"), sha256_hex("same_input"));
        assert_ne!(sha256_hex("a"), sha256_hex("b"));
    }

    #[test]
    fn test_generate_session_token_length() {
        let token = generate_session_token();
        assert_eq!(token.len(), 43);
        assert!(!token.contains('='));
    }

    #[test]
    fn test_generate_session_token_unique() {
        let tokens: std::collections::HashSet<_> =
            (0..100).map(|_| generate_session_token()).collect();
        assert_eq!(tokens.len(), 100);
    }
}
