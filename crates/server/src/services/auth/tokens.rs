//! Opaque bearer tokens and their stored digests.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use super::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// Random bytes per token.
const TOKEN_BYTES: usize = 32;

/// Generate a fresh URL-safe token.
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Keyed digest of a token, the only form that is stored.
///
/// # Errors
///
/// Returns `AuthError::TokenDigest` if the key is rejected by the MAC.
pub fn digest_token(secret: &SecretString, token: &str) -> Result<String, AuthError> {
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|_| AuthError::TokenDigest)?;
    mac.update(token.as_bytes());
    Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn secret() -> SecretString {
        SecretString::from("q8Zr!f3LxT0@vN6yPw2#Km9sBd4$Hj7e")
    }

    #[test]
    fn test_generated_tokens_are_unique_and_url_safe() {
        let a = generate_token();
        let b = generate_token();

        assert_ne!(a, b);
        // 32 bytes -> 43 unpadded base64 characters
        assert_eq!(a.len(), 43);
        assert!(
            a.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_digest_is_deterministic_per_key() {
        let token = generate_token();
        let first = digest_token(&secret(), &token).unwrap();
        let second = digest_token(&secret(), &token).unwrap();
        assert_eq!(first, second);
        assert_ne!(first, token);

        let other_key = SecretString::from("another-key-Zr!f3LxT0@vN6yPw2#Km9s");
        assert_ne!(digest_token(&other_key, &token).unwrap(), first);
    }
}
