// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential encryption at rest.
//!
//! AES-256-GCM with a fresh random 96-bit nonce per value, so identical
//! plaintexts produce distinct ciphertexts across records. The key is derived
//! from the configured application secret (SHA-256). Wire format:
//! base64(nonce || ciphertext || tag).

use crate::error::AppError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Symmetric cipher for credential fields.
#[derive(Clone)]
pub struct CredentialCipher {
    key: Arc<LessSafeKey>,
    rng: SystemRandom,
}

impl CredentialCipher {
    /// Build a cipher from raw secret material of any length.
    pub fn new(secret: &[u8]) -> Self {
        let key_bytes = Sha256::digest(secret);
        let unbound = UnboundKey::new(&AES_256_GCM, &key_bytes)
            .expect("SHA-256 digest is a valid AES-256 key");
        Self {
            key: Arc::new(LessSafeKey::new(unbound)),
            rng: SystemRandom::new(),
        }
    }

    /// Encrypt a single credential field.
    ///
    /// Empty values pass through unchanged; there is nothing to protect and
    /// the store treats the empty string as "not set".
    pub fn encrypt(&self, plaintext: &str) -> Result<String, AppError> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }

        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Nonce generation failed")))?;
        let nonce = Nonce::assume_unique_for_key(nonce_bytes);

        let mut buf = plaintext.as_bytes().to_vec();
        self.key
            .seal_in_place_append_tag(nonce, Aad::empty(), &mut buf)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Encryption failed")))?;

        let mut out = Vec::with_capacity(NONCE_LEN + buf.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&buf);
        Ok(BASE64.encode(out))
    }

    /// Decrypt a single credential field.
    ///
    /// Any malformed, truncated, or tampered input yields `None` for that
    /// field; one unreadable field never fails the whole record.
    pub fn decrypt(&self, ciphertext_b64: &str) -> Option<String> {
        if ciphertext_b64.is_empty() {
            return None;
        }

        let bytes = BASE64.decode(ciphertext_b64).ok()?;
        if bytes.len() <= NONCE_LEN + AES_256_GCM.tag_len() {
            return None;
        }

        let nonce = Nonce::try_assume_unique_for_key(&bytes[..NONCE_LEN]).ok()?;
        let mut buf = bytes[NONCE_LEN..].to_vec();
        let plaintext = self.key.open_in_place(nonce, Aad::empty(), &mut buf).ok()?;

        String::from_utf8(plaintext.to_vec()).ok()
    }
}

/// Generate a random 32-character hex document ID.
pub fn random_hex_id() -> String {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; 16];
    // SystemRandom only fails when the OS entropy source is unavailable.
    rng.fill(&mut bytes).expect("system RNG unavailable");
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let cipher = CredentialCipher::new(b"test_secret");
        let ciphertext = cipher.encrypt("my-access-token").unwrap();

        assert_ne!(ciphertext, "my-access-token");
        assert_eq!(cipher.decrypt(&ciphertext), Some("my-access-token".to_string()));
    }

    #[test]
    fn test_identical_plaintexts_encrypt_differently() {
        let cipher = CredentialCipher::new(b"test_secret");
        let a = cipher.encrypt("same-token").unwrap();
        let b = cipher.encrypt("same-token").unwrap();
        assert_ne!(a, b);
        assert_eq!(cipher.decrypt(&a), cipher.decrypt(&b));
    }

    #[test]
    fn test_corrupted_ciphertext_returns_none() {
        let cipher = CredentialCipher::new(b"test_secret");
        let mut ciphertext = cipher.encrypt("my-access-token").unwrap();

        // Flip a character in the body
        let replacement = if ciphertext.ends_with('A') { "B" } else { "A" };
        ciphertext.replace_range(ciphertext.len() - 1.., replacement);

        assert_eq!(cipher.decrypt(&ciphertext), None);
    }

    #[test]
    fn test_garbage_input_returns_none() {
        let cipher = CredentialCipher::new(b"test_secret");
        assert_eq!(cipher.decrypt("not base64 at all!!"), None);
        assert_eq!(cipher.decrypt("aGVsbG8="), None); // too short
        assert_eq!(cipher.decrypt(""), None);
    }

    #[test]
    fn test_wrong_key_returns_none() {
        let cipher = CredentialCipher::new(b"test_secret");
        let other = CredentialCipher::new(b"other_secret");
        let ciphertext = cipher.encrypt("my-access-token").unwrap();
        assert_eq!(other.decrypt(&ciphertext), None);
    }

    #[test]
    fn test_empty_passthrough() {
        let cipher = CredentialCipher::new(b"test_secret");
        assert_eq!(cipher.encrypt("").unwrap(), "");
    }

    #[test]
    fn test_random_hex_id_format() {
        let id = random_hex_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, random_hex_id());
    }
}
