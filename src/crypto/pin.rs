//! PIN digest and comparison.
//!
//! A PIN is stored as the standard base64 encoding of the SHA-256 digest of
//! its UTF-8 bytes. The digest is unsalted so that stores written by earlier
//! versions of the journal keep verifying; a four-digit PIN has only 10,000
//! values, so the digest protects against casual inspection only.

use crate::errors::{AppResult, CredentialError};
use base64::{engine::general_purpose::STANDARD, Engine};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Hashes a PIN for storage.
///
/// # Examples
///
/// ```
/// use daybook::crypto::hash_pin;
///
/// assert_eq!(hash_pin("1234"), "A6xnQhbz4Vx2HuGl4lXwZ5U2I8iziLRFnhP5eNfIRvQ=");
/// ```
pub fn hash_pin(pin: &str) -> String {
    STANDARD.encode(pin_digest(pin).as_slice())
}

fn pin_digest(pin: &str) -> Zeroizing<Vec<u8>> {
    let mut hasher = Sha256::new();
    hasher.update(pin.as_bytes());
    Zeroizing::new(hasher.finalize().to_vec())
}

/// Compares two digests without short-circuiting on the first differing
/// byte.
pub fn digests_match(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Checks that `pin` is exactly `length` ASCII digits.
///
/// # Errors
///
/// Returns `CredentialError::InvalidPin` otherwise.
pub fn validate_pin_format(pin: &str, length: usize) -> AppResult<()> {
    if pin.len() == length && pin.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(CredentialError::InvalidPin {
            expected_length: length,
        }
        .into())
    }
}

/// Verifies a candidate PIN against a stored base64 digest.
///
/// A stored value that is not valid base64 never matches.
pub fn verify_pin(pin: &str, stored_hash: &str) -> bool {
    let stored = match STANDARD.decode(stored_hash) {
        Ok(bytes) => Zeroizing::new(bytes),
        Err(_) => return false,
    };
    digests_match(&pin_digest(pin), &stored)
}
