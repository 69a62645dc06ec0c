//! Nonce and state generation for the OAuth implicit flow
//!
//! The id-token request carries a random nonce; only its SHA-512 hash is kept
//! in session storage across the redirect. When the id-token comes back the
//! nonce claim is hashed again and compared with the stored value.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use rand::Rng;
use sha2::{Digest, Sha512};

const NONCE_BYTES: usize = 20;
const STATE_BYTES: usize = 32;

/// Generate a random nonce for an id-token request
///
/// Returns the standard base64 encoding of 20 random bytes.
#[must_use]
pub fn generate_nonce() -> String {
    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..NONCE_BYTES).map(|_| rng.gen()).collect();
    STANDARD.encode(random_bytes)
}

/// Generate a random `state` value for a silent token request
///
/// Returns a URL-safe base64-encoded random string of 32 bytes (43 characters).
#[must_use]
pub fn generate_state() -> String {
    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..STATE_BYTES).map(|_| rng.gen()).collect();
    URL_SAFE_NO_PAD.encode(random_bytes)
}

/// Generate an 18 character token id (`jti`) for locally minted tokens
#[must_use]
pub fn generate_token_id() -> String {
    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..NONCE_BYTES).map(|_| rng.gen()).collect();
    let mut id = URL_SAFE_NO_PAD.encode(random_bytes);
    id.truncate(18);
    id
}

/// Hash a nonce for storage: `base64(SHA-512(utf8(nonce)))`
#[must_use]
pub fn hash_nonce(nonce: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(nonce.as_bytes());
    STANDARD.encode(hasher.finalize())
}

/// Check a nonce claim against a previously stored hash
#[must_use]
pub fn nonce_matches(nonce: &str, stored_hash: &str) -> bool {
    hash_nonce(nonce) == stored_hash
}

/// Validate that the state token matches
///
/// # Arguments
/// * `expected` - The state that was sent in the authorization request
/// * `actual` - The state received in the response fragment
pub fn validate_state(expected: &str, actual: &str) -> bool {
    expected == actual
}
