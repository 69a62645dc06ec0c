//! OAuth 2.0 implicit-flow protocol helpers
//!
//! Pure codecs used by the token manager:
//!
//! - **[`nonce`]**: nonce/state generation and the SHA-512 nonce hash
//! - **[`jwt`]**: JWT payload decoding and unsigned token construction
//! - **[`params`]**: authorization URL building and fragment parsing
//!
//! Nothing here performs I/O or keeps state.

pub mod jwt;
pub mod nonce;
pub mod params;

// Re-export commonly used functions
pub use jwt::{decode_claims, decode_payload, string_claim, unsigned_token};
pub use nonce::{
    generate_nonce, generate_state, generate_token_id, hash_nonce, nonce_matches, validate_state,
};
pub use params::{
    authorization_url, fragment_of, parse_params, parse_response_fragment, require_param,
};
