//! JWT payload decoding
//!
//! Tokens are only decoded, never verified: signature checking is left to the
//! services that consume them. The nonce check in the token manager guards
//! against replayed id-tokens.

use base64::alphabet;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use crate::error::{CodecError, CodecResult};

/// base64url decoder that accepts payloads with or without padding
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode the payload segment of `header.payload.signature` into JSON.
///
/// The token is percent-decoded first since it may arrive straight from a URL
/// fragment. Standard-alphabet payloads are accepted as well.
///
/// # Errors
/// Returns a [`CodecError`] when the token has no payload segment or the
/// segment is not base64-encoded JSON.
pub fn decode_payload(token: &str) -> CodecResult<Value> {
    let decoded = urlencoding::decode(token)
        .map_err(|e| CodecError::PercentEncoding(e.to_string()))?;

    let payload = decoded
        .split('.')
        .nth(1)
        .filter(|segment| !segment.is_empty())
        .ok_or(CodecError::MissingPayload(decoded.len()))?;

    let normalized: String = payload
        .chars()
        .map(|c| match c {
            // a raw `+` arrives as a space after form decoding
            '+' | ' ' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    let bytes = PAYLOAD_ENGINE.decode(normalized.as_bytes())?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Decode the payload into a typed claims struct.
///
/// # Errors
/// See [`decode_payload`]; also fails when the claims do not match `T`.
pub fn decode_claims<T: DeserializeOwned>(token: &str) -> CodecResult<T> {
    Ok(serde_json::from_value(decode_payload(token)?)?)
}

/// Read a string claim from a decoded payload.
#[must_use]
pub fn string_claim<'a>(payload: &'a Value, name: &str) -> Option<&'a str> {
    payload.get(name).and_then(Value::as_str).filter(|value| !value.is_empty())
}

/// Build an unsigned token (`alg: none`) around the given claims.
///
/// The signature segment is empty, so the result ends with a trailing dot.
///
/// # Errors
/// Returns [`CodecError::Json`] if the claims cannot be serialized.
pub fn unsigned_token(claims: &Map<String, Value>) -> CodecResult<String> {
    let header = serde_json::to_vec(&json!({ "alg": "none", "typ": "JWT" }))?;
    let payload = serde_json::to_vec(claims)?;
    Ok(format!("{}.{}.", URL_SAFE_NO_PAD.encode(header), URL_SAFE_NO_PAD.encode(payload)))
}
