//! OAuth parameter encoding
//!
//! Authorization requests travel as query parameters and responses come back
//! in the URL fragment (`#id_token=...&state=...`).

use std::collections::HashMap;

use url::{form_urlencoded, Url};

use crate::error::{CodecError, CodecResult};

/// Build an authorization URL by appending `params` to `endpoint`.
///
/// Existing query parameters on the endpoint are preserved.
///
/// # Errors
/// Returns [`CodecError::Url`] if `endpoint` is not an absolute URL.
pub fn authorization_url<'a, I>(endpoint: &str, params: I) -> CodecResult<String>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut url = Url::parse(endpoint)?;
    url.query_pairs_mut().extend_pairs(params);
    Ok(url.into())
}

/// Return the fragment of a URL, or the input itself if it has no `#`.
#[must_use]
pub fn fragment_of(url: &str) -> &str {
    url.split_once('#').map_or(url, |(_, fragment)| fragment)
}

/// Parse `application/x-www-form-urlencoded` pairs.
///
/// A leading `#` or `?` is ignored. `+` decodes to a space and invalid
/// percent-encoding is decoded lossily. Pairs with an empty key are skipped
/// and later duplicates win.
#[must_use]
pub fn parse_params(input: &str) -> HashMap<String, String> {
    let trimmed = input.trim_start_matches(['#', '?']);
    form_urlencoded::parse(trimmed.as_bytes())
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

/// Parse a response fragment and surface any error it reports.
///
/// # Errors
/// Returns [`CodecError::Provider`] when the fragment carries an `error`
/// parameter.
pub fn parse_response_fragment(input: &str) -> CodecResult<HashMap<String, String>> {
    let params = parse_params(input);

    if let Some(error) = params.get("error") {
        let description = params.get("error_description").cloned().unwrap_or_default();
        return Err(CodecError::Provider { error: error.clone(), description });
    }

    Ok(params)
}

/// Take a required parameter out of a parsed fragment.
///
/// # Errors
/// Returns [`CodecError::MissingParameter`] when absent or empty.
pub fn require_param(params: &mut HashMap<String, String>, name: &str) -> CodecResult<String> {
    params
        .remove(name)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| CodecError::MissingParameter(name.to_string()))
}
