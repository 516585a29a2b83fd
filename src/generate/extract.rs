//! Heuristic extraction of the callback URL and token from an untyped response.
//!
//! The generation endpoint's response shape is not fixed, so both values are
//! located by scanning key names. Keys are visited in the order the server
//! sent them.

use serde_json::{Map, Value};
use url::Url;

/// Key fragments (lowercase) that mark a callback URL.
const URL_KEY_HINTS: &[&str] = &["webhook", "callback"];

/// Key fragments (lowercase) that mark an access token.
const TOKEN_KEY_HINTS: &[&str] = &["token", "jwt"];

/// Finds the callback URL in a generation response.
///
/// First looks at keys containing `webhook` or `callback` (case-insensitive)
/// and takes the first string value that starts with `http` and parses as a
/// URL. If no such key matches, every value is scanned regardless of key.
#[must_use]
pub fn extract_webhook_url(response: &Map<String, Value>) -> Option<Url> {
    response
        .iter()
        .filter(|(key, _)| key_matches(key, URL_KEY_HINTS))
        .find_map(|(_, value)| parse_http_url(value))
        .or_else(|| response.values().find_map(parse_http_url))
}

/// Finds the access token in a generation response.
///
/// Takes the first non-blank string value whose key contains `token` or `jwt`
/// (case-insensitive).
#[must_use]
pub fn extract_token(response: &Map<String, Value>) -> Option<String> {
    response
        .iter()
        .filter(|(key, _)| key_matches(key, TOKEN_KEY_HINTS))
        .find_map(|(_, value)| {
            value
                .as_str()
                .filter(|s| !s.trim().is_empty())
                .map(ToString::to_string)
        })
}

fn key_matches(key: &str, hints: &[&str]) -> bool {
    let key = key.to_lowercase();
    hints.iter().any(|hint| key.contains(hint))
}

fn parse_http_url(value: &Value) -> Option<Url> {
    value
        .as_str()
        .filter(|s| s.starts_with("http"))
        .and_then(|s| Url::parse(s).ok())
}
