//! Numeric ids derived from the `url` field of upstream items.

use serde_json::Value as JsonValue;

/// The value is not an upstream item URL of the form `/api/<resource>/<id>[/]`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot extract id from url: {0:?}")]
pub struct InvalidSwapiUrl(pub String);

/// Extracts the numeric id from an upstream item URL.
///
/// Accepts `https://swapi.dev/api/people/1/` and `http://swapi.dev/api/films/2`.
pub fn extract_id(url: &str) -> Result<u64, InvalidSwapiUrl> {
    let invalid = || InvalidSwapiUrl(url.to_owned());
    let trimmed = url.trim();
    let path = trimmed.strip_suffix('/').unwrap_or(trimmed);

    let mut segments = path.rsplit('/');
    let id = segments.next().ok_or_else(invalid)?;
    let resource = segments.next().ok_or_else(invalid)?;
    let api = segments.next().ok_or_else(invalid)?;

    let resource_ok = !resource.is_empty()
        && resource
            .bytes()
            .all(|b| b.is_ascii_alphabetic() || b == b'_');
    if api != "api" || !resource_ok {
        return Err(invalid());
    }
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    id.parse().map_err(|_| invalid())
}

/// Returns a copy of `item` with an `"id"` field derived from its `"url"`.
///
/// The input is left untouched.
pub fn attach_id(item: &JsonValue) -> Result<JsonValue, InvalidSwapiUrl> {
    let JsonValue::Object(fields) = item else {
        return Err(InvalidSwapiUrl(item.to_string()));
    };
    let url = fields
        .get("url")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| InvalidSwapiUrl(String::new()))?;
    let id = extract_id(url)?;

    let mut fields = fields.clone();
    fields.insert("id".to_owned(), JsonValue::from(id));
    Ok(JsonValue::Object(fields))
}
