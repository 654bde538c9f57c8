//! Resolution of reference lists such as a film's `characters`.

use serde_json::Value as JsonValue;

use crate::{ids::attach_id, Result, SwapiClient, SwapiError};

impl SwapiClient {
    /// Fetches the resource at `path` and resolves the URLs listed in `field`.
    ///
    /// The parent resource is fetched uncached; the referenced items go
    /// through the cache, with one worker per URL up to `max_workers`. Each
    /// resolved item gets an `"id"` derived from its `"url"`. A missing or
    /// null field resolves to an empty list.
    pub async fn resolve_references(&self, path: &str, field: &str) -> Result<Vec<JsonValue>> {
        let parent = self.get(path, ()).await?;
        let urls = reference_urls(&parent, field)?;
        let items = self.resolve(&urls, self.options().max_workers).await?;
        items
            .iter()
            .map(|item| {
                attach_id(item).map_err(|err| {
                    SwapiError::BadResponse(format!("referenced item from {path}: {err}"))
                })
            })
            .collect()
    }
}

/// Reads the array of URL strings stored under `field`.
pub(crate) fn reference_urls(resource: &JsonValue, field: &str) -> Result<Vec<String>> {
    match resource.get(field) {
        None | Some(JsonValue::Null) => Ok(Vec::new()),
        Some(JsonValue::Array(values)) => values
            .iter()
            .map(|value| {
                value.as_str().map(str::to_owned).ok_or_else(|| {
                    SwapiError::BadResponse(format!("non-string entry in '{field}': {value}"))
                })
            })
            .collect(),
        Some(other) => Err(SwapiError::BadResponse(format!(
            "expected '{field}' to be a list of urls, got {other}"
        ))),
    }
}

/// Keeps items whose `"name"` contains `term`, ignoring case.
///
/// A blank term keeps everything.
pub fn filter_by_name(items: Vec<JsonValue>, term: &str) -> Vec<JsonValue> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| {
            item.get("name")
                .and_then(JsonValue::as_str)
                .is_some_and(|name| name.to_lowercase().contains(&needle))
        })
        .collect()
}
