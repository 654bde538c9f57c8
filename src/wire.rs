use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::{Result, SwapiError};

/// One upstream list page: `{ "count": <int>, "results": [...] }`.
#[derive(Debug, Deserialize)]
pub struct ListPage {
    #[serde(default)]
    pub count: Option<JsonValue>,
    #[serde(default)]
    pub results: Option<Vec<JsonValue>>,
}

impl ListPage {
    pub fn from_json(value: JsonValue) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|err| SwapiError::BadResponse(format!("invalid list page: {err}")))
    }

    /// Total count, when reported as an integer or a digit string.
    pub fn total(&self) -> Option<u64> {
        match self.count.as_ref()? {
            JsonValue::Number(n) => n.as_u64(),
            JsonValue::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
                s.parse().ok()
            }
            _ => None,
        }
    }

    pub fn into_results(self) -> Vec<JsonValue> {
        self.results.unwrap_or_default()
    }
}
