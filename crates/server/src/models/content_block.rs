//! Keyed JSON documents driving the marketing sections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use teainn_core::ContentBlockId;

use super::input::{ValidationError, required};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlock {
    pub id: ContentBlockId,
    pub key: String,
    /// Opaque to the server; see `teainn_core::content` for known shapes.
    pub payload: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/admin/content-blocks`.
#[derive(Debug, Default, Deserialize)]
pub struct ContentBlockUpsert {
    pub key: Option<String>,
    pub payload: Option<Value>,
}

/// Body of `PUT /api/admin/content-blocks/{key}`.
#[derive(Debug, Default, Deserialize)]
pub struct ContentPayload {
    pub payload: Option<Value>,
}

impl ContentBlockUpsert {
    /// Split into the key and the payload to store.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the key is missing or blank.
    pub fn into_parts(self) -> Result<(String, Value), ValidationError> {
        let key = required(self.key, "key 為必填")?;
        Ok((key, payload_or_empty(self.payload)))
    }
}

impl ContentPayload {
    #[must_use]
    pub fn into_value(self) -> Value {
        payload_or_empty(self.payload)
    }
}

/// A missing or `null` payload is stored as `{}`.
fn payload_or_empty(payload: Option<Value>) -> Value {
    match payload {
        None | Some(Value::Null) => Value::Object(serde_json::Map::new()),
        Some(value) => value,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_upsert_requires_key() {
        let body: ContentBlockUpsert = serde_json::from_value(json!({"payload": {}})).unwrap();
        assert!(body.into_parts().is_err());
    }

    #[test]
    fn test_missing_payload_becomes_empty_object() {
        let body: ContentBlockUpsert = serde_json::from_value(json!({"key": "hero"})).unwrap();
        let (key, payload) = body.into_parts().unwrap();
        assert_eq!(key, "hero");
        assert_eq!(payload, json!({}));

        let body: ContentPayload = serde_json::from_value(json!({"payload": null})).unwrap();
        assert_eq!(body.into_value(), json!({}));
    }

    #[test]
    fn test_payload_kept_verbatim() {
        let body: ContentPayload =
            serde_json::from_value(json!({"payload": {"title": "茶飲", "stats": [1, 2]}})).unwrap();
        assert_eq!(body.into_value(), json!({"title": "茶飲", "stats": [1, 2]}));
    }
}
