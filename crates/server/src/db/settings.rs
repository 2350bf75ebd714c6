//! Site settings database operations.
//!
//! Settings are flat string key/value pairs (phone, social links, ...).

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;
use sqlx::PgPool;

use super::RepositoryError;

pub struct SettingsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SettingsRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All settings as a key/value map.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_all(&self) -> Result<BTreeMap<String, String>, RepositoryError> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key, value FROM site_settings ORDER BY key")
                .fetch_all(self.pool)
                .await?;

        Ok(rows.into_iter().collect())
    }

    /// Insert or overwrite every entry of `settings` in one transaction.
    /// Keys not mentioned are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn upsert_many(
        &self,
        settings: &BTreeMap<String, String>,
    ) -> Result<(), RepositoryError> {
        if settings.is_empty() {
            return Ok(());
        }
        let keys: Vec<&str> = settings.keys().map(String::as_str).collect();
        let values: Vec<&str> = settings.values().map(String::as_str).collect();

        sqlx::query(
            r"
            INSERT INTO site_settings (key, value)
            SELECT * FROM UNNEST($1::TEXT[], $2::TEXT[])
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            ",
        )
        .bind(&keys)
        .bind(&values)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}

/// Convert a posted JSON object into stored strings. Strings are kept as-is,
/// anything else is stored as its JSON text (`3` becomes `"3"`).
#[must_use]
pub fn stringify_settings(body: serde_json::Map<String, JsonValue>) -> BTreeMap<String, String> {
    body.into_iter()
        .map(|(key, value)| {
            let value = match value {
                JsonValue::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_stringify_settings() {
        let body = json!({
            "phone": "02-1111",
            "storeCount": 12,
            "showBanner": true,
            "fax": null
        });
        let JsonValue::Object(map) = body else {
            panic!("expected object");
        };

        let settings = stringify_settings(map);
        assert_eq!(settings["phone"], "02-1111");
        assert_eq!(settings["storeCount"], "12");
        assert_eq!(settings["showBanner"], "true");
        assert_eq!(settings["fax"], "null");
    }
}
