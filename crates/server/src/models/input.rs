//! Request-body helpers shared by the admin and public inputs.
//!
//! Admin forms post loosely typed JSON: numbers may arrive as strings, empty
//! strings stand for "no value", and a PUT body only carries the fields the
//! admin touched. The deserializers here normalize that before validation.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// A request body failed validation. The message is shown to the admin.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(i64),
    Text(String),
}

/// Accept `12`, `"12"`, `""` or `null` for an optional integer.
///
/// # Errors
///
/// Fails on non-numeric text, fractional numbers, or values outside `i32`.
pub fn lenient_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => i32::try_from(n)
            .map(Some)
            .map_err(|_| D::Error::custom(format!("{n} is out of range"))),
        Some(NumberOrText::Text(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<i32>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("'{s}' is not an integer")))
        }
    }
}

/// Like [`lenient_i32`], but keeps "absent" (`None`) apart from "cleared"
/// (`Some(None)`). Use with `#[serde(default)]`.
///
/// # Errors
///
/// Same as [`lenient_i32`].
pub fn patch_i32<'de, D>(deserializer: D) -> Result<Option<Option<i32>>, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_i32(deserializer).map(Some)
}

/// Distinguish an absent field (`None`) from an explicit `null`
/// (`Some(None)`). Use with `#[serde(default)]`.
///
/// # Errors
///
/// Propagates the inner type's deserialization error.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Trimmed text, or `None` when blank.
#[must_use]
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

/// A required text field.
///
/// # Errors
///
/// Returns `message` when the value is missing or blank.
pub fn required(value: Option<String>, message: &str) -> Result<String, ValidationError> {
    non_blank(value).ok_or_else(|| ValidationError::new(message))
}

/// Normalize an optional-text patch: blank strings clear the column.
#[must_use]
pub fn clearable(value: Option<Option<String>>) -> Option<Option<String>> {
    value.map(non_blank)
}

/// Split a patch value into the "is present" flag and the value bound to SQL.
#[must_use]
pub fn split_patch<T>(value: Option<Option<T>>) -> (bool, Option<T>) {
    match value {
        Some(inner) => (true, inner),
        None => (false, None),
    }
}

/// Trim list entries and drop the blank ones.
#[must_use]
pub fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse a timestamp from an admin form.
///
/// Accepts RFC 3339, `datetime-local` values (`2025-03-01T10:00`), and bare
/// dates. Values without an offset are taken as UTC.
///
/// # Errors
///
/// Returns a [`ValidationError`] naming `field` when nothing matches.
pub fn parse_timestamp(raw: &str, field: &str) -> Result<DateTime<Utc>, ValidationError> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        && let Some(naive) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(naive.and_utc());
    }

    Err(ValidationError::new(format!("{field} 日期格式不正確")))
}

/// Parse an optional timestamp patch; blank or `null` clears it.
///
/// # Errors
///
/// See [`parse_timestamp`].
pub fn parse_timestamp_patch(
    value: Option<Option<String>>,
    field: &str,
) -> Result<Option<Option<DateTime<Utc>>>, ValidationError> {
    match clearable(value) {
        None => Ok(None),
        Some(None) => Ok(Some(None)),
        Some(Some(raw)) => parse_timestamp(&raw, field).map(|ts| Some(Some(ts))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "lenient_i32")]
        price: Option<i32>,
        #[serde(default, deserialize_with = "patch_i32")]
        calories: Option<Option<i32>>,
        #[serde(default, deserialize_with = "double_option")]
        image: Option<Option<String>>,
    }

    fn sample(json: &str) -> Sample {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_lenient_i32_accepts_numbers_and_text() {
        assert_eq!(sample(r#"{"price": 65}"#).price, Some(65));
        assert_eq!(sample(r#"{"price": " 70 "}"#).price, Some(70));
        assert_eq!(sample(r#"{"price": ""}"#).price, None);
        assert_eq!(sample(r#"{"price": null}"#).price, None);
        assert_eq!(sample("{}").price, None);
    }

    #[test]
    fn test_lenient_i32_rejects_garbage() {
        assert!(serde_json::from_str::<Sample>(r#"{"price": "abc"}"#).is_err());
        assert!(serde_json::from_str::<Sample>(r#"{"price": 99999999999}"#).is_err());
    }

    #[test]
    fn test_patch_fields_separate_absent_from_null() {
        let absent = sample("{}");
        assert_eq!(absent.calories, None);
        assert_eq!(absent.image, None);

        let cleared = sample(r#"{"calories": null, "image": null}"#);
        assert_eq!(cleared.calories, Some(None));
        assert_eq!(cleared.image, Some(None));

        let set = sample(r#"{"calories": "320", "image": "/a.jpg"}"#);
        assert_eq!(set.calories, Some(Some(320)));
        assert_eq!(set.image, Some(Some("/a.jpg".to_owned())));
    }

    #[test]
    fn test_required_and_non_blank() {
        assert_eq!(required(Some(" 珍奶 ".into()), "x").unwrap(), "珍奶");
        assert!(required(Some("   ".into()), "名稱為必填").is_err());
        assert!(required(None, "名稱為必填").is_err());
        assert_eq!(non_blank(Some(String::new())), None);
    }

    #[test]
    fn test_clearable_turns_blank_into_null() {
        assert_eq!(clearable(Some(Some(" ".into()))), Some(None));
        assert_eq!(clearable(None), None);
    }

    #[test]
    fn test_split_patch() {
        assert_eq!(split_patch::<i32>(None), (false, None));
        assert_eq!(split_patch::<i32>(Some(None)), (true, None));
        assert_eq!(split_patch(Some(Some(3))), (true, Some(3)));
    }

    #[test]
    fn test_clean_list() {
        let list = clean_list(vec!["外送".into(), " ".into(), " 內用 ".into()]);
        assert_eq!(list, vec!["外送".to_owned(), "內用".to_owned()]);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let rfc = parse_timestamp("2025-03-01T10:00:00+08:00", "startDate").unwrap();
        assert_eq!(rfc.to_rfc3339(), "2025-03-01T02:00:00+00:00");

        let local = parse_timestamp("2025-03-01T10:00", "startDate").unwrap();
        assert_eq!(local.to_rfc3339(), "2025-03-01T10:00:00+00:00");

        let date = parse_timestamp("2025-03-01", "startDate").unwrap();
        assert_eq!(date.to_rfc3339(), "2025-03-01T00:00:00+00:00");

        assert!(parse_timestamp("next tuesday", "startDate").is_err());
    }

    #[test]
    fn test_parse_timestamp_patch() {
        assert!(parse_timestamp_patch(None, "endDate").unwrap().is_none());
        assert_eq!(
            parse_timestamp_patch(Some(Some(String::new())), "endDate").unwrap(),
            Some(None)
        );
        assert!(
            parse_timestamp_patch(Some(Some("2025-12-31".into())), "endDate")
                .unwrap()
                .is_some_and(|v| v.is_some())
        );
    }
}
