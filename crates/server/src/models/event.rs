//! Campaigns and seasonal events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use teainn_core::{EventId, Slug};

use super::category::parse_slug;
use super::input::{
    ValidationError, clearable, double_option, lenient_i32, non_blank, parse_timestamp_patch,
    required,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub slug: Slug,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    /// Free-form label such as "新品" or "優惠".
    pub category: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_featured: bool,
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    pub title: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub subtitle: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub image: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub start_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_date: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub order: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub slug: Slug,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_featured: bool,
    pub order: i32,
}

#[derive(Debug, Clone, Default)]
pub struct EventChanges {
    pub title: Option<String>,
    pub slug: Option<Slug>,
    pub subtitle: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub image: Option<Option<String>>,
    pub category: Option<Option<String>>,
    pub start_date: Option<Option<DateTime<Utc>>>,
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub order: Option<i32>,
}

impl EventInput {
    /// Validate a create request.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if title or slug is missing, a date does
    /// not parse, or the event ends before it starts.
    pub fn into_new(self) -> Result<NewEvent, ValidationError> {
        const MISSING: &str = "標題和 slug 為必填";
        let title = required(self.title, MISSING)?;
        let slug = parse_slug(&required(self.slug, MISSING)?)?;
        let start_date = parse_timestamp_patch(self.start_date, "startDate")?.flatten();
        let end_date = parse_timestamp_patch(self.end_date, "endDate")?.flatten();
        check_range(start_date, end_date)?;

        Ok(NewEvent {
            title,
            slug,
            subtitle: clearable(self.subtitle).flatten(),
            description: clearable(self.description).flatten(),
            image: clearable(self.image).flatten(),
            category: clearable(self.category).flatten(),
            start_date,
            end_date,
            is_active: self.is_active.unwrap_or(true),
            is_featured: self.is_featured.unwrap_or(false),
            order: self.order.unwrap_or(0),
        })
    }

    /// Validate an update request.
    ///
    /// Only a range where both ends arrive in the same request is checked;
    /// the stored counterpart is not consulted.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for a malformed slug or date.
    pub fn into_changes(self) -> Result<EventChanges, ValidationError> {
        let start_date = parse_timestamp_patch(self.start_date, "startDate")?;
        let end_date = parse_timestamp_patch(self.end_date, "endDate")?;
        if let (Some(start), Some(end)) = (start_date, end_date) {
            check_range(start, end)?;
        }

        Ok(EventChanges {
            title: non_blank(self.title),
            slug: non_blank(self.slug).as_deref().map(parse_slug).transpose()?,
            subtitle: clearable(self.subtitle),
            description: clearable(self.description),
            image: clearable(self.image),
            category: clearable(self.category),
            start_date,
            end_date,
            is_active: self.is_active,
            is_featured: self.is_featured,
            order: self.order,
        })
    }
}

fn check_range(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<(), ValidationError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => {
            Err(ValidationError::new("結束日期不能早於開始日期"))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(json: &str) -> EventInput {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_create_parses_dates() {
        let new = input(
            r#"{"title": "夏日限定", "slug": "summer", "startDate": "2025-07-01",
                "endDate": "2025-08-31T23:59", "category": ""}"#,
        )
        .into_new()
        .unwrap();
        assert!(new.start_date.is_some());
        assert!(new.end_date.is_some());
        assert_eq!(new.category, None);
        assert!(!new.is_featured);
    }

    #[test]
    fn test_create_rejects_inverted_range() {
        let result = input(
            r#"{"title": "夏日限定", "slug": "summer", "startDate": "2025-08-01", "endDate": "2025-07-01"}"#,
        )
        .into_new();
        assert!(result.is_err());
    }

    #[test]
    fn test_create_requires_title_and_slug() {
        assert!(input(r#"{"slug": "summer"}"#).into_new().is_err());
        assert!(input(r#"{"title": "夏日限定"}"#).into_new().is_err());
    }

    #[test]
    fn test_update_can_clear_dates() {
        let changes = input(r#"{"endDate": null, "startDate": ""}"#)
            .into_changes()
            .unwrap();
        assert_eq!(changes.end_date, Some(None));
        assert_eq!(changes.start_date, Some(None));

        let untouched = input("{}").into_changes().unwrap();
        assert!(untouched.start_date.is_none());
    }

    #[test]
    fn test_update_rejects_bad_date() {
        assert!(input(r#"{"startDate": "soon"}"#).into_changes().is_err());
    }
}
