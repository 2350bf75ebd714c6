//! Promotion cards shown on the landing page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use teainn_core::PromotionId;

use super::input::{ValidationError, clearable, double_option, lenient_i32, non_blank, required};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    pub id: PromotionId,
    pub title: String,
    pub description: Option<String>,
    /// Icon name or emoji rendered beside the title.
    pub icon: Option<String>,
    pub link: Option<String>,
    pub is_active: bool,
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionInput {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub icon: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub link: Option<Option<String>>,
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub order: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewPromotion {
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub link: Option<String>,
    pub is_active: bool,
    pub order: i32,
}

#[derive(Debug, Clone, Default)]
pub struct PromotionChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub icon: Option<Option<String>>,
    pub link: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub order: Option<i32>,
}

impl PromotionInput {
    /// Validate a create request.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the title is missing.
    pub fn into_new(self) -> Result<NewPromotion, ValidationError> {
        Ok(NewPromotion {
            title: required(self.title, "標題為必填")?,
            description: clearable(self.description).flatten(),
            icon: clearable(self.icon).flatten(),
            link: clearable(self.link).flatten(),
            is_active: self.is_active.unwrap_or(true),
            order: self.order.unwrap_or(0),
        })
    }

    #[must_use]
    pub fn into_changes(self) -> PromotionChanges {
        PromotionChanges {
            title: non_blank(self.title),
            description: clearable(self.description),
            icon: clearable(self.icon),
            link: clearable(self.link),
            is_active: self.is_active,
            order: self.order,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_create_requires_title() {
        let input: PromotionInput = serde_json::from_str(r#"{"icon": "🎉"}"#).unwrap();
        assert!(input.into_new().is_err());

        let input: PromotionInput =
            serde_json::from_str(r#"{"title": "第二杯半價", "order": "2"}"#).unwrap();
        let new = input.into_new().unwrap();
        assert_eq!(new.order, 2);
        assert!(new.is_active);
    }

    #[test]
    fn test_update_keeps_blank_title() {
        let input: PromotionInput =
            serde_json::from_str(r#"{"title": "  ", "isActive": false, "link": ""}"#).unwrap();
        let changes = input.into_changes();
        assert!(changes.title.is_none());
        assert_eq!(changes.is_active, Some(false));
        assert_eq!(changes.link, Some(None));
    }
}
