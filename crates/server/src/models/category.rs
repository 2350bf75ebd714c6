//! Menu categories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use teainn_core::{CategoryId, Slug};

use super::Product;
use super::input::{ValidationError, clearable, double_option, lenient_i32, non_blank, required};

/// A menu category (domain type).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The public menu's view of a category.
#[derive(Debug, Clone, Serialize)]
pub struct PublicCategory {
    pub id: CategoryId,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
}

impl From<Category> for PublicCategory {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
            description: category.description,
        }
    }
}

/// Category summary embedded in product responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
    pub slug: Slug,
}

/// Admin listing row: a category and how many products it owns.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithCount {
    #[serde(flatten)]
    pub category: Category,
    pub product_count: i64,
}

/// Admin detail view: a category with its products.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: Category,
    pub products: Vec<Product>,
}

/// Category form body, used for both create and partial update.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub order: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub order: i32,
    pub is_active: bool,
}

/// Fields to change; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub slug: Option<Slug>,
    pub description: Option<Option<String>>,
    pub order: Option<i32>,
    pub is_active: Option<bool>,
}

impl CategoryInput {
    /// Validate a create request.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the name or slug is missing or the slug
    /// is malformed.
    pub fn into_new(self) -> Result<NewCategory, ValidationError> {
        const MISSING: &str = "名稱和 slug 為必填";
        let name = required(self.name, MISSING)?;
        let slug = parse_slug(&required(self.slug, MISSING)?)?;

        Ok(NewCategory {
            name,
            slug,
            description: clearable(self.description).flatten(),
            order: self.order.unwrap_or(0),
            is_active: self.is_active.unwrap_or(true),
        })
    }

    /// Validate an update request. Blank name or slug keeps the stored value.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if a provided slug is malformed.
    pub fn into_changes(self) -> Result<CategoryChanges, ValidationError> {
        Ok(CategoryChanges {
            name: non_blank(self.name),
            slug: non_blank(self.slug).as_deref().map(parse_slug).transpose()?,
            description: clearable(self.description),
            order: self.order,
            is_active: self.is_active,
        })
    }
}

/// Parse an admin-entered slug.
///
/// # Errors
///
/// Returns [`ValidationError`] describing why the slug was rejected.
pub fn parse_slug(raw: &str) -> Result<Slug, ValidationError> {
    Slug::parse(raw).map_err(|e| ValidationError::new(format!("slug 格式不正確：{e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(json: &str) -> CategoryInput {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_create_requires_name_and_slug() {
        assert!(input(r#"{"name": "純茶"}"#).into_new().is_err());
        assert!(input(r#"{"slug": "pure-tea"}"#).into_new().is_err());
        assert!(input(r#"{"name": "", "slug": "pure-tea"}"#).into_new().is_err());
    }

    #[test]
    fn test_create_defaults() {
        let new = input(r#"{"name": "純茶", "slug": "pure-tea"}"#)
            .into_new()
            .unwrap();
        assert_eq!(new.order, 0);
        assert!(new.is_active);
        assert_eq!(new.description, None);
    }

    #[test]
    fn test_create_keeps_explicit_inactive() {
        let new = input(r#"{"name": "純茶", "slug": "pure-tea", "isActive": false, "order": "3"}"#)
            .into_new()
            .unwrap();
        assert!(!new.is_active);
        assert_eq!(new.order, 3);
    }

    #[test]
    fn test_update_ignores_blank_required_fields() {
        let changes = input(r#"{"name": "", "slug": " ", "order": 2}"#)
            .into_changes()
            .unwrap();
        assert!(changes.name.is_none());
        assert!(changes.slug.is_none());
        assert_eq!(changes.order, Some(2));
        assert!(changes.description.is_none());
    }

    #[test]
    fn test_update_rejects_bad_slug() {
        assert!(input(r#"{"slug": "pure tea"}"#).into_changes().is_err());
    }

    #[test]
    fn test_serializes_camel_case() {
        let category = Category {
            id: CategoryId::new(1),
            name: "純茶".into(),
            slug: Slug::parse("pure-tea").unwrap(),
            description: None,
            order: 1,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(CategoryWithCount {
            category,
            product_count: 4,
        })
        .unwrap();
        assert_eq!(value["isActive"], true);
        assert_eq!(value["productCount"], 4);
        assert_eq!(value["slug"], "pure-tea");
        assert!(value.get("createdAt").is_some());
    }
}
