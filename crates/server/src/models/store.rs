//! Physical store locations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use teainn_core::{Slug, StoreId};

use super::category::parse_slug;
use super::input::{
    ValidationError, clean_list, clearable, double_option, lenient_i32, non_blank, required,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub slug: Slug,
    pub address: String,
    pub phone: Option<String>,
    pub opening_hours: String,
    pub image: Option<String>,
    /// Feature tags such as "外送" or "內用".
    pub features: Vec<String>,
    pub map_url: Option<String>,
    pub order_url: Option<String>,
    pub is_active: bool,
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreInput {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub address: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    pub opening_hours: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub image: Option<Option<String>>,
    pub features: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub map_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub order_url: Option<Option<String>>,
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub order: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewStore {
    pub name: String,
    pub slug: Slug,
    pub address: String,
    pub phone: Option<String>,
    pub opening_hours: String,
    pub image: Option<String>,
    pub features: Vec<String>,
    pub map_url: Option<String>,
    pub order_url: Option<String>,
    pub is_active: bool,
    pub order: i32,
}

#[derive(Debug, Clone, Default)]
pub struct StoreChanges {
    pub name: Option<String>,
    pub slug: Option<Slug>,
    pub address: Option<String>,
    pub phone: Option<Option<String>>,
    pub opening_hours: Option<String>,
    pub image: Option<Option<String>>,
    pub features: Option<Vec<String>>,
    pub map_url: Option<Option<String>>,
    pub order_url: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub order: Option<i32>,
}

impl StoreInput {
    /// Validate a create request.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if name, slug, address or opening hours is
    /// missing.
    pub fn into_new(self) -> Result<NewStore, ValidationError> {
        const MISSING: &str = "名稱、slug、地址和營業時間為必填";
        let name = required(self.name, MISSING)?;
        let slug = parse_slug(&required(self.slug, MISSING)?)?;
        let address = required(self.address, MISSING)?;
        let opening_hours = required(self.opening_hours, MISSING)?;

        Ok(NewStore {
            name,
            slug,
            address,
            phone: clearable(self.phone).flatten(),
            opening_hours,
            image: clearable(self.image).flatten(),
            features: clean_list(self.features.unwrap_or_default()),
            map_url: clearable(self.map_url).flatten(),
            order_url: clearable(self.order_url).flatten(),
            is_active: self.is_active.unwrap_or(true),
            order: self.order.unwrap_or(0),
        })
    }

    /// Validate an update request.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if a provided slug is malformed.
    pub fn into_changes(self) -> Result<StoreChanges, ValidationError> {
        Ok(StoreChanges {
            name: non_blank(self.name),
            slug: non_blank(self.slug).as_deref().map(parse_slug).transpose()?,
            address: non_blank(self.address),
            phone: clearable(self.phone),
            opening_hours: non_blank(self.opening_hours),
            image: clearable(self.image),
            features: self.features.map(clean_list),
            map_url: clearable(self.map_url),
            order_url: clearable(self.order_url),
            is_active: self.is_active,
            order: self.order,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(json: &str) -> StoreInput {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_create_requires_address_and_hours() {
        let missing_hours = input(r#"{"name": "信義店", "slug": "xinyi", "address": "台北市信義區"}"#);
        assert!(missing_hours.into_new().is_err());

        let new = input(
            r#"{"name": "信義店", "slug": "xinyi", "address": "台北市信義區",
                "openingHours": "10:00-22:00", "features": ["外送", ""], "phone": ""}"#,
        )
        .into_new()
        .unwrap();
        assert_eq!(new.features, vec!["外送".to_owned()]);
        assert_eq!(new.phone, None);
        assert!(new.is_active);
    }

    #[test]
    fn test_update_clears_urls() {
        let changes = input(r#"{"mapUrl": null, "orderUrl": "https://order.example.com"}"#)
            .into_changes()
            .unwrap();
        assert_eq!(changes.map_url, Some(None));
        assert_eq!(
            changes.order_url,
            Some(Some("https://order.example.com".to_owned()))
        );
        assert!(changes.phone.is_none());
        assert!(changes.features.is_none());
    }
}
