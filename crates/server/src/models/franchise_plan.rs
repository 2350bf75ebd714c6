//! Franchise investment plans.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use teainn_core::{FranchisePlanId, Slug};

use super::input::{ValidationError, clean_list, lenient_i32, non_blank, required};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FranchisePlan {
    pub id: FranchisePlanId,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub image: Option<String>,
    /// Display text, e.g. "80 萬起".
    pub investment: String,
    pub area: Option<String>,
    pub features: Vec<String>,
    pub includes: Vec<String>,
    pub is_popular: bool,
    pub is_active: bool,
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Plan form body. Unlike the other admin forms, updates replace every
/// field, so absent values fall back to their defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FranchisePlanInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub investment: Option<String>,
    pub area: Option<String>,
    pub features: Option<Vec<String>>,
    pub includes: Option<Vec<String>>,
    pub is_popular: Option<bool>,
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub order: Option<i32>,
}

/// Every writable column of a plan except the slug.
#[derive(Debug, Clone)]
pub struct FranchisePlanFields {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub investment: String,
    pub area: Option<String>,
    pub features: Vec<String>,
    pub includes: Vec<String>,
    pub is_popular: bool,
    pub is_active: bool,
    pub order: i32,
}

impl FranchisePlanInput {
    /// Validate the body into a full set of columns.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if name or investment is missing.
    pub fn into_fields(self) -> Result<FranchisePlanFields, ValidationError> {
        const MISSING: &str = "方案名稱和投資金額為必填";
        Ok(FranchisePlanFields {
            name: required(self.name, MISSING)?,
            description: non_blank(self.description),
            image: non_blank(self.image),
            investment: required(self.investment, MISSING)?,
            area: non_blank(self.area),
            features: clean_list(self.features.unwrap_or_default()),
            includes: clean_list(self.includes.unwrap_or_default()),
            is_popular: self.is_popular.unwrap_or(false),
            is_active: self.is_active.unwrap_or(true),
            order: self.order.unwrap_or(0),
        })
    }
}

impl FranchisePlanFields {
    /// Slug for a new plan, derived from its name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the name has no sluggable characters.
    pub fn derive_slug(&self) -> Result<Slug, ValidationError> {
        Slug::from_name(&self.name)
            .map_err(|_| ValidationError::new("方案名稱無法產生 slug，請使用中文或英數字"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fields(json: &str) -> Result<FranchisePlanFields, ValidationError> {
        serde_json::from_str::<FranchisePlanInput>(json)
            .unwrap()
            .into_fields()
    }

    #[test]
    fn test_requires_name_and_investment() {
        assert!(fields(r#"{"name": "標準店型"}"#).is_err());
        assert!(fields(r#"{"investment": "80 萬起"}"#).is_err());
    }

    #[test]
    fn test_absent_values_reset_to_defaults() {
        let plan = fields(r#"{"name": "標準店型", "investment": "80 萬起", "area": ""}"#).unwrap();
        assert_eq!(plan.area, None);
        assert!(plan.features.is_empty());
        assert!(!plan.is_popular);
        assert!(plan.is_active);
        assert_eq!(plan.order, 0);
    }

    #[test]
    fn test_derive_slug_from_name() {
        let plan = fields(r#"{"name": "Premium 旗艦店", "investment": "150 萬"}"#).unwrap();
        assert_eq!(plan.derive_slug().unwrap().as_str(), "premium-旗艦店");

        let symbols = fields(r#"{"name": "★★★", "investment": "150 萬"}"#).unwrap();
        assert!(symbols.derive_slug().is_err());
    }
}
