//! Menu products with their size and topping options.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use teainn_core::{CategoryId, ProductId, ProductSizeId, ProductToppingId, Slug};

use super::category::{CategoryRef, parse_slug};
use super::input::{
    ValidationError, clean_list, clearable, double_option, lenient_i32, non_blank, patch_i32,
    required,
};

/// A menu product with its category summary and option rows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    /// Base price in whole NT dollars.
    pub price: i32,
    pub image: Option<String>,
    pub category_id: CategoryId,
    pub category: CategoryRef,
    pub is_active: bool,
    pub is_featured: bool,
    pub is_new: bool,
    pub order: i32,
    pub calories: Option<i32>,
    pub tags: Vec<String>,
    pub sizes: Vec<ProductSize>,
    pub toppings: Vec<ProductTopping>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A cup size; `price_add` is added to the product's base price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSize {
    pub id: ProductSizeId,
    pub name: String,
    pub price_add: i32,
    pub is_default: bool,
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTopping {
    pub id: ProductToppingId,
    pub name: String,
    pub price: i32,
    pub is_available: bool,
    pub order: i32,
}

/// Which products a listing returns.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category_slug: Option<String>,
    pub category_id: Option<CategoryId>,
    pub featured: Option<bool>,
    pub active: Option<bool>,
    /// Drop toppings marked unavailable (public menu).
    pub available_toppings_only: bool,
}

impl ProductFilter {
    /// The public menu: active products only, unavailable toppings hidden.
    #[must_use]
    pub fn public(category_slug: Option<String>, featured_only: bool) -> Self {
        Self {
            category_slug,
            featured: featured_only.then_some(true),
            active: Some(true),
            available_toppings_only: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeInput {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub price_add: Option<i32>,
    pub is_default: Option<bool>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub order: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToppingInput {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub price: Option<i32>,
    pub is_available: Option<bool>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub order: Option<i32>,
}

/// A size row to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSize {
    pub name: String,
    pub price_add: i32,
    pub is_default: bool,
    pub order: i32,
}

/// A topping row to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTopping {
    pub name: String,
    pub price: i32,
    pub is_available: bool,
    pub order: i32,
}

/// Product form body, used for both create and partial update.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub price: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub image: Option<Option<String>>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub category_id: Option<i32>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub is_new: Option<bool>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub order: Option<i32>,
    #[serde(default, deserialize_with = "patch_i32")]
    pub calories: Option<Option<i32>>,
    pub tags: Option<Vec<String>>,
    pub sizes: Option<Vec<SizeInput>>,
    pub toppings: Option<Vec<ToppingInput>>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub price: i32,
    pub image: Option<String>,
    pub category_id: CategoryId,
    pub is_active: bool,
    pub is_featured: bool,
    pub is_new: bool,
    pub order: i32,
    pub calories: Option<i32>,
    pub tags: Vec<String>,
    pub sizes: Vec<NewSize>,
    pub toppings: Vec<NewTopping>,
}

/// Fields to change; `None` keeps the stored value. `sizes`/`toppings`
/// replace the whole list when present.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub slug: Option<Slug>,
    pub description: Option<Option<String>>,
    pub price: Option<i32>,
    pub image: Option<Option<String>>,
    pub category_id: Option<CategoryId>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub is_new: Option<bool>,
    pub order: Option<i32>,
    pub calories: Option<Option<i32>>,
    pub tags: Option<Vec<String>>,
    pub sizes: Option<Vec<NewSize>>,
    pub toppings: Option<Vec<NewTopping>>,
}

impl ProductInput {
    /// Validate a create request.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when name, slug, price or category is
    /// missing, or when any nested value is invalid.
    pub fn into_new(self) -> Result<NewProduct, ValidationError> {
        const MISSING: &str = "名稱、slug、價格和分類為必填";
        let name = required(self.name, MISSING)?;
        let slug = parse_slug(&required(self.slug, MISSING)?)?;
        let price = check_price(self.price.ok_or_else(|| ValidationError::new(MISSING))?)?;
        let category_id = self
            .category_id
            .map(CategoryId::new)
            .ok_or_else(|| ValidationError::new(MISSING))?;

        Ok(NewProduct {
            name,
            slug,
            description: clearable(self.description).flatten(),
            price,
            image: clearable(self.image).flatten(),
            category_id,
            is_active: self.is_active.unwrap_or(true),
            is_featured: self.is_featured.unwrap_or(false),
            is_new: self.is_new.unwrap_or(false),
            order: self.order.unwrap_or(0),
            calories: self.calories.flatten(),
            tags: clean_list(self.tags.unwrap_or_default()),
            sizes: sizes(self.sizes.unwrap_or_default())?,
            toppings: toppings(self.toppings.unwrap_or_default())?,
        })
    }

    /// Validate an update request.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for a malformed slug, a negative price, or
    /// an invalid nested size/topping.
    pub fn into_changes(self) -> Result<ProductChanges, ValidationError> {
        Ok(ProductChanges {
            name: non_blank(self.name),
            slug: non_blank(self.slug).as_deref().map(parse_slug).transpose()?,
            description: clearable(self.description),
            price: self.price.map(check_price).transpose()?,
            image: clearable(self.image),
            category_id: self.category_id.map(CategoryId::new),
            is_active: self.is_active,
            is_featured: self.is_featured,
            is_new: self.is_new,
            order: self.order,
            calories: self.calories,
            tags: self.tags.map(clean_list),
            sizes: self.sizes.map(sizes).transpose()?,
            toppings: self.toppings.map(toppings).transpose()?,
        })
    }
}

fn check_price(price: i32) -> Result<i32, ValidationError> {
    if price < 0 {
        return Err(ValidationError::new("價格不能為負數"));
    }
    Ok(price)
}

/// Nested rows default their `order` to their position in the list.
fn default_order(order: Option<i32>, index: usize) -> i32 {
    order.unwrap_or_else(|| i32::try_from(index).unwrap_or(i32::MAX))
}

fn sizes(inputs: Vec<SizeInput>) -> Result<Vec<NewSize>, ValidationError> {
    inputs
        .into_iter()
        .enumerate()
        .map(|(index, size)| {
            Ok(NewSize {
                name: required(size.name, "尺寸名稱為必填")?,
                price_add: size.price_add.unwrap_or(0),
                is_default: size.is_default.unwrap_or(false),
                order: default_order(size.order, index),
            })
        })
        .collect()
}

fn toppings(inputs: Vec<ToppingInput>) -> Result<Vec<NewTopping>, ValidationError> {
    inputs
        .into_iter()
        .enumerate()
        .map(|(index, topping)| {
            Ok(NewTopping {
                name: required(topping.name, "加料名稱為必填")?,
                price: check_price(topping.price.unwrap_or(0))?,
                is_available: topping.is_available.unwrap_or(true),
                order: default_order(topping.order, index),
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(json: &str) -> ProductInput {
        serde_json::from_str(json).unwrap()
    }

    const MINIMAL: &str = r#"{"name": "珍珠奶茶", "slug": "pearl-milk-tea", "price": "65", "categoryId": 1}"#;

    #[test]
    fn test_create_requires_core_fields() {
        assert!(input(r#"{"name": "珍珠奶茶", "slug": "pearl-milk-tea", "price": 65}"#).into_new().is_err());
        assert!(input(r#"{"name": "珍珠奶茶", "slug": "pearl-milk-tea", "categoryId": 1}"#).into_new().is_err());
        assert!(input(MINIMAL).into_new().is_ok());
    }

    #[test]
    fn test_create_allows_free_product_but_not_negative() {
        let free = input(r#"{"name": "冰水", "slug": "water", "price": 0, "categoryId": 1}"#);
        assert_eq!(free.into_new().unwrap().price, 0);

        let negative = input(r#"{"name": "冰水", "slug": "water", "price": -5, "categoryId": 1}"#);
        assert!(negative.into_new().is_err());
    }

    #[test]
    fn test_create_defaults() {
        let new = input(MINIMAL).into_new().unwrap();
        assert!(new.is_active);
        assert!(!new.is_featured);
        assert!(!new.is_new);
        assert_eq!(new.order, 0);
        assert!(new.tags.is_empty());
        assert!(new.sizes.is_empty());
        assert_eq!(new.category_id, CategoryId::new(1));
    }

    #[test]
    fn test_nested_rows_default_order_to_index() {
        let new = input(
            r#"{"name": "珍珠奶茶", "slug": "pearl-milk-tea", "price": 65, "categoryId": 1,
                "sizes": [{"name": "中杯"}, {"name": "大杯", "priceAdd": 10, "order": 7}],
                "toppings": [{"name": "珍珠", "price": "10"}, {"name": "椰果", "isAvailable": false}]}"#,
        )
        .into_new()
        .unwrap();

        assert_eq!(new.sizes[0].order, 0);
        assert_eq!(new.sizes[0].price_add, 0);
        assert!(!new.sizes[0].is_default);
        assert_eq!(new.sizes[1].order, 7);
        assert_eq!(new.sizes[1].price_add, 10);

        assert_eq!(new.toppings[0].price, 10);
        assert!(new.toppings[0].is_available);
        assert_eq!(new.toppings[1].order, 1);
        assert!(!new.toppings[1].is_available);
    }

    #[test]
    fn test_nested_rows_require_name() {
        let result = input(
            r#"{"name": "珍珠奶茶", "slug": "pearl-milk-tea", "price": 65, "categoryId": 1,
                "sizes": [{"priceAdd": 5}]}"#,
        )
        .into_new();
        assert!(result.is_err());
    }

    #[test]
    fn test_update_distinguishes_absent_and_empty_lists() {
        let untouched = input(r#"{"price": 70}"#).into_changes().unwrap();
        assert!(untouched.sizes.is_none());
        assert!(untouched.toppings.is_none());
        assert_eq!(untouched.price, Some(70));

        let cleared = input(r#"{"sizes": [], "toppings": []}"#).into_changes().unwrap();
        assert_eq!(cleared.sizes, Some(vec![]));
        assert_eq!(cleared.toppings, Some(vec![]));
    }

    #[test]
    fn test_update_clears_optional_fields() {
        let changes = input(r#"{"image": "", "calories": null, "name": ""}"#)
            .into_changes()
            .unwrap();
        assert_eq!(changes.image, Some(None));
        assert_eq!(changes.calories, Some(None));
        assert!(changes.name.is_none());
        assert!(changes.description.is_none());
    }

    #[test]
    fn test_public_filter() {
        let filter = ProductFilter::public(Some("milk-tea".into()), false);
        assert_eq!(filter.active, Some(true));
        assert_eq!(filter.featured, None);
        assert!(filter.available_toppings_only);

        assert_eq!(ProductFilter::public(None, true).featured, Some(true));
    }
}
