//! Seed the database with the demo catalog and page content.
//!
//! Data comes from a YAML file whose entries use the same field names as the
//! admin API bodies and go through the same validation. Without `--file` the
//! bundled `seed/demo.yaml` is used.
//!
//! Every row is upserted, so running the command twice leaves one copy:
//! categories, products, stores and events by slug, franchise plans by the
//! slug derived from their name, promotions by title, content blocks and
//! settings by key. A product's sizes and toppings are replaced wholesale.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value as JsonValue;
use sqlx::{PgConnection, PgPool};
use thiserror::Error;
use tracing::{error, info};

use teainn_core::content::{
    AboutContent, ContactContent, FooterContent, FranchiseContent, HeroContent, keys,
};
use teainn_core::{CategoryId, Slug};
use teainn_server::db::{ContentBlockRepository, SettingsRepository};
use teainn_server::models::{
    CategoryInput, EventInput, FranchisePlanFields, FranchisePlanInput, NewCategory, NewEvent,
    NewProduct, NewPromotion, NewStore, ProductInput, PromotionInput, StoreInput,
};

use super::ConnectError;

const BUNDLED_SEED: &str = include_str!("../../seed/demo.yaml");

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read {0}: {1}")]
    Read(String, std::io::Error),

    #[error("Invalid seed file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("{0} validation errors found")]
    Invalid(usize),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database error: {0}")]
    Repository(#[from] teainn_server::db::RepositoryError),
}

// =============================================================================
// File format
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SeedFile {
    categories: Vec<SeedCategory>,
    stores: Vec<StoreInput>,
    events: Vec<EventInput>,
    promotions: Vec<PromotionInput>,
    franchise_plans: Vec<FranchisePlanInput>,
    settings: BTreeMap<String, String>,
    content: BTreeMap<String, JsonValue>,
}

/// A category with the products filed under it.
#[derive(Debug, Deserialize)]
struct SeedCategory {
    #[serde(flatten)]
    category: CategoryInput,
    #[serde(default)]
    products: Vec<ProductInput>,
}

// =============================================================================
// Validated data
// =============================================================================

#[derive(Debug, Default)]
struct SeedPlan {
    categories: Vec<(NewCategory, Vec<NewProduct>)>,
    stores: Vec<NewStore>,
    events: Vec<NewEvent>,
    promotions: Vec<NewPromotion>,
    franchise_plans: Vec<(Slug, FranchisePlanFields)>,
    settings: BTreeMap<String, String>,
    content: BTreeMap<String, JsonValue>,
}

impl SeedPlan {
    /// Validate every entry, collecting all problems instead of stopping at
    /// the first.
    fn build(file: SeedFile) -> Result<Self, Vec<String>> {
        let mut errors = Vec::new();
        let mut plan = Self {
            settings: file.settings,
            ..Self::default()
        };

        for (i, seed) in file.categories.into_iter().enumerate() {
            let category = match seed.category.into_new() {
                Ok(category) => category,
                Err(e) => {
                    errors.push(format!("categories[{i}]: {e}"));
                    continue;
                }
            };

            let mut products = Vec::with_capacity(seed.products.len());
            for (j, mut product) in seed.products.into_iter().enumerate() {
                // Replaced with the real id once the category row exists.
                product.category_id = Some(0);
                match product.into_new() {
                    Ok(product) => products.push(product),
                    Err(e) => errors.push(format!("categories[{i}].products[{j}]: {e}")),
                }
            }
            plan.categories.push((category, products));
        }

        collect(file.stores, "stores", StoreInput::into_new, &mut plan.stores, &mut errors);
        collect(file.events, "events", EventInput::into_new, &mut plan.events, &mut errors);
        collect(
            file.promotions,
            "promotions",
            PromotionInput::into_new,
            &mut plan.promotions,
            &mut errors,
        );

        for (i, input) in file.franchise_plans.into_iter().enumerate() {
            let plan_with_slug = input.into_fields().and_then(|fields| {
                let slug = fields.derive_slug()?;
                Ok((slug, fields))
            });
            match plan_with_slug {
                Ok(entry) => plan.franchise_plans.push(entry),
                Err(e) => errors.push(format!("franchisePlans[{i}]: {e}")),
            }
        }

        for (key, payload) in file.content {
            if let Err(e) = check_content(&key, &payload) {
                errors.push(format!("content.{key}: {e}"));
                continue;
            }
            plan.content.insert(key, payload);
        }

        if errors.is_empty() {
            Ok(plan)
        } else {
            Err(errors)
        }
    }
}

fn collect<I, T, E: std::fmt::Display>(
    inputs: Vec<I>,
    section: &str,
    validate: impl Fn(I) -> Result<T, E>,
    out: &mut Vec<T>,
    errors: &mut Vec<String>,
) {
    for (i, input) in inputs.into_iter().enumerate() {
        match validate(input) {
            Ok(item) => out.push(item),
            Err(e) => errors.push(format!("{section}[{i}]: {e}")),
        }
    }
}

/// Payloads of the well-known blocks must fit the shape the site reads.
/// Other keys are stored as-is.
fn check_content(key: &str, payload: &JsonValue) -> Result<(), serde_json::Error> {
    let payload = payload.clone();
    match key {
        keys::HERO => serde_json::from_value::<HeroContent>(payload).map(drop),
        keys::ABOUT => serde_json::from_value::<AboutContent>(payload).map(drop),
        keys::CONTACT => serde_json::from_value::<ContactContent>(payload).map(drop),
        keys::FOOTER => serde_json::from_value::<FooterContent>(payload).map(drop),
        keys::FRANCHISE => serde_json::from_value::<FranchiseContent>(payload).map(drop),
        _ => Ok(()),
    }
}

// =============================================================================
// Command
// =============================================================================

/// Load seed data into the database.
///
/// # Arguments
///
/// * `file_path` - YAML file to load; the bundled demo data when `None`
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails validation, or if a
/// database write fails. Validation runs before connecting.
pub async fn run(file_path: Option<&Path>) -> Result<(), SeedError> {
    let content = match file_path {
        Some(path) => {
            info!(path = %path.display(), "Loading seed data from file");
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| SeedError::Read(path.display().to_string(), e))?
        }
        None => {
            info!("Loading bundled demo data");
            BUNDLED_SEED.to_owned()
        }
    };

    let plan = parse(&content)?;

    let pool = super::connect().await?;
    apply(&pool, &plan).await
}

fn parse(content: &str) -> Result<SeedPlan, SeedError> {
    let file: SeedFile = serde_yaml::from_str(content)?;

    SeedPlan::build(file).map_err(|errors| {
        error!("Seed data validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        SeedError::Invalid(errors.len())
    })
}

async fn apply(pool: &PgPool, plan: &SeedPlan) -> Result<(), SeedError> {
    let mut tx = pool.begin().await?;

    let mut product_count = 0;
    for (category, products) in &plan.categories {
        let category_id = upsert_category(&mut tx, category).await?;
        for product in products {
            upsert_product(&mut tx, category_id, product).await?;
            product_count += 1;
        }
    }
    info!(
        categories = plan.categories.len(),
        products = product_count,
        "Catalog seeded"
    );

    for store in &plan.stores {
        upsert_store(&mut tx, store).await?;
    }
    for event in &plan.events {
        upsert_event(&mut tx, event).await?;
    }
    for promotion in &plan.promotions {
        upsert_promotion(&mut tx, promotion).await?;
    }
    for (slug, fields) in &plan.franchise_plans {
        upsert_franchise_plan(&mut tx, slug, fields).await?;
    }
    info!(
        stores = plan.stores.len(),
        events = plan.events.len(),
        promotions = plan.promotions.len(),
        franchise_plans = plan.franchise_plans.len(),
        "Marketing records seeded"
    );

    tx.commit().await?;

    SettingsRepository::new(pool)
        .upsert_many(&plan.settings)
        .await?;
    let blocks = ContentBlockRepository::new(pool);
    for (key, payload) in &plan.content {
        blocks.upsert(key, payload).await?;
    }
    info!(
        settings = plan.settings.len(),
        content_blocks = plan.content.len(),
        "Site content seeded"
    );

    info!("Seeding completed!");
    Ok(())
}

// =============================================================================
// Upserts
// =============================================================================

async fn upsert_category(
    conn: &mut PgConnection,
    category: &NewCategory,
) -> Result<CategoryId, sqlx::Error> {
    let id: i32 = sqlx::query_scalar(
        r"
        INSERT INTO categories (name, slug, description, sort_order, is_active)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (slug) DO UPDATE SET
            name = EXCLUDED.name,
            description = EXCLUDED.description,
            sort_order = EXCLUDED.sort_order,
            is_active = EXCLUDED.is_active,
            updated_at = NOW()
        RETURNING id
        ",
    )
    .bind(&category.name)
    .bind(category.slug.as_str())
    .bind(category.description.as_deref())
    .bind(category.order)
    .bind(category.is_active)
    .fetch_one(conn)
    .await?;

    Ok(CategoryId::new(id))
}

async fn upsert_product(
    conn: &mut PgConnection,
    category_id: CategoryId,
    product: &NewProduct,
) -> Result<(), sqlx::Error> {
    let product_id: i32 = sqlx::query_scalar(
        r"
        INSERT INTO products (
            name, slug, description, price, image, category_id,
            is_active, is_featured, is_new, sort_order, calories, tags
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ON CONFLICT (slug) DO UPDATE SET
            name = EXCLUDED.name,
            description = EXCLUDED.description,
            price = EXCLUDED.price,
            image = EXCLUDED.image,
            category_id = EXCLUDED.category_id,
            is_active = EXCLUDED.is_active,
            is_featured = EXCLUDED.is_featured,
            is_new = EXCLUDED.is_new,
            sort_order = EXCLUDED.sort_order,
            calories = EXCLUDED.calories,
            tags = EXCLUDED.tags,
            updated_at = NOW()
        RETURNING id
        ",
    )
    .bind(&product.name)
    .bind(product.slug.as_str())
    .bind(product.description.as_deref())
    .bind(product.price)
    .bind(product.image.as_deref())
    .bind(category_id.as_i32())
    .bind(product.is_active)
    .bind(product.is_featured)
    .bind(product.is_new)
    .bind(product.order)
    .bind(product.calories)
    .bind(&product.tags)
    .fetch_one(&mut *conn)
    .await?;

    sqlx::query("DELETE FROM product_sizes WHERE product_id = $1")
        .bind(product_id)
        .execute(&mut *conn)
        .await?;
    for size in &product.sizes {
        sqlx::query(
            r"
            INSERT INTO product_sizes (product_id, name, price_add, is_default, sort_order)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(product_id)
        .bind(&size.name)
        .bind(size.price_add)
        .bind(size.is_default)
        .bind(size.order)
        .execute(&mut *conn)
        .await?;
    }

    sqlx::query("DELETE FROM product_toppings WHERE product_id = $1")
        .bind(product_id)
        .execute(&mut *conn)
        .await?;
    for topping in &product.toppings {
        sqlx::query(
            r"
            INSERT INTO product_toppings (product_id, name, price, is_available, sort_order)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(product_id)
        .bind(&topping.name)
        .bind(topping.price)
        .bind(topping.is_available)
        .bind(topping.order)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

async fn upsert_store(conn: &mut PgConnection, store: &NewStore) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        INSERT INTO stores (
            name, slug, address, phone, opening_hours, image,
            features, map_url, order_url, is_active, sort_order
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (slug) DO UPDATE SET
            name = EXCLUDED.name,
            address = EXCLUDED.address,
            phone = EXCLUDED.phone,
            opening_hours = EXCLUDED.opening_hours,
            image = EXCLUDED.image,
            features = EXCLUDED.features,
            map_url = EXCLUDED.map_url,
            order_url = EXCLUDED.order_url,
            is_active = EXCLUDED.is_active,
            sort_order = EXCLUDED.sort_order,
            updated_at = NOW()
        ",
    )
    .bind(&store.name)
    .bind(store.slug.as_str())
    .bind(&store.address)
    .bind(store.phone.as_deref())
    .bind(&store.opening_hours)
    .bind(store.image.as_deref())
    .bind(&store.features)
    .bind(store.map_url.as_deref())
    .bind(store.order_url.as_deref())
    .bind(store.is_active)
    .bind(store.order)
    .execute(conn)
    .await?;

    Ok(())
}

async fn upsert_event(conn: &mut PgConnection, event: &NewEvent) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        INSERT INTO events (
            title, slug, subtitle, description, image, category,
            start_date, end_date, is_active, is_featured, sort_order
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (slug) DO UPDATE SET
            title = EXCLUDED.title,
            subtitle = EXCLUDED.subtitle,
            description = EXCLUDED.description,
            image = EXCLUDED.image,
            category = EXCLUDED.category,
            start_date = EXCLUDED.start_date,
            end_date = EXCLUDED.end_date,
            is_active = EXCLUDED.is_active,
            is_featured = EXCLUDED.is_featured,
            sort_order = EXCLUDED.sort_order,
            updated_at = NOW()
        ",
    )
    .bind(&event.title)
    .bind(event.slug.as_str())
    .bind(event.subtitle.as_deref())
    .bind(event.description.as_deref())
    .bind(event.image.as_deref())
    .bind(event.category.as_deref())
    .bind(event.start_date)
    .bind(event.end_date)
    .bind(event.is_active)
    .bind(event.is_featured)
    .bind(event.order)
    .execute(conn)
    .await?;

    Ok(())
}

/// Promotions have no natural key; the title stands in for one.
async fn upsert_promotion(
    conn: &mut PgConnection,
    promotion: &NewPromotion,
) -> Result<(), sqlx::Error> {
    let updated = sqlx::query(
        r"
        UPDATE promotions SET
            description = $2,
            icon = $3,
            link = $4,
            is_active = $5,
            sort_order = $6,
            updated_at = NOW()
        WHERE title = $1
        ",
    )
    .bind(&promotion.title)
    .bind(promotion.description.as_deref())
    .bind(promotion.icon.as_deref())
    .bind(promotion.link.as_deref())
    .bind(promotion.is_active)
    .bind(promotion.order)
    .execute(&mut *conn)
    .await?;

    if updated.rows_affected() == 0 {
        sqlx::query(
            r"
            INSERT INTO promotions (title, description, icon, link, is_active, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(&promotion.title)
        .bind(promotion.description.as_deref())
        .bind(promotion.icon.as_deref())
        .bind(promotion.link.as_deref())
        .bind(promotion.is_active)
        .bind(promotion.order)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

async fn upsert_franchise_plan(
    conn: &mut PgConnection,
    slug: &Slug,
    plan: &FranchisePlanFields,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        INSERT INTO franchise_plans (
            name, slug, description, image, investment, area,
            features, includes, is_popular, is_active, sort_order
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (slug) DO UPDATE SET
            name = EXCLUDED.name,
            description = EXCLUDED.description,
            image = EXCLUDED.image,
            investment = EXCLUDED.investment,
            area = EXCLUDED.area,
            features = EXCLUDED.features,
            includes = EXCLUDED.includes,
            is_popular = EXCLUDED.is_popular,
            is_active = EXCLUDED.is_active,
            sort_order = EXCLUDED.sort_order,
            updated_at = NOW()
        ",
    )
    .bind(&plan.name)
    .bind(slug.as_str())
    .bind(plan.description.as_deref())
    .bind(plan.image.as_deref())
    .bind(&plan.investment)
    .bind(plan.area.as_deref())
    .bind(&plan.features)
    .bind(&plan.includes)
    .bind(plan.is_popular)
    .bind(plan.is_active)
    .bind(plan.order)
    .execute(conn)
    .await?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_demo_data_is_valid() {
        let plan = parse(BUNDLED_SEED).unwrap();

        assert_eq!(plan.categories.len(), 4);
        assert_eq!(plan.stores.len(), 3);
        assert_eq!(plan.events.len(), 3);
        assert_eq!(plan.promotions.len(), 3);
        assert_eq!(plan.franchise_plans.len(), 2);
        assert_eq!(
            plan.settings.get("email").map(String::as_str),
            Some("hello@teainn.tw")
        );
        for key in [keys::HERO, keys::ABOUT, keys::CONTACT, keys::FOOTER, keys::FRANCHISE] {
            assert!(plan.content.contains_key(key), "missing content block {key}");
        }
    }

    #[test]
    fn test_products_nest_under_categories() {
        let plan = parse(
            r"
categories:
  - name: 經典
    slug: classic
    products:
      - name: 黑糖珍珠鮮奶
        slug: brown-sugar-pearl-milk
        price: '75'
        sizes:
          - { name: 中杯, isDefault: true }
          - { name: 大杯, priceAdd: 15 }
",
        )
        .unwrap();

        let (category, products) = &plan.categories[0];
        assert_eq!(category.slug.as_str(), "classic");
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].price, 75);
        assert_eq!(products[0].sizes.len(), 2);
        assert_eq!(products[0].sizes[1].price_add, 15);
    }

    #[test]
    fn test_franchise_plan_slug_comes_from_name() {
        let plan = parse(
            r"
franchisePlans:
  - name: Standard Plan
    investment: NT$ 250 萬
",
        )
        .unwrap();

        assert_eq!(plan.franchise_plans[0].0.as_str(), "standard-plan");
    }

    #[test]
    fn test_collects_every_validation_error() {
        let file: SeedFile = serde_yaml::from_str(
            r"
categories:
  - name: 缺少 slug
    products: []
  - name: 經典
    slug: classic
    products:
      - name: 沒有價格
        slug: no-price
stores:
  - name: 門市
promotions:
  - description: 沒有標題
",
        )
        .unwrap();

        let errors = SeedPlan::build(file).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors[0].starts_with("categories[0]:"));
        assert!(errors[1].starts_with("categories[1].products[0]:"));
        assert!(errors[2].starts_with("stores[0]:"));
        assert!(errors[3].starts_with("promotions[0]:"));
    }

    #[test]
    fn test_known_content_block_must_match_shape() {
        let bad = serde_json::json!({ "stats": "not a list" });
        assert!(check_content(keys::ABOUT, &bad).is_err());
        assert!(check_content("custom-banner", &bad).is_ok());
        assert!(check_content(keys::HERO, &serde_json::json!({ "title": "茶客棧" })).is_ok());
    }

    #[test]
    fn test_empty_file_is_an_empty_plan() {
        let plan = parse("{}").unwrap();
        assert!(plan.categories.is_empty());
        assert!(plan.settings.is_empty());
    }
}
