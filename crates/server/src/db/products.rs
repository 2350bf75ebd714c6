//! Product repository.
//!
//! Products are always returned with their category summary and their size
//! and topping rows. Writing a product and its option rows happens in one
//! transaction; option lists are replaced wholesale rather than diffed.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use teainn_core::{CategoryId, ProductId, ProductSizeId, ProductToppingId};

use super::{RepositoryError, stored_slug};
use crate::models::input::split_patch;
use crate::models::{
    CategoryRef, NewProduct, NewSize, NewTopping, Product, ProductChanges, ProductFilter,
    ProductSize, ProductTopping,
};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    slug: String,
    description: Option<String>,
    price: i32,
    image: Option<String>,
    category_id: i32,
    category_name: String,
    category_slug: String,
    is_active: bool,
    is_featured: bool,
    is_new: bool,
    sort_order: i32,
    calories: Option<i32>,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct SizeRow {
    id: i32,
    product_id: i32,
    name: String,
    price_add: i32,
    is_default: bool,
    sort_order: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct ToppingRow {
    id: i32,
    product_id: i32,
    name: String,
    price: i32,
    is_available: bool,
    sort_order: i32,
}

impl From<SizeRow> for ProductSize {
    fn from(row: SizeRow) -> Self {
        Self {
            id: ProductSizeId::new(row.id),
            name: row.name,
            price_add: row.price_add,
            is_default: row.is_default,
            order: row.sort_order,
        }
    }
}

impl From<ToppingRow> for ProductTopping {
    fn from(row: ToppingRow) -> Self {
        Self {
            id: ProductToppingId::new(row.id),
            name: row.name,
            price: row.price,
            is_available: row.is_available,
            order: row.sort_order,
        }
    }
}

impl ProductRow {
    fn into_product(
        self,
        sizes: Vec<ProductSize>,
        toppings: Vec<ProductTopping>,
    ) -> Result<Product, RepositoryError> {
        let category_id = CategoryId::new(self.category_id);
        Ok(Product {
            id: ProductId::new(self.id),
            name: self.name,
            slug: stored_slug(self.slug)?,
            description: self.description,
            price: self.price,
            image: self.image,
            category_id,
            category: CategoryRef {
                id: category_id,
                name: self.category_name,
                slug: stored_slug(self.category_slug)?,
            },
            is_active: self.is_active,
            is_featured: self.is_featured,
            is_new: self.is_new,
            order: self.sort_order,
            calories: self.calories,
            tags: self.tags,
            sizes,
            toppings,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_PRODUCTS: &str = r"
    SELECT p.id, p.name, p.slug, p.description, p.price, p.image, p.category_id,
           c.name AS category_name, c.slug AS category_slug,
           p.is_active, p.is_featured, p.is_new, p.sort_order, p.calories, p.tags,
           p.created_at, p.updated_at
    FROM products p
    JOIN categories c ON c.id = p.category_id
";

const SLUG_TAKEN: &str = "slug 已被使用";
const UNKNOWN_CATEGORY: &str = "分類不存在";

// =============================================================================
// Repository
// =============================================================================

pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products matching `filter`, by display order then newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"{SELECT_PRODUCTS}
            WHERE ($1::TEXT IS NULL OR c.slug = $1)
              AND ($2::INTEGER IS NULL OR p.category_id = $2)
              AND ($3::BOOLEAN IS NULL OR p.is_featured = $3)
              AND ($4::BOOLEAN IS NULL OR p.is_active = $4)
            ORDER BY p.sort_order ASC, p.created_at DESC
            "
        ))
        .bind(filter.category_slug.as_deref())
        .bind(filter.category_id)
        .bind(filter.featured)
        .bind(filter.active)
        .fetch_all(self.pool)
        .await?;

        self.attach_options(rows, filter.available_toppings_only)
            .await
    }

    /// Get a product by ID with all of its options.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("{SELECT_PRODUCTS} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut products = self.attach_options(vec![row], false).await?;
        Ok(products.pop())
    }

    /// Create a product together with its sizes and toppings.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    /// Returns `RepositoryError::InvalidReference` if the category does not exist.
    pub async fn create(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO products (
                name, slug, description, price, image, category_id,
                is_active, is_featured, is_new, sort_order, calories, tags
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            ",
        )
        .bind(&new.name)
        .bind(new.slug.as_str())
        .bind(&new.description)
        .bind(new.price)
        .bind(&new.image)
        .bind(new.category_id)
        .bind(new.is_active)
        .bind(new.is_featured)
        .bind(new.is_new)
        .bind(new.order)
        .bind(new.calories)
        .bind(&new.tags)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_write(e, SLUG_TAKEN, UNKNOWN_CATEGORY))?;

        insert_sizes(&mut tx, id, &new.sizes).await?;
        insert_toppings(&mut tx, id, &new.toppings).await?;
        tx.commit().await?;

        self.get(ProductId::new(id))
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Apply a partial update. Size and topping lists that are present in
    /// `changes` replace the stored rows in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Conflict` if the new slug is taken.
    /// Returns `RepositoryError::InvalidReference` if the new category does not exist.
    pub async fn update(
        &self,
        id: ProductId,
        changes: ProductChanges,
    ) -> Result<Product, RepositoryError> {
        let (set_description, description) = split_patch(changes.description);
        let (set_image, image) = split_patch(changes.image);
        let (set_calories, calories) = split_patch(changes.calories);

        let mut tx = self.pool.begin().await?;

        let updated: Option<i32> = sqlx::query_scalar(
            r"
            UPDATE products SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                description = CASE WHEN $4 THEN $5 ELSE description END,
                price = COALESCE($6, price),
                image = CASE WHEN $7 THEN $8 ELSE image END,
                category_id = COALESCE($9, category_id),
                is_active = COALESCE($10, is_active),
                is_featured = COALESCE($11, is_featured),
                is_new = COALESCE($12, is_new),
                sort_order = COALESCE($13, sort_order),
                calories = CASE WHEN $14 THEN $15 ELSE calories END,
                tags = COALESCE($16, tags),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id
            ",
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.slug.map(String::from))
        .bind(set_description)
        .bind(description)
        .bind(changes.price)
        .bind(set_image)
        .bind(image)
        .bind(changes.category_id)
        .bind(changes.is_active)
        .bind(changes.is_featured)
        .bind(changes.is_new)
        .bind(changes.order)
        .bind(set_calories)
        .bind(calories)
        .bind(changes.tags)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_write(e, SLUG_TAKEN, UNKNOWN_CATEGORY))?;

        let Some(product_id) = updated else {
            return Err(RepositoryError::NotFound);
        };

        if let Some(sizes) = &changes.sizes {
            sqlx::query("DELETE FROM product_sizes WHERE product_id = $1")
                .bind(product_id)
                .execute(&mut *tx)
                .await?;
            insert_sizes(&mut tx, product_id, sizes).await?;
        }
        if let Some(toppings) = &changes.toppings {
            sqlx::query("DELETE FROM product_toppings WHERE product_id = $1")
                .bind(product_id)
                .execute(&mut *tx)
                .await?;
            insert_toppings(&mut tx, product_id, toppings).await?;
        }

        tx.commit().await?;

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete a product and (by cascade) its options.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Load sizes and toppings for `rows` in two queries and assemble products.
    async fn attach_options(
        &self,
        rows: Vec<ProductRow>,
        available_toppings_only: bool,
    ) -> Result<Vec<Product>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();

        let size_rows = sqlx::query_as::<_, SizeRow>(
            r"
            SELECT id, product_id, name, price_add, is_default, sort_order
            FROM product_sizes
            WHERE product_id = ANY($1)
            ORDER BY sort_order ASC, id ASC
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let topping_rows = sqlx::query_as::<_, ToppingRow>(
            r"
            SELECT id, product_id, name, price, is_available, sort_order
            FROM product_toppings
            WHERE product_id = ANY($1) AND (NOT $2 OR is_available)
            ORDER BY sort_order ASC, id ASC
            ",
        )
        .bind(&ids)
        .bind(available_toppings_only)
        .fetch_all(self.pool)
        .await?;

        let mut sizes: HashMap<i32, Vec<ProductSize>> = HashMap::new();
        for row in size_rows {
            sizes.entry(row.product_id).or_default().push(row.into());
        }
        let mut toppings: HashMap<i32, Vec<ProductTopping>> = HashMap::new();
        for row in topping_rows {
            toppings.entry(row.product_id).or_default().push(row.into());
        }

        rows.into_iter()
            .map(|row| {
                let id = row.id;
                row.into_product(
                    sizes.remove(&id).unwrap_or_default(),
                    toppings.remove(&id).unwrap_or_default(),
                )
            })
            .collect()
    }
}

async fn insert_sizes(
    conn: &mut PgConnection,
    product_id: i32,
    sizes: &[NewSize],
) -> Result<(), RepositoryError> {
    if sizes.is_empty() {
        return Ok(());
    }
    let names: Vec<&str> = sizes.iter().map(|s| s.name.as_str()).collect();
    let price_adds: Vec<i32> = sizes.iter().map(|s| s.price_add).collect();
    let defaults: Vec<bool> = sizes.iter().map(|s| s.is_default).collect();
    let orders: Vec<i32> = sizes.iter().map(|s| s.order).collect();

    sqlx::query(
        r"
        INSERT INTO product_sizes (product_id, name, price_add, is_default, sort_order)
        SELECT $1, * FROM UNNEST($2::TEXT[], $3::INTEGER[], $4::BOOLEAN[], $5::INTEGER[])
        ",
    )
    .bind(product_id)
    .bind(&names)
    .bind(&price_adds)
    .bind(&defaults)
    .bind(&orders)
    .execute(conn)
    .await?;

    Ok(())
}

async fn insert_toppings(
    conn: &mut PgConnection,
    product_id: i32,
    toppings: &[NewTopping],
) -> Result<(), RepositoryError> {
    if toppings.is_empty() {
        return Ok(());
    }
    let names: Vec<&str> = toppings.iter().map(|t| t.name.as_str()).collect();
    let prices: Vec<i32> = toppings.iter().map(|t| t.price).collect();
    let available: Vec<bool> = toppings.iter().map(|t| t.is_available).collect();
    let orders: Vec<i32> = toppings.iter().map(|t| t.order).collect();

    sqlx::query(
        r"
        INSERT INTO product_toppings (product_id, name, price, is_available, sort_order)
        SELECT $1, * FROM UNNEST($2::TEXT[], $3::INTEGER[], $4::BOOLEAN[], $5::INTEGER[])
        ",
    )
    .bind(product_id)
    .bind(&names)
    .bind(&prices)
    .bind(&available)
    .bind(&orders)
    .execute(conn)
    .await?;

    Ok(())
}
