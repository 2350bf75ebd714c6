//! Franchise plan repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use teainn_core::{FranchisePlanId, Slug};

use super::{RepositoryError, stored_slug};
use crate::models::{FranchisePlan, FranchisePlanFields};

#[derive(Debug, sqlx::FromRow)]
struct FranchisePlanRow {
    id: i32,
    name: String,
    slug: String,
    description: Option<String>,
    image: Option<String>,
    investment: String,
    area: Option<String>,
    features: Vec<String>,
    includes: Vec<String>,
    is_popular: bool,
    is_active: bool,
    sort_order: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<FranchisePlanRow> for FranchisePlan {
    type Error = RepositoryError;

    fn try_from(row: FranchisePlanRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: FranchisePlanId::new(row.id),
            name: row.name,
            slug: stored_slug(row.slug)?,
            description: row.description,
            image: row.image,
            investment: row.investment,
            area: row.area,
            features: row.features,
            includes: row.includes,
            is_popular: row.is_popular,
            is_active: row.is_active,
            order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const COLUMNS: &str = "id, name, slug, description, image, investment, area, features, \
                       includes, is_popular, is_active, sort_order, created_at, updated_at";

pub struct FranchisePlanRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FranchisePlanRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, active_only: bool) -> Result<Vec<FranchisePlan>, RepositoryError> {
        let rows = sqlx::query_as::<_, FranchisePlanRow>(&format!(
            "SELECT {COLUMNS} FROM franchise_plans WHERE (NOT $1 OR is_active) \
             ORDER BY sort_order ASC, id ASC"
        ))
        .bind(active_only)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: FranchisePlanId) -> Result<Option<FranchisePlan>, RepositoryError> {
        let row = sqlx::query_as::<_, FranchisePlanRow>(&format!(
            "SELECT {COLUMNS} FROM franchise_plans WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if another plan already derived
    /// the same slug.
    pub async fn create(
        &self,
        slug: &Slug,
        plan: &FranchisePlanFields,
    ) -> Result<FranchisePlan, RepositoryError> {
        let row = sqlx::query_as::<_, FranchisePlanRow>(&format!(
            r"
            INSERT INTO franchise_plans (
                name, slug, description, image, investment, area,
                features, includes, is_popular, is_active, sort_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {COLUMNS}
            "
        ))
        .bind(&plan.name)
        .bind(slug.as_str())
        .bind(&plan.description)
        .bind(&plan.image)
        .bind(&plan.investment)
        .bind(&plan.area)
        .bind(&plan.features)
        .bind(&plan.includes)
        .bind(plan.is_popular)
        .bind(plan.is_active)
        .bind(plan.order)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "已有同名方案", "關聯資料不存在"))?;

        row.try_into()
    }

    /// Overwrite every column except the slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the plan does not exist.
    pub async fn replace(
        &self,
        id: FranchisePlanId,
        plan: &FranchisePlanFields,
    ) -> Result<FranchisePlan, RepositoryError> {
        let row = sqlx::query_as::<_, FranchisePlanRow>(&format!(
            r"
            UPDATE franchise_plans SET
                name = $2, description = $3, image = $4, investment = $5, area = $6,
                features = $7, includes = $8, is_popular = $9, is_active = $10,
                sort_order = $11, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "
        ))
        .bind(id)
        .bind(&plan.name)
        .bind(&plan.description)
        .bind(&plan.image)
        .bind(&plan.investment)
        .bind(&plan.area)
        .bind(&plan.features)
        .bind(&plan.includes)
        .bind(plan.is_popular)
        .bind(plan.is_active)
        .bind(plan.order)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the plan does not exist.
    pub async fn delete(&self, id: FranchisePlanId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM franchise_plans WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
