//! Contact message repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use teainn_core::{ContactMessageId, Email};

use super::RepositoryError;
use crate::models::{ContactMessage, NewContactMessage};

#[derive(Debug, sqlx::FromRow)]
struct ContactMessageRow {
    id: i32,
    name: String,
    phone: Option<String>,
    email: String,
    subject: Option<String>,
    message: String,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<ContactMessageRow> for ContactMessage {
    type Error = RepositoryError;

    fn try_from(row: ContactMessageRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: ContactMessageId::new(row.id),
            name: row.name,
            phone: row.phone,
            email,
            subject: row.subject,
            message: row.message,
            is_read: row.is_read,
            created_at: row.created_at,
        })
    }
}

const COLUMNS: &str = "id, name, phone, email, subject, message, is_read, created_at";

pub struct ContactMessageRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContactMessageRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All messages, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<ContactMessage>, RepositoryError> {
        let rows = sqlx::query_as::<_, ContactMessageRow>(&format!(
            "SELECT {COLUMNS} FROM contact_messages ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        id: ContactMessageId,
    ) -> Result<Option<ContactMessage>, RepositoryError> {
        let row = sqlx::query_as::<_, ContactMessageRow>(&format!(
            "SELECT {COLUMNS} FROM contact_messages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Store a validated submission.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewContactMessage) -> Result<ContactMessageId, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO contact_messages (name, phone, email, subject, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(&new.name)
        .bind(&new.phone)
        .bind(&new.email)
        .bind(&new.subject)
        .bind(&new.message)
        .fetch_one(self.pool)
        .await?;

        Ok(ContactMessageId::new(id))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the message does not exist.
    pub async fn set_read(
        &self,
        id: ContactMessageId,
        is_read: bool,
    ) -> Result<ContactMessage, RepositoryError> {
        let row = sqlx::query_as::<_, ContactMessageRow>(&format!(
            "UPDATE contact_messages SET is_read = $2 WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(is_read)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the message does not exist.
    pub async fn delete(&self, id: ContactMessageId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM contact_messages WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
