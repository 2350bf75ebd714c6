//! Messages submitted through the public contact form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use teainn_core::{ContactMessageId, Email};

use super::input::{ValidationError, non_blank, required};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: ContactMessageId,
    pub name: String,
    pub phone: Option<String>,
    pub email: Email,
    pub subject: Option<String>,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Public contact form body.
#[derive(Debug, Default, Deserialize)]
pub struct ContactInput {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewContactMessage {
    pub name: String,
    pub phone: Option<String>,
    pub email: Email,
    pub subject: Option<String>,
    pub message: String,
}

impl ContactInput {
    /// Validate a submission.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when name, email or message is blank, or
    /// when the email address is malformed.
    pub fn validate(self) -> Result<NewContactMessage, ValidationError> {
        const MISSING: &str = "姓名、電子郵件和訊息為必填";
        let name = required(self.name, MISSING)?;
        let email = required(self.email, MISSING)?;
        let message = required(self.message, MISSING)?;
        let email =
            Email::parse(&email).map_err(|_| ValidationError::new("請輸入有效的電子郵件地址"))?;

        Ok(NewContactMessage {
            name,
            phone: non_blank(self.phone),
            email,
            subject: non_blank(self.subject),
            message,
        })
    }
}

/// Body of `PUT /api/admin/contact-messages/{id}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadStatusInput {
    pub is_read: Option<bool>,
}

impl ReadStatusInput {
    /// Marking as read is the default action.
    #[must_use]
    pub fn is_read(&self) -> bool {
        self.is_read.unwrap_or(true)
    }
}
