use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const STUDENT_ROLE: &str = "student";

/// Student identity record. Code fields are only populated while the account
/// is unverified or a resend is outstanding.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_verified: bool,
    #[serde(skip_serializing)]
    pub verification_code: Option<String>,
    #[serde(skip_serializing)]
    pub code_expiry: Option<DateTime<Utc>>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn pending_code(&self) -> Option<PendingCode<'_>> {
        match (self.verification_code.as_deref(), self.code_expiry) {
            (Some(code), Some(expires_at)) => Some(PendingCode { code, expires_at }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PendingCode<'a> {
    pub code: &'a str,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub resume_path: String,
    pub branch: Option<String>,
    pub cgpa: Option<Decimal>,
    pub backlogs: i32,
    pub batch_year: Option<i32>,
    pub skills: String,
    pub linkedin_url: Option<String>,
    pub view_count: i32,
    pub updated_at: DateTime<Utc>,
}
