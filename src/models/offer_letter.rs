use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Declined,
}

impl OfferStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OfferStatus::Pending => "pending",
            OfferStatus::Accepted => "accepted",
            OfferStatus::Declined => "declined",
        }
    }
}

/// A student's answer to an offer. Only a pending offer can be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferDecision {
    Accept,
    Decline,
}

impl OfferDecision {
    pub fn resulting_status(self) -> OfferStatus {
        match self {
            OfferDecision::Accept => OfferStatus::Accepted,
            OfferDecision::Decline => OfferStatus::Declined,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OfferLetter {
    pub id: Uuid,
    pub student_id: Uuid,
    pub drive_id: Option<Uuid>,
    pub company: String,
    pub role: String,
    pub ctc_lpa: Option<Decimal>,
    pub joining_date: Option<NaiveDate>,
    pub letter_path: Option<String>,
    pub status: String,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl OfferLetter {
    pub fn is_pending(&self) -> bool {
        self.status == OfferStatus::Pending.as_str()
    }
}
