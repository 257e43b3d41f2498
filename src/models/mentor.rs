use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Mentor {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub expertise: Option<String>,
    pub bio: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentorSessionStatus {
    Requested,
    Confirmed,
    Completed,
    Cancelled,
}

impl MentorSessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MentorSessionStatus::Requested => "requested",
            MentorSessionStatus::Confirmed => "confirmed",
            MentorSessionStatus::Completed => "completed",
            MentorSessionStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MentorSession {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub student_id: Uuid,
    pub topic: String,
    pub requested_at: DateTime<Utc>,
    pub status: String,
    pub meeting_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
