use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SuccessStory {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub student_name: String,
    pub company_name: String,
    pub story: String,
    pub created_at: DateTime<Utc>,
}
