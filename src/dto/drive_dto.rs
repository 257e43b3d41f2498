use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDrivePayload {
    #[validate(length(min = 1))]
    pub company: String,
    #[validate(length(min = 1))]
    pub role: String,
    pub job_type: Option<String>,
    pub location: Option<String>,
    pub ctc_lpa: Option<Decimal>,
    pub description: Option<String>,
    pub min_cgpa: Option<Decimal>,
    #[validate(range(min = 0))]
    pub max_backlogs: Option<i32>,
    pub eligible_branches: Option<String>,
    pub batch_year: Option<i32>,
    pub deadline: DateTime<Utc>,
    /// Honoured for admins only; recruiter drives always start pending.
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateDrivePayload {
    #[validate(length(min = 1))]
    pub company: Option<String>,
    #[validate(length(min = 1))]
    pub role: Option<String>,
    pub job_type: Option<String>,
    pub location: Option<String>,
    pub ctc_lpa: Option<Decimal>,
    pub description: Option<String>,
    pub min_cgpa: Option<Decimal>,
    #[validate(range(min = 0))]
    pub max_backlogs: Option<i32>,
    pub eligible_branches: Option<String>,
    pub batch_year: Option<i32>,
    pub deadline: Option<DateTime<Utc>>,
    #[validate(length(min = 1))]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DriveListQuery {
    pub company: Option<String>,
    pub role: Option<String>,
    pub job_type: Option<String>,
    pub branch: Option<String>,
    pub batch_year: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AdminDriveQuery {
    pub status: Option<String>,
}
