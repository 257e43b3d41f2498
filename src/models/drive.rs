use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::account::Profile;

pub const DRIVE_PUBLISHED: &str = "published";
pub const DRIVE_PENDING_APPROVAL: &str = "pending_approval";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Drive {
    pub id: Uuid,
    pub company: String,
    pub role: String,
    pub job_type: Option<String>,
    pub location: Option<String>,
    pub ctc_lpa: Option<Decimal>,
    pub description: Option<String>,
    pub min_cgpa: Option<Decimal>,
    pub max_backlogs: Option<i32>,
    pub eligible_branches: Option<String>,
    pub batch_year: Option<i32>,
    pub deadline: DateTime<Utc>,
    pub status: String,
    pub created_by_admin: Option<Uuid>,
    pub created_by_recruiter: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Drive {
    pub fn is_published(&self) -> bool {
        self.status == DRIVE_PUBLISHED
    }

    /// Visible to students: published and the deadline has not passed.
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        self.is_published() && self.deadline >= now
    }

    /// Whether the drive's eligibility rules admit a student with this profile.
    /// Unset rules admit everyone; a set rule requires the profile to carry
    /// the matching attribute.
    pub fn admits(&self, profile: &Profile) -> bool {
        let cgpa_ok = match self.min_cgpa {
            Some(min) => profile.cgpa.map(|c| c >= min).unwrap_or(false),
            None => true,
        };
        let backlogs_ok = match self.max_backlogs {
            Some(max) => profile.backlogs <= max,
            None => true,
        };
        let branch_ok = if lists_no_branches(self.eligible_branches.as_deref()) {
            true
        } else {
            profile
                .branch
                .as_deref()
                .map(|b| branch_listed(self.eligible_branches.as_deref(), b))
                .unwrap_or(false)
        };
        let batch_ok = match self.batch_year {
            Some(year) => profile.batch_year == Some(year),
            None => true,
        };
        cgpa_ok && backlogs_ok && branch_ok && batch_ok
    }
}

fn lists_no_branches(eligible: Option<&str>) -> bool {
    eligible.map(|s| s.trim().is_empty()).unwrap_or(true)
}

/// Case-insensitive containment of `branch` in the drive's branch list.
/// A missing or blank list matches every branch.
pub fn branch_listed(eligible: Option<&str>, branch: &str) -> bool {
    if lists_no_branches(eligible) {
        return true;
    }
    eligible
        .map(|list| list.to_lowercase().contains(&branch.to_lowercase()))
        .unwrap_or(true)
}
