use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Initial status of an application submitted against a drive.
pub const STATUS_APPLIED: &str = "Applied";
/// Initial status of a company-name-only application.
pub const STATUS_SUBMITTED: &str = "Application Submitted";

/// Raw `applications` row. Both application variants share the table; use
/// [`Application`] once the row has been read.
#[derive(Debug, Clone, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub drive_id: Option<Uuid>,
    pub company_name: Option<String>,
    pub status: String,
    pub current_round: Option<String>,
    pub notes: Option<String>,
    pub application_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationProgress {
    pub status: String,
    pub current_round: Option<String>,
    pub notes: Option<String>,
    pub application_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedApplication {
    pub id: Uuid,
    pub drive_id: Uuid,
    pub student_id: Option<Uuid>,
    #[serde(flatten)]
    pub progress: ApplicationProgress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyApplication {
    pub id: Uuid,
    pub company_name: String,
    #[serde(flatten)]
    pub progress: ApplicationProgress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Application {
    Linked(LinkedApplication),
    Legacy(LegacyApplication),
}

impl Application {
    pub fn id(&self) -> Uuid {
        match self {
            Application::Linked(a) => a.id,
            Application::Legacy(a) => a.id,
        }
    }

    pub fn progress(&self) -> &ApplicationProgress {
        match self {
            Application::Linked(a) => &a.progress,
            Application::Legacy(a) => &a.progress,
        }
    }
}

impl TryFrom<ApplicationRow> for Application {
    type Error = Error;

    fn try_from(row: ApplicationRow) -> Result<Self> {
        let progress = ApplicationProgress {
            status: row.status,
            current_round: row.current_round,
            notes: row.notes,
            application_date: row.application_date,
            updated_at: row.updated_at,
        };
        match (row.drive_id, row.company_name) {
            (Some(drive_id), _) => Ok(Application::Linked(LinkedApplication {
                id: row.id,
                drive_id,
                student_id: row.user_id,
                progress,
            })),
            (None, Some(company_name)) => Ok(Application::Legacy(LegacyApplication {
                id: row.id,
                company_name,
                progress,
            })),
            (None, None) => Err(Error::Internal(format!(
                "application {} has neither a drive nor a company",
                row.id
            ))),
        }
    }
}

/// What an apply request points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyTarget {
    Drive(Uuid),
    Company(String),
}

impl ApplyTarget {
    /// A drive id wins over a company name; blank values count as absent.
    pub fn resolve(drive_id: Option<&str>, company_name: Option<&str>) -> Result<Self> {
        if let Some(raw) = drive_id.map(str::trim).filter(|s| !s.is_empty()) {
            let id = Uuid::parse_str(raw)
                .map_err(|_| Error::BadRequest("Invalid drive id.".into()))?;
            return Ok(ApplyTarget::Drive(id));
        }
        match company_name.map(str::trim).filter(|s| !s.is_empty()) {
            Some(company) => Ok(ApplyTarget::Company(company.to_string())),
            None => Err(Error::BadRequest(
                "Either a drive or a company name is required.".into(),
            )),
        }
    }
}

/// One entry of an application's round history. Rows are only ever inserted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoundEvent {
    pub id: i64,
    pub application_id: Uuid,
    pub round_name: String,
    pub status: String,
    pub remarks: Option<String>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A student's application joined with its drive, as listed on the student
/// dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudentApplicationView {
    pub id: Uuid,
    pub drive_id: Option<Uuid>,
    pub company: Option<String>,
    pub role: Option<String>,
    pub job_type: Option<String>,
    pub status: String,
    pub current_round: Option<String>,
    pub notes: Option<String>,
    pub application_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Applicant listing for a drive, shown to admins and the owning recruiter.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicantView {
    pub application_id: Uuid,
    pub student_id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub branch: Option<String>,
    pub cgpa: Option<rust_decimal::Decimal>,
    pub resume_path: Option<String>,
    pub status: String,
    pub current_round: Option<String>,
    pub application_date: DateTime<Utc>,
}

/// Row of the applications report.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationReportRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub company: Option<String>,
    pub role: Option<String>,
    pub status: String,
    pub current_round: Option<String>,
    pub application_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(drive_id: Option<Uuid>, company_name: Option<&str>) -> ApplicationRow {
        let now = Utc::now();
        ApplicationRow {
            id: Uuid::new_v4(),
            user_id: drive_id.map(|_| Uuid::new_v4()),
            drive_id,
            company_name: company_name.map(str::to_string),
            status: STATUS_APPLIED.into(),
            current_round: None,
            notes: None,
            application_date: now,
            updated_at: now,
        }
    }

    #[test]
    fn drive_rows_become_linked() {
        let drive_id = Uuid::new_v4();
        let app = Application::try_from(row(Some(drive_id), None)).unwrap();
        match app {
            Application::Linked(linked) => assert_eq!(linked.drive_id, drive_id),
            other => panic!("expected linked, got {:?}", other),
        }
    }

    #[test]
    fn company_rows_become_legacy() {
        let app = Application::try_from(row(None, Some("Initech"))).unwrap();
        assert!(matches!(app, Application::Legacy(ref l) if l.company_name == "Initech"));
        let json = serde_json::to_value(&app).unwrap();
        assert_eq!(json["kind"], "legacy");
        assert_eq!(json["status"], STATUS_APPLIED);
    }

    #[test]
    fn rows_without_target_are_rejected() {
        assert!(Application::try_from(row(None, None)).is_err());
    }

    #[test]
    fn apply_target_prefers_drive() {
        let id = Uuid::new_v4();
        let target = ApplyTarget::resolve(Some(&id.to_string()), Some("Acme")).unwrap();
        assert_eq!(target, ApplyTarget::Drive(id));
    }

    #[test]
    fn apply_target_falls_back_to_company() {
        let target = ApplyTarget::resolve(Some("  "), Some(" Acme ")).unwrap();
        assert_eq!(target, ApplyTarget::Company("Acme".into()));
    }

    #[test]
    fn apply_target_requires_something() {
        assert!(matches!(
            ApplyTarget::resolve(None, Some("")),
            Err(Error::BadRequest(_))
        ));
        assert!(matches!(
            ApplyTarget::resolve(Some("not-a-uuid"), None),
            Err(Error::BadRequest(_))
        ));
    }
}
