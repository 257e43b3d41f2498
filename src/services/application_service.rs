use crate::dto::application_dto::{AdminApplicationQuery, RoundUpdatePayload, RoundUpdateResponse};
use crate::error::{Error, Result};
use crate::models::application::{
    ApplicantView, Application, ApplicationReportRow, ApplicationRow, ApplyTarget, RoundEvent,
    StudentApplicationView, STATUS_APPLIED, STATUS_SUBMITTED,
};
use crate::services::drive_service::DriveService;
use crate::utils::validation::validate;
use sqlx::PgPool;
use uuid::Uuid;

const APPLICATION_COLUMNS: &str =
    "id, user_id, drive_id, company_name, status, current_round, notes, application_date, updated_at";
const ROUND_COLUMNS: &str = "id, application_id, round_name, status, remarks, updated_by, created_at";

#[derive(Clone)]
pub struct ApplicationService {
    pool: PgPool,
    drives: DriveService,
}

impl ApplicationService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            drives: DriveService::new(pool.clone()),
            pool,
        }
    }

    /// Drive applications need a published drive and are unique per student.
    /// Company-name applications are recorded without an owner or any
    /// duplicate check.
    pub async fn apply(&self, student_id: Option<Uuid>, target: ApplyTarget) -> Result<Application> {
        let row = match target {
            ApplyTarget::Drive(drive_id) => {
                let published = match self.drives.get(drive_id).await {
                    Ok(drive) => drive.is_published(),
                    Err(Error::NotFound(_)) => false,
                    Err(e) => return Err(e),
                };
                if !published {
                    return Err(Error::NotFound(
                        "Drive not found or not open for applications.".into(),
                    ));
                }

                if let Some(student_id) = student_id {
                    let exists: bool = sqlx::query_scalar(
                        "SELECT EXISTS(SELECT 1 FROM applications WHERE user_id = $1 AND drive_id = $2)",
                    )
                    .bind(student_id)
                    .bind(drive_id)
                    .fetch_one(&self.pool)
                    .await?;
                    if exists {
                        return Err(already_applied());
                    }
                }

                sqlx::query_as::<_, ApplicationRow>(&format!(
                    "INSERT INTO applications (user_id, drive_id, status) VALUES ($1, $2, $3) RETURNING {}",
                    APPLICATION_COLUMNS
                ))
                .bind(student_id)
                .bind(drive_id)
                .bind(STATUS_APPLIED)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| match Error::from(e) {
                    Error::Conflict(_) => already_applied(),
                    other => other,
                })?
            }
            ApplyTarget::Company(company_name) => {
                sqlx::query_as::<_, ApplicationRow>(&format!(
                    "INSERT INTO applications (company_name, status) VALUES ($1, $2) RETURNING {}",
                    APPLICATION_COLUMNS
                ))
                .bind(&company_name)
                .bind(STATUS_SUBMITTED)
                .fetch_one(&self.pool)
                .await?
            }
        };

        let application = Application::try_from(row)?;
        tracing::info!(application_id = %application.id(), student_id = ?student_id, "Application submitted");
        Ok(application)
    }

    /// Updates the application and appends the matching round event in one
    /// transaction. The row lock serializes concurrent updates of the same
    /// application so the latest event always mirrors the row.
    pub async fn advance_round(
        &self,
        application_id: Uuid,
        admin_id: Uuid,
        payload: RoundUpdatePayload,
    ) -> Result<RoundUpdateResponse> {
        validate(&payload)?;
        let mut tx = self.pool.begin().await?;

        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM applications WHERE id = $1 FOR UPDATE")
                .bind(application_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(Error::NotFound("Application not found.".into()));
        }

        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            UPDATE applications
            SET status = $2, current_round = $3, notes = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        ))
        .bind(application_id)
        .bind(&payload.status)
        .bind(&payload.round_name)
        .bind(&payload.remarks)
        .fetch_one(&mut *tx)
        .await?;

        let event = sqlx::query_as::<_, RoundEvent>(&format!(
            r#"
            INSERT INTO application_rounds (application_id, round_name, status, remarks, updated_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            ROUND_COLUMNS
        ))
        .bind(application_id)
        .bind(&payload.round_name)
        .bind(&payload.status)
        .bind(&payload.remarks)
        .bind(admin_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            application_id = %application_id,
            round = %payload.round_name,
            status = %payload.status,
            "Application round updated"
        );

        Ok(RoundUpdateResponse {
            application: Application::try_from(row)?,
            event,
        })
    }

    pub async fn get(&self, application_id: Uuid) -> Result<Application> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {} FROM applications WHERE id = $1",
            APPLICATION_COLUMNS
        ))
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Application not found.".into()))?;
        Application::try_from(row)
    }

    /// Round history, oldest first.
    pub async fn rounds(&self, application_id: Uuid) -> Result<Vec<RoundEvent>> {
        self.get(application_id).await?;
        self.fetch_rounds(application_id).await
    }

    /// Round history of one of the student's own applications. Someone else's
    /// application is reported as missing.
    pub async fn rounds_for_student(
        &self,
        student_id: Uuid,
        application_id: Uuid,
    ) -> Result<Vec<RoundEvent>> {
        let owned: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM applications WHERE id = $1 AND user_id = $2)",
        )
        .bind(application_id)
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;
        if !owned {
            return Err(Error::NotFound("Application not found.".into()));
        }
        self.fetch_rounds(application_id).await
    }

    async fn fetch_rounds(&self, application_id: Uuid) -> Result<Vec<RoundEvent>> {
        let events = sqlx::query_as::<_, RoundEvent>(&format!(
            "SELECT {} FROM application_rounds WHERE application_id = $1 ORDER BY id ASC",
            ROUND_COLUMNS
        ))
        .bind(application_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    pub async fn list_for_student(&self, student_id: Uuid) -> Result<Vec<StudentApplicationView>> {
        let items = sqlx::query_as::<_, StudentApplicationView>(
            r#"
            SELECT
                a.id,
                a.drive_id,
                COALESCE(d.company, a.company_name) AS company,
                d.role,
                d.job_type,
                a.status,
                a.current_round,
                a.notes,
                a.application_date,
                a.updated_at
            FROM applications a
            LEFT JOIN drives d ON d.id = a.drive_id
            WHERE a.user_id = $1
            ORDER BY a.application_date DESC
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn list_admin(&self, query: AdminApplicationQuery) -> Result<Vec<Application>> {
        let status = query.status.filter(|s| !s.trim().is_empty());
        let rows = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            SELECT {} FROM applications
            WHERE ($1::UUID IS NULL OR drive_id = $1)
              AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY application_date DESC
            "#,
            APPLICATION_COLUMNS
        ))
        .bind(query.drive_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Application::try_from).collect()
    }

    pub async fn applicants(&self, drive_id: Uuid) -> Result<Vec<ApplicantView>> {
        let items = sqlx::query_as::<_, ApplicantView>(
            r#"
            SELECT
                a.id AS application_id,
                u.id AS student_id,
                u.username,
                u.email,
                p.full_name,
                p.branch,
                p.cgpa,
                p.resume_path,
                a.status,
                a.current_round,
                a.application_date
            FROM applications a
            JOIN users u ON u.id = a.user_id
            LEFT JOIN profiles p ON p.user_id = u.id
            WHERE a.drive_id = $1
            ORDER BY a.application_date ASC
            "#,
        )
        .bind(drive_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Applicants of a drive the recruiter created.
    pub async fn applicants_for_recruiter(
        &self,
        recruiter_id: Uuid,
        drive_id: Uuid,
    ) -> Result<Vec<ApplicantView>> {
        let drive = self.drives.get(drive_id).await?;
        if drive.created_by_recruiter != Some(recruiter_id) {
            return Err(Error::Forbidden(
                "You can only view applicants of your own drives.".into(),
            ));
        }
        self.applicants(drive_id).await
    }

    /// Whether the student applied to any drive this recruiter created.
    pub async fn student_applied_to_recruiter(
        &self,
        recruiter_id: Uuid,
        student_id: Uuid,
    ) -> Result<bool> {
        let applied: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM applications a
                JOIN drives d ON d.id = a.drive_id
                WHERE a.user_id = $1 AND d.created_by_recruiter = $2
            )
            "#,
        )
        .bind(student_id)
        .bind(recruiter_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(applied)
    }

    /// Rows for the applications report: only applications with an owning
    /// student, newest first.
    pub async fn report_rows(&self) -> Result<Vec<ApplicationReportRow>> {
        let rows = sqlx::query_as::<_, ApplicationReportRow>(
            r#"
            SELECT
                a.id,
                u.username,
                u.email,
                COALESCE(d.company, a.company_name) AS company,
                d.role,
                a.status,
                a.current_round,
                a.application_date,
                a.updated_at
            FROM applications a
            JOIN users u ON u.id = a.user_id
            LEFT JOIN drives d ON d.id = a.drive_id
            ORDER BY a.application_date DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

fn already_applied() -> Error {
    Error::Conflict("You have already applied to this drive.".into())
}
