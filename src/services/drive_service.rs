use crate::dto::drive_dto::{AdminDriveQuery, CreateDrivePayload, DriveListQuery, UpdateDrivePayload};
use crate::error::{is_foreign_key_violation, Error, Result};
use crate::models::account::Profile;
use crate::models::drive::{Drive, DRIVE_PENDING_APPROVAL, DRIVE_PUBLISHED};
use crate::utils::time::now;
use crate::utils::validation::validate;
use sqlx::PgPool;
use uuid::Uuid;

const DRIVE_COLUMNS: &str = "id, company, role, job_type, location, ctc_lpa, description, \
     min_cgpa, max_backlogs, eligible_branches, batch_year, deadline, status, \
     created_by_admin, created_by_recruiter, created_at, updated_at";

/// Who is creating a drive. Recruiter drives wait for admin approval.
#[derive(Debug, Clone, Copy)]
pub enum DriveCreator {
    Admin(Uuid),
    Recruiter(Uuid),
}

#[derive(Clone)]
pub struct DriveService {
    pool: PgPool,
}

impl DriveService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, creator: DriveCreator, payload: CreateDrivePayload) -> Result<Drive> {
        validate(&payload)?;
        let (status, admin_id, recruiter_id) = match creator {
            DriveCreator::Admin(id) => (
                payload
                    .status
                    .clone()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DRIVE_PUBLISHED.to_string()),
                Some(id),
                None,
            ),
            DriveCreator::Recruiter(id) => (DRIVE_PENDING_APPROVAL.to_string(), None, Some(id)),
        };

        let drive = sqlx::query_as::<_, Drive>(&format!(
            r#"
            INSERT INTO drives (
                company, role, job_type, location, ctc_lpa, description,
                min_cgpa, max_backlogs, eligible_branches, batch_year, deadline,
                status, created_by_admin, created_by_recruiter
            ) VALUES (
                $1, $2, $3, $4, $5, $6,
                $7, $8, $9, $10, $11,
                $12, $13, $14
            )
            RETURNING {}
            "#,
            DRIVE_COLUMNS
        ))
        .bind(payload.company.trim())
        .bind(payload.role.trim())
        .bind(&payload.job_type)
        .bind(&payload.location)
        .bind(payload.ctc_lpa)
        .bind(&payload.description)
        .bind(payload.min_cgpa)
        .bind(payload.max_backlogs)
        .bind(&payload.eligible_branches)
        .bind(payload.batch_year)
        .bind(payload.deadline)
        .bind(&status)
        .bind(admin_id)
        .bind(recruiter_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(drive_id = %drive.id, company = %drive.company, status = %drive.status, "Drive created");
        Ok(drive)
    }

    /// Partial update; absent fields keep their value. Approving a recruiter
    /// drive is an update of `status` to `published`.
    pub async fn update(&self, id: Uuid, payload: UpdateDrivePayload) -> Result<Drive> {
        validate(&payload)?;
        self.get(id).await?;

        let drive = sqlx::query_as::<_, Drive>(&format!(
            r#"
            UPDATE drives
            SET
                company = COALESCE($2, company),
                role = COALESCE($3, role),
                job_type = COALESCE($4, job_type),
                location = COALESCE($5, location),
                ctc_lpa = COALESCE($6, ctc_lpa),
                description = COALESCE($7, description),
                min_cgpa = COALESCE($8, min_cgpa),
                max_backlogs = COALESCE($9, max_backlogs),
                eligible_branches = COALESCE($10, eligible_branches),
                batch_year = COALESCE($11, batch_year),
                deadline = COALESCE($12, deadline),
                status = COALESCE($13, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            DRIVE_COLUMNS
        ))
        .bind(id)
        .bind(&payload.company)
        .bind(&payload.role)
        .bind(&payload.job_type)
        .bind(&payload.location)
        .bind(payload.ctc_lpa)
        .bind(&payload.description)
        .bind(payload.min_cgpa)
        .bind(payload.max_backlogs)
        .bind(&payload.eligible_branches)
        .bind(payload.batch_year)
        .bind(payload.deadline)
        .bind(&payload.status)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(drive_id = %id, status = %drive.status, "Drive updated");
        Ok(drive)
    }

    pub async fn get(&self, id: Uuid) -> Result<Drive> {
        sqlx::query_as::<_, Drive>(&format!("SELECT {} FROM drives WHERE id = $1", DRIVE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Drive not found.".into()))
    }

    /// Student view of a single drive; unpublished drives do not exist here.
    pub async fn get_published(&self, id: Uuid) -> Result<Drive> {
        let drive = self.get(id).await?;
        if !drive.is_published() {
            return Err(Error::NotFound("Drive not found.".into()));
        }
        Ok(drive)
    }

    /// Drives that already have applications are kept, so their round
    /// history survives.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM drives WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    Error::Conflict(
                        "Drive has applications and cannot be deleted. Close it instead.".into(),
                    )
                } else {
                    Error::from(e)
                }
            })?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Drive not found.".into()));
        }
        tracing::info!(drive_id = %id, "Drive deleted");
        Ok(())
    }

    pub async fn list_open(&self, query: DriveListQuery) -> Result<Vec<Drive>> {
        let (where_clause, args) = open_drive_filter(&query);
        let sql = format!(
            "SELECT {} FROM drives WHERE {} ORDER BY deadline ASC",
            DRIVE_COLUMNS, where_clause
        );
        let mut statement = sqlx::query_as::<_, Drive>(&sql);
        for value in &args {
            statement = statement.bind(value);
        }
        let items = statement.fetch_all(&self.pool).await?;
        Ok(items)
    }

    /// Open drives whose eligibility rules admit this profile.
    pub async fn list_eligible(&self, profile: &Profile) -> Result<Vec<Drive>> {
        let at = now();
        let drives = self.list_open(DriveListQuery::default()).await?;
        Ok(drives
            .into_iter()
            .filter(|d| d.is_open_at(at) && d.admits(profile))
            .collect())
    }

    pub async fn list_admin(&self, query: AdminDriveQuery) -> Result<Vec<Drive>> {
        let status = query.status.filter(|s| !s.trim().is_empty());
        let items = sqlx::query_as::<_, Drive>(&format!(
            "SELECT {} FROM drives WHERE ($1::TEXT IS NULL OR status = $1) ORDER BY created_at DESC",
            DRIVE_COLUMNS
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn list_by_recruiter(&self, recruiter_id: Uuid) -> Result<Vec<Drive>> {
        let items = sqlx::query_as::<_, Drive>(&format!(
            "SELECT {} FROM drives WHERE created_by_recruiter = $1 ORDER BY created_at DESC",
            DRIVE_COLUMNS
        ))
        .bind(recruiter_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}

/// WHERE clause and text binds for the student drive listing. Company and
/// role match as case-sensitive substrings without wildcard interpretation.
fn open_drive_filter(query: &DriveListQuery) -> (String, Vec<String>) {
    let mut filters = vec![
        format!("status = '{}'", DRIVE_PUBLISHED),
        "deadline >= NOW()".to_string(),
    ];
    let mut args: Vec<String> = Vec::new();

    let present = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);

    if let Some(company) = present(&query.company) {
        filters.push(format!("POSITION(${} IN company) > 0", args.len() + 1));
        args.push(company);
    }
    if let Some(role) = present(&query.role) {
        filters.push(format!("POSITION(${} IN role) > 0", args.len() + 1));
        args.push(role);
    }
    if let Some(job_type) = present(&query.job_type) {
        filters.push(format!("job_type = ${}", args.len() + 1));
        args.push(job_type);
    }
    if let Some(branch) = present(&query.branch) {
        filters.push(format!(
            "(eligible_branches IS NULL OR TRIM(eligible_branches) = '' \
             OR POSITION(LOWER(${}) IN LOWER(eligible_branches)) > 0)",
            args.len() + 1
        ));
        args.push(branch);
    }
    if let Some(year) = query.batch_year {
        filters.push(format!("(batch_year IS NULL OR batch_year = ${}::INT)", args.len() + 1));
        args.push(year.to_string());
    }

    (filters.join(" AND "), args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfiltered_listing_only_restricts_status_and_deadline() {
        let (clause, args) = open_drive_filter(&DriveListQuery::default());
        assert_eq!(clause, "status = 'published' AND deadline >= NOW()");
        assert!(args.is_empty());
    }

    #[test]
    fn filters_are_numbered_in_bind_order() {
        let query = DriveListQuery {
            company: Some("Acme".into()),
            role: None,
            job_type: Some("internship".into()),
            branch: Some("CSE".into()),
            batch_year: Some(2026),
        };
        let (clause, args) = open_drive_filter(&query);
        assert!(clause.contains("POSITION($1 IN company) > 0"));
        assert!(clause.contains("job_type = $2"));
        assert!(clause.contains("POSITION(LOWER($3) IN LOWER(eligible_branches)) > 0"));
        assert!(clause.contains("batch_year = $4::INT"));
        assert_eq!(args, vec!["Acme", "internship", "CSE", "2026"]);
    }

    #[test]
    fn blank_filters_are_ignored() {
        let query = DriveListQuery {
            company: Some("  ".into()),
            branch: Some(String::new()),
            ..Default::default()
        };
        let (_, args) = open_drive_filter(&query);
        assert!(args.is_empty());
    }
}
