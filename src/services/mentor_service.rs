use crate::dto::portal_dto::{BookMentorSessionPayload, CreateMentorPayload, UpdateMentorSessionPayload};
use crate::error::{missing_reference, Error, Result};
use crate::models::mentor::{Mentor, MentorSession, MentorSessionStatus};
use crate::utils::validation::validate;
use sqlx::PgPool;
use uuid::Uuid;

const MENTOR_COLUMNS: &str = "id, name, email, company, expertise, bio, is_active, created_at";
const MENTOR_SESSION_COLUMNS: &str =
    "id, mentor_id, student_id, topic, requested_at, status, meeting_link, created_at, updated_at";

#[derive(Clone)]
pub struct MentorService {
    pool: PgPool,
}

impl MentorService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateMentorPayload) -> Result<Mentor> {
        validate(&payload)?;
        let mentor = sqlx::query_as::<_, Mentor>(&format!(
            r#"
            INSERT INTO mentors (name, email, company, expertise, bio)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            MENTOR_COLUMNS
        ))
        .bind(&payload.name)
        .bind(&payload.email)
        .bind(&payload.company)
        .bind(&payload.expertise)
        .bind(&payload.bio)
        .fetch_one(&self.pool)
        .await?;
        Ok(mentor)
    }

    pub async fn list_active(&self) -> Result<Vec<Mentor>> {
        let items = sqlx::query_as::<_, Mentor>(&format!(
            "SELECT {} FROM mentors WHERE is_active = TRUE ORDER BY name ASC",
            MENTOR_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn book(&self, student_id: Uuid, payload: BookMentorSessionPayload) -> Result<MentorSession> {
        validate(&payload)?;
        let active: Option<bool> = sqlx::query_scalar("SELECT is_active FROM mentors WHERE id = $1")
            .bind(payload.mentor_id)
            .fetch_optional(&self.pool)
            .await?;
        if active != Some(true) {
            return Err(Error::NotFound("Mentor not found.".into()));
        }

        let session = sqlx::query_as::<_, MentorSession>(&format!(
            r#"
            INSERT INTO mentor_sessions (mentor_id, student_id, topic, requested_at, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            MENTOR_SESSION_COLUMNS
        ))
        .bind(payload.mentor_id)
        .bind(student_id)
        .bind(&payload.topic)
        .bind(payload.requested_at)
        .bind(MentorSessionStatus::Requested.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(missing_reference)?;
        tracing::info!(session_id = %session.id, mentor_id = %session.mentor_id, "Mentor session requested");
        Ok(session)
    }

    pub async fn update_session(&self, id: Uuid, payload: UpdateMentorSessionPayload) -> Result<MentorSession> {
        sqlx::query_as::<_, MentorSession>(&format!(
            r#"
            UPDATE mentor_sessions
            SET status = $2, meeting_link = COALESCE($3, meeting_link), updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            MENTOR_SESSION_COLUMNS
        ))
        .bind(id)
        .bind(payload.status.as_str())
        .bind(&payload.meeting_link)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Mentor session not found.".into()))
    }

    pub async fn sessions_for_student(&self, student_id: Uuid) -> Result<Vec<MentorSession>> {
        let items = sqlx::query_as::<_, MentorSession>(&format!(
            "SELECT {} FROM mentor_sessions WHERE student_id = $1 ORDER BY requested_at DESC",
            MENTOR_SESSION_COLUMNS
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn all_sessions(&self) -> Result<Vec<MentorSession>> {
        let items = sqlx::query_as::<_, MentorSession>(&format!(
            "SELECT {} FROM mentor_sessions ORDER BY requested_at DESC",
            MENTOR_SESSION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}
