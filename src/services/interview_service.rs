use crate::dto::portal_dto::{CreateSlotPayload, UpdateSlotPayload};
use crate::error::{missing_reference, Error, Result};
use crate::models::interview_slot::{InterviewSlot, SlotStatus};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const SLOT_COLUMNS: &str = "id, drive_id, student_id, starts_at, ends_at, venue, status, notes, \
     created_by, created_at, updated_at";

#[derive(Clone)]
pub struct InterviewService {
    pool: PgPool,
}

impl InterviewService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn schedule(&self, admin_id: Uuid, payload: CreateSlotPayload) -> Result<InterviewSlot> {
        check_slot_times(payload.starts_at, payload.ends_at)?;
        let slot = sqlx::query_as::<_, InterviewSlot>(&format!(
            r#"
            INSERT INTO interview_slots (drive_id, student_id, starts_at, ends_at, venue, status, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            SLOT_COLUMNS
        ))
        .bind(payload.drive_id)
        .bind(payload.student_id)
        .bind(payload.starts_at)
        .bind(payload.ends_at)
        .bind(&payload.venue)
        .bind(SlotStatus::Scheduled.as_str())
        .bind(&payload.notes)
        .bind(admin_id)
        .fetch_one(&self.pool)
        .await
        .map_err(missing_reference)?;
        tracing::info!(slot_id = %slot.id, student_id = %slot.student_id, "Interview scheduled");
        Ok(slot)
    }

    /// Partial update. The merged start and end times are checked before
    /// anything is written.
    pub async fn update(&self, id: Uuid, payload: UpdateSlotPayload) -> Result<InterviewSlot> {
        let mut tx = self.pool.begin().await?;
        let current = sqlx::query_as::<_, InterviewSlot>(&format!(
            "SELECT {} FROM interview_slots WHERE id = $1 FOR UPDATE",
            SLOT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound("Interview slot not found.".into()))?;

        check_slot_times(
            payload.starts_at.unwrap_or(current.starts_at),
            payload.ends_at.or(current.ends_at),
        )?;

        let slot = sqlx::query_as::<_, InterviewSlot>(&format!(
            r#"
            UPDATE interview_slots
            SET
                status = COALESCE($2, status),
                starts_at = COALESCE($3, starts_at),
                ends_at = COALESCE($4, ends_at),
                venue = COALESCE($5, venue),
                notes = COALESCE($6, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SLOT_COLUMNS
        ))
        .bind(id)
        .bind(payload.status.map(SlotStatus::as_str))
        .bind(payload.starts_at)
        .bind(payload.ends_at)
        .bind(&payload.venue)
        .bind(&payload.notes)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(slot)
    }

    pub async fn list_for_student(&self, student_id: Uuid) -> Result<Vec<InterviewSlot>> {
        let items = sqlx::query_as::<_, InterviewSlot>(&format!(
            "SELECT {} FROM interview_slots WHERE student_id = $1 ORDER BY starts_at ASC",
            SLOT_COLUMNS
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn list_all(&self) -> Result<Vec<InterviewSlot>> {
        let items = sqlx::query_as::<_, InterviewSlot>(&format!(
            "SELECT {} FROM interview_slots ORDER BY starts_at ASC",
            SLOT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}

/// An open-ended slot is fine; otherwise it must end after it starts.
fn check_slot_times(starts_at: DateTime<Utc>, ends_at: Option<DateTime<Utc>>) -> Result<()> {
    match ends_at {
        Some(ends_at) if ends_at <= starts_at => Err(Error::BadRequest(
            "Interview must end after it starts.".into(),
        )),
        _ => Ok(()),
    }
}
