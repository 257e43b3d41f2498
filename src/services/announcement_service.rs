use crate::dto::portal_dto::{CreateAnnouncementPayload, UpdateAnnouncementPayload};
use crate::error::{Error, Result};
use crate::models::announcement::{visible_feed, Announcement};
use crate::utils::time::now;
use crate::utils::validation::validate;
use sqlx::PgPool;
use uuid::Uuid;

const ANNOUNCEMENT_COLUMNS: &str =
    "id, title, content, priority, scheduled_at, expires_at, is_published, created_by, created_at";

#[derive(Clone)]
pub struct AnnouncementService {
    pool: PgPool,
}

impl AnnouncementService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, admin_id: Uuid, payload: CreateAnnouncementPayload) -> Result<Announcement> {
        validate(&payload)?;
        let priority = payload
            .priority
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| "normal".to_string());

        let announcement = sqlx::query_as::<_, Announcement>(&format!(
            r#"
            INSERT INTO announcements (title, content, priority, scheduled_at, expires_at, is_published, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            ANNOUNCEMENT_COLUMNS
        ))
        .bind(&payload.title)
        .bind(&payload.content)
        .bind(&priority)
        .bind(payload.scheduled_at)
        .bind(payload.expires_at)
        .bind(payload.is_published.unwrap_or(true))
        .bind(admin_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(announcement_id = %announcement.id, "Announcement created");
        Ok(announcement)
    }

    pub async fn update(&self, id: Uuid, payload: UpdateAnnouncementPayload) -> Result<Announcement> {
        validate(&payload)?;
        sqlx::query_as::<_, Announcement>(&format!(
            r#"
            UPDATE announcements
            SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                priority = COALESCE($4, priority),
                scheduled_at = COALESCE($5, scheduled_at),
                expires_at = COALESCE($6, expires_at),
                is_published = COALESCE($7, is_published)
            WHERE id = $1
            RETURNING {}
            "#,
            ANNOUNCEMENT_COLUMNS
        ))
        .bind(id)
        .bind(&payload.title)
        .bind(&payload.content)
        .bind(&payload.priority)
        .bind(payload.scheduled_at)
        .bind(payload.expires_at)
        .bind(payload.is_published)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Announcement not found.".into()))
    }

    pub async fn list_all(&self) -> Result<Vec<Announcement>> {
        let items = sqlx::query_as::<_, Announcement>(&format!(
            "SELECT {} FROM announcements ORDER BY created_at DESC",
            ANNOUNCEMENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn feed(&self) -> Result<Vec<Announcement>> {
        let published = sqlx::query_as::<_, Announcement>(&format!(
            "SELECT {} FROM announcements WHERE is_published = TRUE",
            ANNOUNCEMENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(visible_feed(published, now()))
    }
}
