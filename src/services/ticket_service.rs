use crate::dto::portal_dto::{CreateTicketPayload, UpdateTicketPayload};
use crate::error::{Error, Result};
use crate::models::helpdesk_ticket::{HelpdeskTicket, TicketStatus};
use crate::utils::validation::validate;
use sqlx::PgPool;
use uuid::Uuid;

const TICKET_COLUMNS: &str =
    "id, student_id, subject, message, category, status, admin_response, created_at, updated_at";

#[derive(Clone)]
pub struct TicketService {
    pool: PgPool,
}

impl TicketService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn open(&self, student_id: Uuid, payload: CreateTicketPayload) -> Result<HelpdeskTicket> {
        validate(&payload)?;
        let ticket = sqlx::query_as::<_, HelpdeskTicket>(&format!(
            r#"
            INSERT INTO helpdesk_tickets (student_id, subject, message, category, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            TICKET_COLUMNS
        ))
        .bind(student_id)
        .bind(&payload.subject)
        .bind(&payload.message)
        .bind(&payload.category)
        .bind(TicketStatus::Open.as_str())
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(ticket_id = %ticket.id, "Helpdesk ticket opened");
        Ok(ticket)
    }

    pub async fn list_for_student(&self, student_id: Uuid) -> Result<Vec<HelpdeskTicket>> {
        let items = sqlx::query_as::<_, HelpdeskTicket>(&format!(
            "SELECT {} FROM helpdesk_tickets WHERE student_id = $1 ORDER BY created_at DESC",
            TICKET_COLUMNS
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn list_all(&self) -> Result<Vec<HelpdeskTicket>> {
        let items = sqlx::query_as::<_, HelpdeskTicket>(&format!(
            "SELECT {} FROM helpdesk_tickets ORDER BY created_at DESC",
            TICKET_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn update(&self, id: Uuid, payload: UpdateTicketPayload) -> Result<HelpdeskTicket> {
        sqlx::query_as::<_, HelpdeskTicket>(&format!(
            r#"
            UPDATE helpdesk_tickets
            SET status = $2, admin_response = COALESCE($3, admin_response), updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            TICKET_COLUMNS
        ))
        .bind(id)
        .bind(payload.status.as_str())
        .bind(&payload.admin_response)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Ticket not found.".into()))
    }
}
