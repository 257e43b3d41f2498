use crate::dto::portal_dto::CreateOfferPayload;
use crate::error::{missing_reference, Error, Result};
use crate::models::offer_letter::{OfferDecision, OfferLetter, OfferStatus};
use crate::services::drive_service::DriveService;
use crate::utils::validation::validate;
use sqlx::PgPool;
use uuid::Uuid;

const OFFER_COLUMNS: &str = "id, student_id, drive_id, company, role, ctc_lpa, joining_date, \
     letter_path, status, responded_at, created_at";

#[derive(Clone)]
pub struct OfferService {
    pool: PgPool,
    drives: DriveService,
}

impl OfferService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            drives: DriveService::new(pool.clone()),
            pool,
        }
    }

    /// Company, role and CTC fall back to the linked drive when omitted.
    pub async fn issue(&self, payload: CreateOfferPayload) -> Result<OfferLetter> {
        validate(&payload)?;
        let drive = match payload.drive_id {
            Some(id) => Some(self.drives.get(id).await?),
            None => None,
        };

        let company = payload
            .company
            .clone()
            .or_else(|| drive.as_ref().map(|d| d.company.clone()))
            .ok_or_else(|| Error::BadRequest("Company is required.".into()))?;
        let role = payload
            .role
            .clone()
            .or_else(|| drive.as_ref().map(|d| d.role.clone()))
            .ok_or_else(|| Error::BadRequest("Role is required.".into()))?;
        let ctc_lpa = payload.ctc_lpa.or_else(|| drive.as_ref().and_then(|d| d.ctc_lpa));

        let offer = sqlx::query_as::<_, OfferLetter>(&format!(
            r#"
            INSERT INTO offer_letters (student_id, drive_id, company, role, ctc_lpa, joining_date, letter_path, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            OFFER_COLUMNS
        ))
        .bind(payload.student_id)
        .bind(payload.drive_id)
        .bind(&company)
        .bind(&role)
        .bind(ctc_lpa)
        .bind(payload.joining_date)
        .bind(&payload.letter_path)
        .bind(OfferStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(missing_reference)?;

        tracing::info!(offer_id = %offer.id, student_id = %offer.student_id, "Offer letter issued");
        Ok(offer)
    }

    /// Only the receiving student may respond, and only once.
    pub async fn respond(
        &self,
        student_id: Uuid,
        offer_id: Uuid,
        decision: OfferDecision,
    ) -> Result<OfferLetter> {
        let offer = sqlx::query_as::<_, OfferLetter>(&format!(
            "SELECT {} FROM offer_letters WHERE id = $1 AND student_id = $2",
            OFFER_COLUMNS
        ))
        .bind(offer_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Offer not found.".into()))?;

        if !offer.is_pending() {
            return Err(Error::Conflict(
                "This offer has already been responded to.".into(),
            ));
        }

        // The status guard keeps a concurrent second response from overwriting.
        let updated = sqlx::query_as::<_, OfferLetter>(&format!(
            r#"
            UPDATE offer_letters
            SET status = $3, responded_at = NOW()
            WHERE id = $1 AND student_id = $2 AND status = $4
            RETURNING {}
            "#,
            OFFER_COLUMNS
        ))
        .bind(offer_id)
        .bind(student_id)
        .bind(decision.resulting_status().as_str())
        .bind(OfferStatus::Pending.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::Conflict("This offer has already been responded to.".into()))?;

        tracing::info!(offer_id = %offer_id, status = %updated.status, "Offer responded");
        Ok(updated)
    }

    pub async fn list_for_student(&self, student_id: Uuid) -> Result<Vec<OfferLetter>> {
        let items = sqlx::query_as::<_, OfferLetter>(&format!(
            "SELECT {} FROM offer_letters WHERE student_id = $1 ORDER BY created_at DESC",
            OFFER_COLUMNS
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn list_all(&self) -> Result<Vec<OfferLetter>> {
        let items = sqlx::query_as::<_, OfferLetter>(&format!(
            "SELECT {} FROM offer_letters ORDER BY created_at DESC",
            OFFER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}
