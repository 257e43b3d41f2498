use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    helpdesk_ticket::TicketStatus, interview_slot::SlotStatus, mentor::MentorSessionStatus,
    offer_letter::OfferDecision, student_document::DocumentStatus,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAnnouncementPayload {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    pub priority: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateAnnouncementPayload {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    pub priority: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTicketPayload {
    #[validate(length(min = 1, message = "Subject is required."))]
    pub subject: String,
    #[validate(length(min = 1, message = "Message is required."))]
    pub message: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTicketPayload {
    pub status: TicketStatus,
    pub admin_response: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSlotPayload {
    pub drive_id: Uuid,
    pub student_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub venue: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSlotPayload {
    pub status: Option<SlotStatus>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub venue: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOfferPayload {
    pub student_id: Uuid,
    pub drive_id: Option<Uuid>,
    /// Taken from the drive when omitted.
    #[validate(length(min = 1))]
    pub company: Option<String>,
    #[validate(length(min = 1))]
    pub role: Option<String>,
    pub ctc_lpa: Option<Decimal>,
    pub joining_date: Option<NaiveDate>,
    pub letter_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespondOfferPayload {
    pub decision: OfferDecision,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewDocumentPayload {
    pub status: DocumentStatus,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateMentorPayload {
    #[validate(length(min = 1))]
    pub name: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub expertise: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BookMentorSessionPayload {
    pub mentor_id: Uuid,
    #[validate(length(min = 1, message = "Topic is required."))]
    pub topic: String,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMentorSessionPayload {
    pub status: MentorSessionStatus,
    pub meeting_link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateStoryPayload {
    pub student_name: Option<String>,
    #[validate(length(min = 1, message = "Company name is required."))]
    pub company_name: String,
    #[validate(length(min = 1, message = "Story is required."))]
    pub story: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, message = "Message is required."))]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}
