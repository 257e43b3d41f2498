use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::application::{Application, RoundEvent};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApplyForm {
    pub drive_id: Option<String>,
    pub company_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RoundUpdatePayload {
    #[validate(length(min = 1, message = "Round name is required."))]
    pub round_name: String,
    #[validate(length(min = 1, message = "Status is required."))]
    pub status: String,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundUpdateResponse {
    pub application: Application,
    pub event: RoundEvent,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AdminApplicationQuery {
    pub drive_id: Option<Uuid>,
    pub status: Option<String>,
}
