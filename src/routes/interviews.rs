use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::{
    dto::portal_dto::{CreateSlotPayload, UpdateSlotPayload},
    error::Result,
    middleware::auth::{AdminAuth, StudentAuth},
    AppState,
};

#[axum::debug_handler(state = AppState)]
pub async fn my_slots(
    State(state): State<AppState>,
    StudentAuth(student_id): StudentAuth,
) -> Result<impl IntoResponse> {
    Ok(Json(state.interviews.list_for_student(student_id).await?))
}

#[axum::debug_handler(state = AppState)]
pub async fn admin_list(
    State(state): State<AppState>,
    AdminAuth(_admin_id): AdminAuth,
) -> Result<impl IntoResponse> {
    Ok(Json(state.interviews.list_all().await?))
}

#[axum::debug_handler(state = AppState)]
pub async fn admin_schedule(
    State(state): State<AppState>,
    AdminAuth(admin_id): AdminAuth,
    Json(payload): Json<CreateSlotPayload>,
) -> Result<impl IntoResponse> {
    let slot = state.interviews.schedule(admin_id, payload).await?;
    Ok((StatusCode::CREATED, Json(slot)))
}

#[axum::debug_handler(state = AppState)]
pub async fn admin_update(
    State(state): State<AppState>,
    AdminAuth(_admin_id): AdminAuth,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSlotPayload>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.interviews.update(id, payload).await?))
}
