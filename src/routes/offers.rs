use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::{
    dto::portal_dto::{CreateOfferPayload, RespondOfferPayload},
    error::Result,
    middleware::auth::{AdminAuth, StudentAuth},
    AppState,
};

#[axum::debug_handler(state = AppState)]
pub async fn my_offers(
    State(state): State<AppState>,
    StudentAuth(student_id): StudentAuth,
) -> Result<impl IntoResponse> {
    Ok(Json(state.offers.list_for_student(student_id).await?))
}

#[axum::debug_handler(state = AppState)]
pub async fn respond(
    State(state): State<AppState>,
    StudentAuth(student_id): StudentAuth,
    Path(id): Path<Uuid>,
    Json(payload): Json<RespondOfferPayload>,
) -> Result<impl IntoResponse> {
    let offer = state.offers.respond(student_id, id, payload.decision).await?;
    Ok(Json(offer))
}

#[axum::debug_handler(state = AppState)]
pub async fn admin_list(
    State(state): State<AppState>,
    AdminAuth(_admin_id): AdminAuth,
) -> Result<impl IntoResponse> {
    Ok(Json(state.offers.list_all().await?))
}

#[axum::debug_handler(state = AppState)]
pub async fn admin_issue(
    State(state): State<AppState>,
    AdminAuth(_admin_id): AdminAuth,
    Json(payload): Json<CreateOfferPayload>,
) -> Result<impl IntoResponse> {
    let offer = state.offers.issue(payload).await?;
    Ok((StatusCode::CREATED, Json(offer)))
}
