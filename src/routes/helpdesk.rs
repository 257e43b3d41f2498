use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::{
    dto::portal_dto::{CreateTicketPayload, UpdateTicketPayload},
    error::Result,
    middleware::auth::{AdminAuth, StudentAuth},
    AppState,
};

#[axum::debug_handler(state = AppState)]
pub async fn my_tickets(
    State(state): State<AppState>,
    StudentAuth(student_id): StudentAuth,
) -> Result<impl IntoResponse> {
    Ok(Json(state.tickets.list_for_student(student_id).await?))
}

#[axum::debug_handler(state = AppState)]
pub async fn open_ticket(
    State(state): State<AppState>,
    StudentAuth(student_id): StudentAuth,
    Json(payload): Json<CreateTicketPayload>,
) -> Result<impl IntoResponse> {
    let ticket = state.tickets.open(student_id, payload).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

#[axum::debug_handler(state = AppState)]
pub async fn admin_list(
    State(state): State<AppState>,
    AdminAuth(_admin_id): AdminAuth,
) -> Result<impl IntoResponse> {
    Ok(Json(state.tickets.list_all().await?))
}

#[axum::debug_handler(state = AppState)]
pub async fn admin_update(
    State(state): State<AppState>,
    AdminAuth(_admin_id): AdminAuth,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTicketPayload>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.tickets.update(id, payload).await?))
}
