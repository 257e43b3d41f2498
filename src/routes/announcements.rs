use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::{
    dto::portal_dto::{CreateAnnouncementPayload, UpdateAnnouncementPayload},
    error::Result,
    middleware::auth::AdminAuth,
    AppState,
};

/// Public feed: visible announcements, high priority first.
#[axum::debug_handler]
pub async fn feed(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let items = state.announcements.feed().await?;
    Ok(Json(items))
}

#[axum::debug_handler(state = AppState)]
pub async fn admin_list(
    State(state): State<AppState>,
    AdminAuth(_admin_id): AdminAuth,
) -> Result<impl IntoResponse> {
    let items = state.announcements.list_all().await?;
    Ok(Json(items))
}

#[axum::debug_handler(state = AppState)]
pub async fn admin_create(
    State(state): State<AppState>,
    AdminAuth(admin_id): AdminAuth,
    Json(payload): Json<CreateAnnouncementPayload>,
) -> Result<impl IntoResponse> {
    let announcement = state.announcements.create(admin_id, payload).await?;
    Ok((StatusCode::CREATED, Json(announcement)))
}

#[axum::debug_handler(state = AppState)]
pub async fn admin_update(
    State(state): State<AppState>,
    AdminAuth(_admin_id): AdminAuth,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAnnouncementPayload>,
) -> Result<impl IntoResponse> {
    let announcement = state.announcements.update(id, payload).await?;
    Ok(Json(announcement))
}
