use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::{
    dto::portal_dto::{BookMentorSessionPayload, CreateMentorPayload, UpdateMentorSessionPayload},
    error::Result,
    middleware::auth::{AdminAuth, StudentAuth},
    AppState,
};

#[axum::debug_handler]
pub async fn list_mentors(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Json(state.mentors.list_active().await?))
}

#[axum::debug_handler(state = AppState)]
pub async fn admin_create_mentor(
    State(state): State<AppState>,
    AdminAuth(_admin_id): AdminAuth,
    Json(payload): Json<CreateMentorPayload>,
) -> Result<impl IntoResponse> {
    let mentor = state.mentors.create(payload).await?;
    Ok((StatusCode::CREATED, Json(mentor)))
}

#[axum::debug_handler(state = AppState)]
pub async fn my_sessions(
    State(state): State<AppState>,
    StudentAuth(student_id): StudentAuth,
) -> Result<impl IntoResponse> {
    Ok(Json(state.mentors.sessions_for_student(student_id).await?))
}

#[axum::debug_handler(state = AppState)]
pub async fn book_session(
    State(state): State<AppState>,
    StudentAuth(student_id): StudentAuth,
    Json(payload): Json<BookMentorSessionPayload>,
) -> Result<impl IntoResponse> {
    let session = state.mentors.book(student_id, payload).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[axum::debug_handler(state = AppState)]
pub async fn admin_list_sessions(
    State(state): State<AppState>,
    AdminAuth(_admin_id): AdminAuth,
) -> Result<impl IntoResponse> {
    Ok(Json(state.mentors.all_sessions().await?))
}

#[axum::debug_handler(state = AppState)]
pub async fn admin_update_session(
    State(state): State<AppState>,
    AdminAuth(_admin_id): AdminAuth,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMentorSessionPayload>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.mentors.update_session(id, payload).await?))
}
