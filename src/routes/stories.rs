use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};

use crate::{
    dto::portal_dto::CreateStoryPayload, error::Result, middleware::auth::StudentAuth, AppState,
};

#[axum::debug_handler]
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Json(state.stories.list().await?))
}

#[axum::debug_handler(state = AppState)]
pub async fn share(
    State(state): State<AppState>,
    StudentAuth(student_id): StudentAuth,
    Json(payload): Json<CreateStoryPayload>,
) -> Result<impl IntoResponse> {
    let author = state
        .identity
        .find_account(student_id)
        .await?
        .map(|a| (a.id, a.username));
    let story = state.stories.share(author, payload).await?;
    Ok((StatusCode::CREATED, Json(story)))
}
