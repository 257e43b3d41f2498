use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json, Redirect, Response},
    Form,
};
use uuid::Uuid;

use crate::{
    dto::application_dto::{AdminApplicationQuery, ApplyForm, RoundUpdatePayload},
    error::{PageError, Result},
    middleware::auth::{AdminAuth, RecruiterAuth, SessionContext, StudentAuth},
    models::application::ApplyTarget,
    AppState,
};

/// Form route. A signed-in student owns the application; anonymous drive
/// applications are stored without an owner.
#[axum::debug_handler(state = AppState)]
pub async fn apply(
    State(state): State<AppState>,
    ctx: SessionContext,
    Form(form): Form<ApplyForm>,
) -> std::result::Result<Response, PageError> {
    let target = ApplyTarget::resolve(form.drive_id.as_deref(), form.company_name.as_deref())?;
    state.applications.apply(ctx.student(), target).await?;
    Ok(Redirect::to("/applySuccess.html").into_response())
}

#[axum::debug_handler(state = AppState)]
pub async fn my_applications(
    State(state): State<AppState>,
    StudentAuth(student_id): StudentAuth,
) -> Result<impl IntoResponse> {
    let items = state.applications.list_for_student(student_id).await?;
    Ok(Json(items))
}

#[axum::debug_handler(state = AppState)]
pub async fn my_application_rounds(
    State(state): State<AppState>,
    StudentAuth(student_id): StudentAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let events = state.applications.rounds_for_student(student_id, id).await?;
    Ok(Json(events))
}

#[axum::debug_handler(state = AppState)]
pub async fn admin_list_applications(
    State(state): State<AppState>,
    AdminAuth(_admin_id): AdminAuth,
    Query(query): Query<AdminApplicationQuery>,
) -> Result<impl IntoResponse> {
    let items = state.applications.list_admin(query).await?;
    Ok(Json(items))
}

#[axum::debug_handler(state = AppState)]
pub async fn admin_round_update(
    State(state): State<AppState>,
    AdminAuth(admin_id): AdminAuth,
    Path(id): Path<Uuid>,
    Json(payload): Json<RoundUpdatePayload>,
) -> Result<impl IntoResponse> {
    let updated = state.applications.advance_round(id, admin_id, payload).await?;
    Ok(Json(updated))
}

#[axum::debug_handler(state = AppState)]
pub async fn admin_application_rounds(
    State(state): State<AppState>,
    AdminAuth(_admin_id): AdminAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let events = state.applications.rounds(id).await?;
    Ok(Json(events))
}

#[axum::debug_handler(state = AppState)]
pub async fn admin_drive_applicants(
    State(state): State<AppState>,
    AdminAuth(_admin_id): AdminAuth,
    Path(drive_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.drives.get(drive_id).await?;
    let items = state.applications.applicants(drive_id).await?;
    Ok(Json(items))
}

#[axum::debug_handler(state = AppState)]
pub async fn recruiter_drive_applicants(
    State(state): State<AppState>,
    RecruiterAuth(recruiter_id): RecruiterAuth,
    Path(drive_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let items = state
        .applications
        .applicants_for_recruiter(recruiter_id, drive_id)
        .await?;
    Ok(Json(items))
}
