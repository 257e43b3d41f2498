use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::{
    dto::drive_dto::{AdminDriveQuery, CreateDrivePayload, DriveListQuery, UpdateDrivePayload},
    error::Result,
    middleware::auth::{AdminAuth, RecruiterAuth, StudentAuth},
    services::drive_service::DriveCreator,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/drives",
    params(
        ("company" = Option<String>, Query, description = "Company name contains (case-sensitive)"),
        ("role" = Option<String>, Query, description = "Role contains (case-sensitive)"),
        ("job_type" = Option<String>, Query, description = "Exact job type"),
        ("branch" = Option<String>, Query, description = "Branch listed as eligible"),
        ("batch_year" = Option<i32>, Query, description = "Graduation batch")
    ),
    responses(
        (status = 200, description = "Published drives with an open deadline, earliest deadline first")
    )
)]
#[axum::debug_handler]
pub async fn list_drives(
    State(state): State<AppState>,
    Query(query): Query<DriveListQuery>,
) -> Result<impl IntoResponse> {
    let drives = state.drives.list_open(query).await?;
    Ok(Json(drives))
}

#[utoipa::path(
    get,
    path = "/api/drives/eligible",
    responses(
        (status = 200, description = "Open drives the signed-in student is eligible for"),
        (status = 401, description = "Not signed in")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn list_eligible_drives(
    State(state): State<AppState>,
    StudentAuth(student_id): StudentAuth,
) -> Result<impl IntoResponse> {
    let profile = state.profiles.get(student_id).await?;
    let drives = state.drives.list_eligible(&profile).await?;
    Ok(Json(drives))
}

#[utoipa::path(
    get,
    path = "/api/drives/{id}",
    params(
        ("id" = Uuid, Path, description = "Drive ID")
    ),
    responses(
        (status = 200, description = "Published drive"),
        (status = 404, description = "Drive not found or not published")
    )
)]
#[axum::debug_handler]
pub async fn get_drive(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let drive = state.drives.get_published(id).await?;
    Ok(Json(drive))
}

#[utoipa::path(
    post,
    path = "/api/admin/drives",
    request_body = CreateDrivePayload,
    responses(
        (status = 201, description = "Drive created"),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Admin session required")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn admin_create_drive(
    State(state): State<AppState>,
    AdminAuth(admin_id): AdminAuth,
    Json(payload): Json<CreateDrivePayload>,
) -> Result<impl IntoResponse> {
    let drive = state
        .drives
        .create(DriveCreator::Admin(admin_id), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(drive)))
}

#[utoipa::path(
    get,
    path = "/api/admin/drives",
    params(
        ("status" = Option<String>, Query, description = "Filter by status")
    ),
    responses(
        (status = 200, description = "All drives, newest first")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn admin_list_drives(
    State(state): State<AppState>,
    AdminAuth(_admin_id): AdminAuth,
    Query(query): Query<AdminDriveQuery>,
) -> Result<impl IntoResponse> {
    let drives = state.drives.list_admin(query).await?;
    Ok(Json(drives))
}

#[axum::debug_handler(state = AppState)]
pub async fn admin_get_drive(
    State(state): State<AppState>,
    AdminAuth(_admin_id): AdminAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let drive = state.drives.get(id).await?;
    Ok(Json(drive))
}

#[utoipa::path(
    patch,
    path = "/api/admin/drives/{id}",
    params(
        ("id" = Uuid, Path, description = "Drive ID")
    ),
    request_body = UpdateDrivePayload,
    responses(
        (status = 200, description = "Drive updated"),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Drive not found")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn admin_update_drive(
    State(state): State<AppState>,
    AdminAuth(_admin_id): AdminAuth,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDrivePayload>,
) -> Result<impl IntoResponse> {
    let drive = state.drives.update(id, payload).await?;
    Ok(Json(drive))
}

#[utoipa::path(
    delete,
    path = "/api/admin/drives/{id}",
    params(
        ("id" = Uuid, Path, description = "Drive ID")
    ),
    responses(
        (status = 204, description = "Drive deleted"),
        (status = 404, description = "Drive not found"),
        (status = 409, description = "Drive has applications")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn admin_delete_drive(
    State(state): State<AppState>,
    AdminAuth(_admin_id): AdminAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.drives.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Recruiter drives are created in `pending_approval`.
#[axum::debug_handler(state = AppState)]
pub async fn recruiter_create_drive(
    State(state): State<AppState>,
    RecruiterAuth(recruiter_id): RecruiterAuth,
    Json(payload): Json<CreateDrivePayload>,
) -> Result<impl IntoResponse> {
    let drive = state
        .drives
        .create(DriveCreator::Recruiter(recruiter_id), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(drive)))
}

#[axum::debug_handler(state = AppState)]
pub async fn recruiter_list_drives(
    State(state): State<AppState>,
    RecruiterAuth(recruiter_id): RecruiterAuth,
) -> Result<impl IntoResponse> {
    let drives = state.drives.list_by_recruiter(recruiter_id).await?;
    Ok(Json(drives))
}
