use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::{
    dto::portal_dto::ReviewDocumentPayload,
    error::{Error, Result},
    middleware::auth::{AdminAuth, StudentAuth},
    services::storage_service::UploadKind,
    AppState,
};

#[axum::debug_handler(state = AppState)]
pub async fn my_documents(
    State(state): State<AppState>,
    StudentAuth(student_id): StudentAuth,
) -> Result<impl IntoResponse> {
    Ok(Json(state.documents.list_for_student(student_id).await?))
}

/// Multipart upload with a `doc_type` text part and a `file` part.
#[axum::debug_handler(state = AppState)]
pub async fn upload(
    State(state): State<AppState>,
    StudentAuth(student_id): StudentAuth,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut doc_type: Option<String> = None;
    let mut file: Option<(String, bytes::Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::BadRequest(e.to_string()))?
    {
        match field.name() {
            Some("doc_type") => doc_type = Some(field.text().await?.trim().to_string()),
            Some("file") => {
                let filename = field.file_name().unwrap_or("document.bin").to_string();
                let data = field.bytes().await?;
                file = Some((filename, data));
            }
            _ => {}
        }
    }

    let doc_type = doc_type
        .filter(|d| !d.is_empty())
        .ok_or_else(|| Error::BadRequest("Document type is required.".into()))?;
    let (filename, data) = file.ok_or_else(|| Error::BadRequest("No file uploaded.".into()))?;

    let path = state
        .storage
        .store(UploadKind::Document, &filename, &data)
        .await?;
    let document = state
        .documents
        .record(student_id, &doc_type, &path, Some(&filename))
        .await?;
    Ok((StatusCode::CREATED, Json(document)))
}

#[axum::debug_handler(state = AppState)]
pub async fn admin_list(
    State(state): State<AppState>,
    AdminAuth(_admin_id): AdminAuth,
) -> Result<impl IntoResponse> {
    Ok(Json(state.documents.list_all().await?))
}

#[axum::debug_handler(state = AppState)]
pub async fn admin_review(
    State(state): State<AppState>,
    AdminAuth(admin_id): AdminAuth,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewDocumentPayload>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.documents.review(admin_id, id, payload).await?))
}
