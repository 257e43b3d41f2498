use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};

use crate::{
    error::Result, middleware::auth::AdminAuth, services::export_service::ExportService, AppState,
};

fn attachment(extension: &str) -> String {
    format!(
        "attachment; filename=\"applications_{}.{}\"",
        chrono::Utc::now().format("%Y%m%d"),
        extension
    )
}

/// Applications report as CSV.
#[axum::debug_handler(state = AppState)]
pub async fn export_applications_csv(
    State(state): State<AppState>,
    AdminAuth(_admin_id): AdminAuth,
) -> Result<impl IntoResponse> {
    let rows = state.applications.report_rows().await?;
    let body = ExportService::render_applications_csv(&rows);
    tracing::info!(rows = rows.len(), "Applications CSV exported");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, attachment("csv")),
        ],
        body,
    ))
}

/// Applications report as XLSX, same columns as the CSV.
#[axum::debug_handler(state = AppState)]
pub async fn export_applications_xlsx(
    State(state): State<AppState>,
    AdminAuth(_admin_id): AdminAuth,
) -> Result<impl IntoResponse> {
    let rows = state.applications.report_rows().await?;
    let buffer = ExportService::generate_applications_xlsx(&rows)?;

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            ),
            (header::CONTENT_DISPOSITION, attachment("xlsx")),
        ],
        buffer,
    ))
}
