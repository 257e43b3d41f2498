use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid username or password.")]
    InvalidCredentials,

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Expired(String),

    #[error("{0}")]
    Mismatch(String),

    #[error("{0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("Excel export error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

impl Error {
    /// Stable machine-readable kind, sent next to the message in JSON bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::BadRequest(_) | Error::Validation(_) | Error::Json(_) | Error::Multipart(_) => {
                "validation_error"
            }
            Error::Conflict(_) => "conflict",
            Error::InvalidCredentials => "invalid_credentials",
            Error::Unauthenticated(_) => "unauthenticated",
            Error::Forbidden(_) => "unauthorized",
            Error::NotFound(_) => "not_found",
            Error::Expired(_) => "expired",
            Error::Mismatch(_) => "mismatch",
            Error::Upstream(_) | Error::Reqwest(_) => "upstream_failure",
            _ => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) | Error::Validation(_) | Error::Json(_) | Error::Multipart(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::InvalidCredentials | Error::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Expired(_) => StatusCode::GONE,
            Error::Mismatch(_) => StatusCode::BAD_REQUEST,
            Error::Upstream(_) | Error::Reqwest(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show a client. Store and internal failures are logged
    /// here and replaced with a generic text.
    pub fn public_message(&self) -> String {
        match self {
            Error::Database(err) => {
                tracing::error!(error = ?err, "database failure");
                "Internal server error".to_string()
            }
            Error::Reqwest(err) => {
                tracing::warn!(error = ?err, "upstream request failed");
                "External service error".to_string()
            }
            Error::Config(_)
            | Error::Migrate(_)
            | Error::Internal(_)
            | Error::Io(_)
            | Error::Xlsx(_) => {
                tracing::error!(error = %self, "internal failure");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.public_message(), "code": self.code() }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(ref db)
                if db.code().as_deref() == Some(UNIQUE_VIOLATION) =>
            {
                Error::Conflict("Record already exists".to_string())
            }
            other => Error::Database(other),
        }
    }
}

/// Maps an insert that points at a missing drive, student or mentor to
/// `NotFound`; everything else converts as usual.
pub fn missing_reference(err: sqlx::Error) -> Error {
    if is_foreign_key_violation(&err) {
        return Error::NotFound("Referenced record not found.".to_string());
    }
    Error::from(err)
}

pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some(FOREIGN_KEY_VIOLATION))
}

/// Error returned from form-style routes: rendered as an HTML page with a
/// "Go Back" link instead of a JSON body.
#[derive(Debug)]
pub struct PageError(pub Error);

impl From<Error> for PageError {
    fn from(err: Error) -> Self {
        PageError(err)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        let message = self.0.public_message();
        (status, Html(crate::routes::pages::error_page(&message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_distinct_statuses() {
        assert_eq!(Error::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(Error::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::Expired("x".into()).status(), StatusCode::GONE);
        assert_eq!(Error::Mismatch("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(Error::Upstream("x".into()).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(Error::Expired("x".into()).code(), "expired");
        assert_eq!(Error::Mismatch("x".into()).code(), "mismatch");
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let err = Error::Internal("connection string leaked".into());
        assert_eq!(err.public_message(), "Internal server error");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn row_not_found_becomes_not_found() {
        let err: Error = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn credential_failures_share_one_message() {
        assert_eq!(Error::InvalidCredentials.to_string(), "Invalid username or password.");
    }
}
