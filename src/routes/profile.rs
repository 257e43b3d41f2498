use axum::{
    extract::{Multipart, Path, State},
    response::{Html, IntoResponse, Json, Redirect, Response},
};
use serde_json::json;
use std::str::FromStr;
use uuid::Uuid;

use crate::{
    dto::profile_dto::ProfileUpdate,
    error::{Error, PageError, Result},
    middleware::auth::{AdminAuth, RecruiterAuth, SessionContext, StudentAuth},
    models::session::PrincipalKind,
    services::storage_service::UploadKind,
    AppState,
};

/// The profile page is only served to signed-in students.
#[axum::debug_handler(state = AppState)]
pub async fn profile_page(State(state): State<AppState>, ctx: SessionContext) -> Result<Response> {
    if ctx.student().is_none() {
        return Ok(Redirect::to("/signin.html").into_response());
    }
    let page = tokio::fs::read_to_string(state.public_dir.join("profile.html"))
        .await
        .map_err(|_| Error::NotFound("Profile page not found.".into()))?;
    Ok(Html(page).into_response())
}

#[axum::debug_handler(state = AppState)]
pub async fn profile_data(
    State(state): State<AppState>,
    StudentAuth(student_id): StudentAuth,
) -> Result<impl IntoResponse> {
    let account = state
        .identity
        .find_account(student_id)
        .await?
        .ok_or_else(|| Error::NotFound("Account not found.".into()))?;
    let profile = state.profiles.get(student_id).await?;
    Ok(Json(json!({
        "username": account.username,
        "account_email": account.email,
        "profile": profile,
    })))
}

/// Multipart profile form. The resume part is optional; without it the
/// stored resume stays.
#[axum::debug_handler(state = AppState)]
pub async fn update_profile(
    State(state): State<AppState>,
    ctx: SessionContext,
    mut multipart: Multipart,
) -> std::result::Result<Response, PageError> {
    let student_id = ctx.require(PrincipalKind::Student)?;

    let mut update = ProfileUpdate::default();
    let mut resume_path = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::BadRequest(e.to_string()))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        if field_name == "resume" {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field.bytes().await.map_err(Error::from)?;
            if filename.is_empty() || data.is_empty() {
                continue;
            }
            resume_path = Some(
                state
                    .storage
                    .store(UploadKind::Resume, &filename, &data)
                    .await?,
            );
            continue;
        }

        let value = field.text().await.map_err(Error::from)?;
        match field_name.as_str() {
            "full_name" => update.full_name = value,
            "email" => update.email = value,
            "phone" => update.phone = value,
            "branch" => update.branch = Some(value),
            "cgpa" => update.cgpa = parse_optional(&value, "CGPA")?,
            "backlogs" => update.backlogs = parse_optional(&value, "Backlogs")?,
            "batch_year" => update.batch_year = parse_optional(&value, "Batch year")?,
            "skills" => update.skills = Some(value),
            "linkedin_url" => update.linkedin_url = Some(value),
            _ => {}
        }
    }

    state.profiles.update(student_id, update, resume_path).await?;
    Ok(Redirect::to("/profile.html").into_response())
}

fn parse_optional<T: FromStr>(raw: &str, label: &str) -> Result<Option<T>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| Error::BadRequest(format!("{} must be a number.", label)))
}

#[axum::debug_handler(state = AppState)]
pub async fn admin_view_profile(
    State(state): State<AppState>,
    AdminAuth(_admin_id): AdminAuth,
    Path(student_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let profile = state.profiles.view(student_id).await?;
    Ok(Json(profile))
}

/// Recruiters see profiles of students who applied to one of their drives.
#[axum::debug_handler(state = AppState)]
pub async fn recruiter_view_profile(
    State(state): State<AppState>,
    RecruiterAuth(recruiter_id): RecruiterAuth,
    Path(student_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    if !state
        .applications
        .student_applied_to_recruiter(recruiter_id, student_id)
        .await?
    {
        return Err(Error::Forbidden(
            "This student has not applied to any of your drives.".into(),
        ));
    }
    let profile = state.profiles.view(student_id).await?;
    Ok(Json(profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn blank_numbers_are_absent() {
        assert_eq!(parse_optional::<i32>("  ", "Backlogs").unwrap(), None);
        assert_eq!(parse_optional::<i32>("2", "Backlogs").unwrap(), Some(2));
        assert_eq!(
            parse_optional::<Decimal>("8.25", "CGPA").unwrap(),
            Some(Decimal::new(825, 2))
        );
        assert!(parse_optional::<i32>("two", "Backlogs").is_err());
    }
}
