use crate::dto::profile_dto::ProfileUpdate;
use crate::error::{Error, Result};
use crate::models::account::Profile;
use crate::utils::validation::{is_valid_email, validate};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

const PROFILE_COLUMNS: &str = "id, user_id, full_name, email, phone, resume_path, branch, cgpa, \
     backlogs, batch_year, skills, linkedin_url, view_count, updated_at";

#[derive(Clone)]
pub struct ProfileService {
    pool: PgPool,
}

impl ProfileService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, student_id: Uuid) -> Result<Profile> {
        sqlx::query_as::<_, Profile>(&format!(
            "SELECT {} FROM profiles WHERE user_id = $1",
            PROFILE_COLUMNS
        ))
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Profile not found.".into()))
    }

    /// Overwrites the text fields. The stored resume path changes only when a
    /// new file was uploaded.
    pub async fn update(
        &self,
        student_id: Uuid,
        update: ProfileUpdate,
        resume_path: Option<String>,
    ) -> Result<Profile> {
        check_update(&update)?;

        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"
            UPDATE profiles
            SET
                full_name = $2,
                email = $3,
                phone = $4,
                resume_path = COALESCE($5, resume_path),
                branch = $6,
                cgpa = $7,
                backlogs = COALESCE($8, backlogs),
                batch_year = $9,
                skills = COALESCE($10, skills),
                linkedin_url = $11,
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(student_id)
        .bind(update.full_name.trim())
        .bind(update.email.trim())
        .bind(update.phone.trim())
        .bind(resume_path)
        .bind(blank_to_none(update.branch))
        .bind(update.cgpa)
        .bind(update.backlogs)
        .bind(update.batch_year)
        .bind(update.skills)
        .bind(blank_to_none(update.linkedin_url))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Profile not found.".into()))?;

        tracing::info!(student_id = %student_id, "Profile updated");
        Ok(profile)
    }

    /// Staff view of a student profile; counts as one profile view.
    pub async fn view(&self, student_id: Uuid) -> Result<Profile> {
        sqlx::query_as::<_, Profile>(&format!(
            "UPDATE profiles SET view_count = view_count + 1 WHERE user_id = $1 RETURNING {}",
            PROFILE_COLUMNS
        ))
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Profile not found.".into()))
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_update(update: &ProfileUpdate) -> Result<()> {
    validate(update)?;
    let email = update.email.trim();
    if !email.is_empty() && !is_valid_email(email) {
        return Err(Error::BadRequest("Please enter a valid email address.".into()));
    }
    if let Some(cgpa) = update.cgpa {
        if cgpa < Decimal::ZERO || cgpa > Decimal::TEN {
            return Err(Error::BadRequest("CGPA must be between 0 and 10.".into()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn cgpa_outside_scale_is_rejected() {
        let mut update = ProfileUpdate::default();
        update.cgpa = Some(Decimal::from_str("10.5").unwrap());
        assert!(check_update(&update).is_err());
        update.cgpa = Some(Decimal::from_str("9.75").unwrap());
        assert!(check_update(&update).is_ok());
    }

    #[test]
    fn contact_email_is_optional_but_checked() {
        let mut update = ProfileUpdate::default();
        assert!(check_update(&update).is_ok());
        update.email = "not-an-email".into();
        assert!(check_update(&update).is_err());
    }

    #[test]
    fn negative_backlogs_are_rejected() {
        let update = ProfileUpdate {
            backlogs: Some(-1),
            ..Default::default()
        };
        assert!(matches!(check_update(&update), Err(Error::Validation(_))));
    }
}
