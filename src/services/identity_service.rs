use std::sync::Arc;

use sqlx::PgPool;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::dto::auth_dto::{
    AdminSignupForm, RecruiterSignupForm, SigninForm, SigninOutcome, SignupForm,
};
use crate::error::{Error, Result};
use crate::models::account::{Account, STUDENT_ROLE};
use crate::models::staff::{AdminAccount, RecruiterAccount};
use crate::services::mail_service::{deliver_code, Mailer};
use crate::services::verification::{check_code, issue_code};
use crate::utils::crypto::{dummy_hash, hash_password, verify_password};
use crate::utils::time::now;
use crate::utils::validation::validate;

const ACCOUNT_COLUMNS: &str = "id, username, email, password_hash, is_verified, \
     verification_code, code_expiry, role, created_at";

/// Result of a student signup.
#[derive(Debug, Clone, Copy)]
pub struct Registration {
    pub account_id: Uuid,
    pub email_sent: bool,
}

#[derive(Clone)]
pub struct IdentityService {
    pool: PgPool,
    mailer: Arc<dyn Mailer>,
}

impl IdentityService {
    pub fn new(pool: PgPool, mailer: Arc<dyn Mailer>) -> Self {
        Self { pool, mailer }
    }

    pub async fn register(&self, form: SignupForm) -> Result<Registration> {
        let form = form.trimmed();
        validate(&form)?;
        let username = form.username.clone();
        let email = form.email.clone();

        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 OR email = $2)",
        )
        .bind(&username)
        .bind(&email)
        .fetch_one(&self.pool)
        .await?;
        if taken {
            return Err(Error::Conflict("Username or email already exists.".into()));
        }

        let password_hash = hash(&form.password)?;
        let issued = issue_code(now());

        let mut tx = self.pool.begin().await?;
        let account_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, email, password_hash, is_verified, verification_code, code_expiry, role)
            VALUES ($1, $2, $3, FALSE, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&username)
        .bind(&email)
        .bind(&password_hash)
        .bind(&issued.code)
        .bind(issued.expires_at)
        .bind(STUDENT_ROLE)
        .fetch_one(&mut *tx)
        .await
        .map_err(duplicate_identity)?;

        sqlx::query("INSERT INTO profiles (user_id) VALUES ($1)")
            .bind(account_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(account_id = %account_id, username = %username, "Student registered");

        let email_sent = deliver_code(self.mailer.as_ref(), &email, &issued.code, &username).await;
        Ok(Registration {
            account_id,
            email_sent,
        })
    }

    pub async fn verify(&self, account_id: Uuid, code: &str) -> Result<()> {
        // The row lock keeps a concurrent resend from replacing the code
        // between the check and the update.
        let mut tx = self.pool.begin().await?;
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM users WHERE id = $1 FOR UPDATE",
            ACCOUNT_COLUMNS
        ))
        .bind(account_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound("Account not found.".into()))?;

        check_code(account.pending_code(), code, now())?;

        sqlx::query(
            r#"
            UPDATE users
            SET is_verified = TRUE, verification_code = NULL, code_expiry = NULL
            WHERE id = $1
            "#,
        )
        .bind(account_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::info!(account_id = %account_id, "Student account verified");
        Ok(())
    }

    /// Replaces the outstanding code. The new code is stored even when the
    /// email cannot be delivered; the failure is still reported.
    pub async fn resend(&self, account_id: Uuid) -> Result<()> {
        let account = self
            .find_account(account_id)
            .await?
            .ok_or_else(|| Error::NotFound("Account not found.".into()))?;
        if account.is_verified {
            return Err(Error::Conflict("Account is already verified.".into()));
        }

        let issued = issue_code(now());
        // Verification may have committed since the read above.
        let result = sqlx::query(
            "UPDATE users SET verification_code = $2, code_expiry = $3 \
             WHERE id = $1 AND is_verified = FALSE",
        )
        .bind(account_id)
        .bind(&issued.code)
        .bind(issued.expires_at)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Error::Conflict("Account is already verified.".into()));
        }

        let sent = deliver_code(
            self.mailer.as_ref(),
            &account.email,
            &issued.code,
            &account.username,
        )
        .await;
        if !sent {
            return Err(Error::Upstream(
                "Failed to send verification email. Please try again later.".into(),
            ));
        }
        Ok(())
    }

    /// Unknown identifier and wrong password fail identically, and both paths
    /// run one password verification.
    pub async fn signin(&self, form: SigninForm) -> Result<SigninOutcome> {
        let identifier = form.username.trim();
        if identifier.is_empty() || form.password.is_empty() {
            return Err(Error::BadRequest(
                "Username and password are required.".into(),
            ));
        }

        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM users WHERE username = $1 OR email = $1 LIMIT 1",
            ACCOUNT_COLUMNS
        ))
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;

        let Some(account) = account else {
            let _ = verify_password(&form.password, dummy_hash());
            return Err(Error::InvalidCredentials);
        };
        if !check_password(&form.password, &account.password_hash)? {
            return Err(Error::InvalidCredentials);
        }

        if account.is_verified {
            tracing::info!(account_id = %account.id, "Student signed in");
            Ok(SigninOutcome::Authenticated(account.id))
        } else {
            Ok(SigninOutcome::VerificationRequired(account.id))
        }
    }

    pub async fn find_account(&self, account_id: Uuid) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    pub async fn admin_signup(
        &self,
        form: AdminSignupForm,
        signup_key: Option<&str>,
    ) -> Result<Uuid> {
        let form = form.trimmed();
        validate(&form)?;
        if let Some(expected) = signup_key {
            let supplied = form.signup_key.as_deref().unwrap_or_default();
            let ok: bool = expected.as_bytes().ct_eq(supplied.as_bytes()).into();
            if !ok {
                return Err(Error::Forbidden("Invalid admin signup key.".into()));
            }
        }

        let password_hash = hash(&form.password)?;
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO admins (username, email, password_hash) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&form.username)
        .bind(&form.email)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(duplicate_identity)?;

        tracing::info!(admin_id = %id, "Admin registered");
        Ok(id)
    }

    pub async fn admin_signin(&self, form: SigninForm) -> Result<Uuid> {
        let admin = sqlx::query_as::<_, AdminAccount>(
            "SELECT id, username, email, password_hash, created_at FROM admins \
             WHERE username = $1 OR email = $1 LIMIT 1",
        )
        .bind(form.username.trim())
        .fetch_optional(&self.pool)
        .await?;

        let Some(admin) = admin else {
            let _ = verify_password(&form.password, dummy_hash());
            return Err(Error::InvalidCredentials);
        };
        if !check_password(&form.password, &admin.password_hash)? {
            return Err(Error::InvalidCredentials);
        }
        tracing::info!(admin_id = %admin.id, "Admin signed in");
        Ok(admin.id)
    }

    pub async fn find_admin(&self, admin_id: Uuid) -> Result<Option<AdminAccount>> {
        let admin = sqlx::query_as::<_, AdminAccount>(
            "SELECT id, username, email, password_hash, created_at FROM admins WHERE id = $1",
        )
        .bind(admin_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(admin)
    }

    pub async fn recruiter_signup(&self, form: RecruiterSignupForm) -> Result<Uuid> {
        let form = form.trimmed();
        validate(&form)?;
        let password_hash = hash(&form.password)?;
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO recruiters (username, email, password_hash, company_name, is_verified)
            VALUES ($1, $2, $3, $4, TRUE)
            RETURNING id
            "#,
        )
        .bind(&form.username)
        .bind(&form.email)
        .bind(&password_hash)
        .bind(&form.company_name)
        .fetch_one(&self.pool)
        .await
        .map_err(duplicate_identity)?;

        tracing::info!(recruiter_id = %id, "Recruiter registered");
        Ok(id)
    }

    pub async fn recruiter_signin(&self, form: SigninForm) -> Result<Uuid> {
        let recruiter = sqlx::query_as::<_, RecruiterAccount>(
            "SELECT id, username, email, password_hash, company_name, is_verified, created_at \
             FROM recruiters WHERE username = $1 OR email = $1 LIMIT 1",
        )
        .bind(form.username.trim())
        .fetch_optional(&self.pool)
        .await?;

        let Some(recruiter) = recruiter else {
            let _ = verify_password(&form.password, dummy_hash());
            return Err(Error::InvalidCredentials);
        };
        if !check_password(&form.password, &recruiter.password_hash)? {
            return Err(Error::InvalidCredentials);
        }
        tracing::info!(recruiter_id = %recruiter.id, "Recruiter signed in");
        Ok(recruiter.id)
    }

    pub async fn find_recruiter(&self, recruiter_id: Uuid) -> Result<Option<RecruiterAccount>> {
        let recruiter = sqlx::query_as::<_, RecruiterAccount>(
            "SELECT id, username, email, password_hash, company_name, is_verified, created_at \
             FROM recruiters WHERE id = $1",
        )
        .bind(recruiter_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(recruiter)
    }
}

fn hash(plain: &str) -> Result<String> {
    hash_password(plain).map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))
}

fn check_password(plain: &str, stored: &str) -> Result<bool> {
    verify_password(plain, stored)
        .map_err(|e| Error::Internal(format!("Stored password hash is unreadable: {}", e)))
}

/// The unique constraints back up the pre-check when two signups race.
fn duplicate_identity(err: sqlx::Error) -> Error {
    match Error::from(err) {
        Error::Conflict(_) => Error::Conflict("Username or email already exists.".into()),
        other => other,
    }
}
