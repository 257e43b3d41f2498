use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SignupForm {
    #[validate(length(min = 3, message = "Username must be at least 3 characters long."))]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long."))]
    pub password: String,
    #[validate(custom(function = "crate::utils::validation::email_shape"))]
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SigninForm {
    /// Username or email.
    #[serde(alias = "identifier")]
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VerifyCodeForm {
    pub code: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct AdminSignupForm {
    #[validate(length(min = 3, message = "Username must be at least 3 characters long."))]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long."))]
    pub password: String,
    #[validate(custom(function = "crate::utils::validation::email_shape"))]
    pub email: String,
    pub signup_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RecruiterSignupForm {
    #[validate(length(min = 3, message = "Username must be at least 3 characters long."))]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long."))]
    pub password: String,
    #[validate(custom(function = "crate::utils::validation::email_shape"))]
    pub email: String,
    #[validate(length(min = 1, message = "Company name is required."))]
    pub company_name: String,
}

impl SignupForm {
    /// Username and email as they will be stored. Validate after this.
    pub fn trimmed(mut self) -> Self {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_string();
        self
    }
}

impl AdminSignupForm {
    pub fn trimmed(mut self) -> Self {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_string();
        self
    }
}

impl RecruiterSignupForm {
    pub fn trimmed(mut self) -> Self {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_string();
        self.company_name = self.company_name.trim().to_string();
        self
    }
}

/// Outcome of a student sign-in attempt with valid credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigninOutcome {
    Authenticated(Uuid),
    VerificationRequired(Uuid),
}

#[derive(Debug, Clone, Serialize)]
pub struct PrincipalStatus {
    pub authenticated: bool,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
    pub username: Option<String>,
    pub verification_pending: bool,
    pub admin: PrincipalStatus,
    pub recruiter: PrincipalStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(username: &str, password: &str, email: &str) -> SignupForm {
        SignupForm {
            username: username.into(),
            password: password.into(),
            email: email.into(),
        }
    }

    #[test]
    fn valid_signup_passes() {
        assert!(form("alice", "secret1", "a@x.com").validate().is_ok());
    }

    #[test]
    fn short_username_is_rejected() {
        let errs = form("al", "secret1", "a@x.com").validate().unwrap_err();
        assert!(errs.field_errors().contains_key("username"));
    }

    #[test]
    fn padding_does_not_count_towards_username_length() {
        let trimmed = form("   e1", "secret1", " a@x.com ").trimmed();
        assert_eq!(trimmed.username, "e1");
        assert_eq!(trimmed.email, "a@x.com");
        let errs = trimmed.validate().unwrap_err();
        assert!(errs.field_errors().contains_key("username"));
    }

    #[test]
    fn blank_company_is_rejected_after_trimming() {
        let recruiter = RecruiterSignupForm {
            username: "hiring".into(),
            password: "secret1".into(),
            email: "hr@x.com".into(),
            company_name: "   ".into(),
        }
        .trimmed();
        let errs = recruiter.validate().unwrap_err();
        assert!(errs.field_errors().contains_key("company_name"));
    }

    #[test]
    fn short_password_is_rejected() {
        let errs = form("alice", "12345", "a@x.com").validate().unwrap_err();
        assert!(errs.field_errors().contains_key("password"));
    }

    #[test]
    fn malformed_email_is_rejected() {
        let errs = form("alice", "secret1", "a@xcom").validate().unwrap_err();
        assert!(errs.field_errors().contains_key("email"));
    }

    #[test]
    fn missing_fields_deserialize_as_blank() {
        let parsed: SigninForm = serde_json::from_str(r#"{"identifier":"a@x.com"}"#).unwrap();
        assert_eq!(parsed.username, "a@x.com");
        assert!(parsed.password.is_empty());
    }
}
