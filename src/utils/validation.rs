use regex::Regex;
use std::sync::OnceLock;
use validator::{Validate, ValidationError};

pub fn validate<T: Validate>(val: &T) -> Result<(), validator::ValidationErrors> {
    val.validate()
}

fn email_re() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_re().is_match(email)
}

pub fn email_shape(email: &str) -> Result<(), ValidationError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        let mut err = ValidationError::new("email");
        err.message = Some("Please enter a valid email address.".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_basic_addresses() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@dept.univ.edu"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("ax.com"));
        assert!(!is_valid_email("a@xcom"));
        assert!(!is_valid_email("a b@x.com"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email(""));
    }
}
