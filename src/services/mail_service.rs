//! Verification-code email.
//!
//! [`Mailer`] is the seam the identity flows talk to. [`SmtpMailer`] sends
//! through `lettre`'s async SMTP transport; [`LogMailer`] is used when no SMTP
//! host is configured and only writes the code to the log.

use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::SmtpConfig;
use crate::services::verification::CODE_TTL_MINUTES;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Email build error: {0}")]
    Build(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification_code(
        &self,
        to: &str,
        code: &str,
        display_name: &str,
    ) -> Result<(), MailError>;
}

pub struct VerificationEmail {
    pub subject: String,
    pub body: String,
}

pub fn compose_verification_email(code: &str, display_name: &str) -> VerificationEmail {
    VerificationEmail {
        subject: "Your placement portal verification code".to_string(),
        body: format!(
            "Hello {},\n\nYour verification code is: {}\n\nThe code expires in {} minutes. \
             If you did not sign up for the placement portal, ignore this email.\n",
            display_name, code, CODE_TTL_MINUTES
        ),
    }
}

pub struct SmtpMailer {
    from_address: String,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port);
        if let (Some(user), Some(pass)) = (&config.user, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }
        Ok(Self {
            from_address: config.from_address.clone(),
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_verification_code(
        &self,
        to: &str,
        code: &str,
        display_name: &str,
    ) -> Result<(), MailError> {
        let mail = compose_verification_email(code, display_name);
        let message = Message::builder()
            .from(self.from_address.parse()?)
            .to(to.parse()?)
            .subject(mail.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body)
            .map_err(|e| MailError::Build(e.to_string()))?;
        self.transport.send(message).await?;
        tracing::info!(to = to, "Verification email sent");
        Ok(())
    }
}

pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification_code(
        &self,
        to: &str,
        code: &str,
        display_name: &str,
    ) -> Result<(), MailError> {
        tracing::info!(to = to, name = display_name, code = code, "SMTP not configured; verification code");
        Ok(())
    }
}

/// Sends the code and reports whether it went out. Failures are logged, never
/// propagated: the caller's primary operation has already been committed.
pub async fn deliver_code(mailer: &dyn Mailer, to: &str, code: &str, display_name: &str) -> bool {
    match mailer.send_verification_code(to, code, display_name).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(to = to, error = %e, "Verification email delivery failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_carries_code_and_name() {
        let mail = compose_verification_email("007311", "alice");
        assert!(mail.body.contains("007311"));
        assert!(mail.body.contains("Hello alice"));
        assert!(mail.body.contains("10 minutes"));
    }

    #[tokio::test]
    async fn delivery_success_is_reported() {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send_verification_code()
            .withf(|to, code, name| to == "a@x.com" && code == "123456" && name == "alice")
            .times(1)
            .returning(|_, _, _| Ok(()));
        assert!(deliver_code(&mailer, "a@x.com", "123456", "alice").await);
    }

    #[tokio::test]
    async fn delivery_failure_is_reported_not_raised() {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send_verification_code()
            .times(1)
            .returning(|_, _, _| Err(MailError::Build("relay down".into())));
        assert!(!deliver_code(&mailer, "a@x.com", "123456", "alice").await);
    }
}
