pub mod app;
pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::services::{
    ai_service::AIService,
    announcement_service::AnnouncementService,
    application_service::ApplicationService,
    document_service::DocumentService,
    drive_service::DriveService,
    identity_service::IdentityService,
    interview_service::InterviewService,
    mail_service::{LogMailer, Mailer, SmtpMailer},
    mentor_service::MentorService,
    offer_service::OfferService,
    profile_service::ProfileService,
    session_service::SessionService,
    storage_service::FileStorage,
    story_service::StoryService,
    ticket_service::TicketService,
};
use reqwest::Client;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub identity: IdentityService,
    pub sessions: SessionService,
    pub drives: DriveService,
    pub applications: ApplicationService,
    pub profiles: ProfileService,
    pub announcements: AnnouncementService,
    pub tickets: TicketService,
    pub interviews: InterviewService,
    pub offers: OfferService,
    pub documents: DocumentService,
    pub mentors: MentorService,
    pub stories: StoryService,
    pub ai: AIService,
    pub storage: FileStorage,
    pub public_dir: PathBuf,
    pub cookie_secure: bool,
    pub admin_signup_key: Option<String>,
}

impl AppState {
    /// Mails through SMTP when configured, otherwise logs the codes.
    pub fn new(pool: PgPool) -> Result<Self> {
        let mailer: Arc<dyn Mailer> = match &crate::config::get_config().smtp {
            Some(smtp) => Arc::new(
                SmtpMailer::new(smtp).map_err(|e| Error::Config(format!("SMTP setup: {}", e)))?,
            ),
            None => {
                tracing::warn!("SMTP_HOST not set, verification codes will only be logged");
                Arc::new(LogMailer)
            }
        };
        Self::with_mailer(pool, mailer)
    }

    pub fn with_mailer(pool: PgPool, mailer: Arc<dyn Mailer>) -> Result<Self> {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;

        Ok(Self {
            identity: IdentityService::new(pool.clone(), mailer),
            sessions: SessionService::new(
                pool.clone(),
                config.session_secret.clone(),
                config.session_ttl_hours,
            ),
            drives: DriveService::new(pool.clone()),
            applications: ApplicationService::new(pool.clone()),
            profiles: ProfileService::new(pool.clone()),
            announcements: AnnouncementService::new(pool.clone()),
            tickets: TicketService::new(pool.clone()),
            interviews: InterviewService::new(pool.clone()),
            offers: OfferService::new(pool.clone()),
            documents: DocumentService::new(pool.clone()),
            mentors: MentorService::new(pool.clone()),
            stories: StoryService::new(pool.clone()),
            ai: AIService::new(
                http_client,
                config.openai_api_key.clone(),
                config.openai_model.clone(),
                config.openai_base_url.clone(),
            ),
            storage: FileStorage::new(&config.uploads_dir),
            public_dir: PathBuf::from(&config.public_dir),
            cookie_secure: config.cookie_secure,
            admin_signup_key: config.admin_signup_key.clone(),
            pool,
        })
    }
}
