use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub session_secret: String,
    pub session_ttl_hours: i64,
    pub cookie_secure: bool,
    pub uploads_dir: String,
    pub public_dir: String,
    pub auth_rps: u32,
    pub api_rps: u32,
    pub admin_signup_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub smtp: Option<SmtpConfig>,
    pub log_format: LogFormat,
}

/// Outgoing mail settings. Absent when `SMTP_HOST` is not set, in which case
/// verification codes are written to the log instead of being mailed.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub from_address: String,
    pub user: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Plain,
    Json,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_FROM_ADDRESS: &str = "placements@campus.local";

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            session_secret: get_env("SESSION_SECRET")?,
            session_ttl_hours: get_env_parse_or("SESSION_TTL_HOURS", 24)?,
            cookie_secure: get_env_parse_or("COOKIE_SECURE", false)?,
            uploads_dir: get_env_or("UPLOADS_DIR", "./uploads"),
            public_dir: get_env_or("PUBLIC_DIR", "./public"),
            auth_rps: get_env_parse_or("AUTH_RPS", 20)?,
            api_rps: get_env_parse_or("API_RPS", 200)?,
            admin_signup_key: get_env_opt("ADMIN_SIGNUP_KEY"),
            openai_api_key: get_env_opt("OPENAI_API_KEY"),
            openai_model: get_env_or("OPENAI_MODEL", "gpt-4o-mini"),
            openai_base_url: get_env_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            smtp: SmtpConfig::from_env()?,
            log_format: match get_env_or("LOG_FORMAT", "plain").to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                _ => LogFormat::Plain,
            },
        })
    }
}

impl SmtpConfig {
    fn from_env() -> Result<Option<Self>> {
        let Some(host) = get_env_opt("SMTP_HOST") else {
            return Ok(None);
        };
        Ok(Some(Self {
            host,
            port: get_env_parse_or("SMTP_PORT", DEFAULT_SMTP_PORT)?,
            from_address: get_env_or("SMTP_FROM", DEFAULT_FROM_ADDRESS),
            user: get_env_opt("SMTP_USER"),
            password: get_env_opt("SMTP_PASSWORD"),
        }))
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or(name: &str, default: &str) -> String {
    get_env_opt(name).unwrap_or_else(|| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_opt(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
