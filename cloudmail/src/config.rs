//! Process configuration, read once from the environment before serving.
//!
//! | Variable | Required | Default |
//! |----------|----------|---------|
//! | `GROQ_API_KEY` | Yes | |
//! | `EMAIL_USER` | Yes | |
//! | `EMAIL_PASS` | Yes | |
//! | `ORIGIN` | Yes | |
//! | `PORT` | No | 3001 |
//! | `GROQ_MODEL` | No | `llama3-8b-8192` |
//! | `GROQ_API_BASE` | No | `https://api.groq.com/openai/v1` |
//! | `GROQ_TIMEOUT_SECS` | No | 30 |
//! | `SMTP_HOST` | No | `smtp.gmail.com` |
//! | `SMTP_PORT` | No | 587 |
//! | `SMTP_TLS` | No | `starttls` |
//! | `SMTP_TIMEOUT_SECS` | No | 10 |

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::generation::GroqConfig;
use crate::mail::MailerConfig;

pub use config::ConfigError;

pub trait EnvConfig: Sized {
    fn from_env() -> Result<Self, ConfigError>;
}

impl<D> EnvConfig for D
where
    D: DeserializeOwned,
{
    fn from_env() -> Result<Self, ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::default())
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] ConfigError),
}

/// Environment as read, before required keys are checked.
#[derive(Debug, Deserialize)]
pub struct RawConfig {
    pub groq_api_key: Option<String>,
    pub email_user: Option<String>,
    pub email_pass: Option<String>,
    pub origin: Option<String>,

    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_groq_model")]
    pub groq_model: String,
    #[serde(default = "default_groq_api_base")]
    pub groq_api_base: String,
    #[serde(default = "default_groq_timeout")]
    pub groq_timeout_secs: u64,
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default = "default_smtp_tls")]
    pub smtp_tls: String,
    #[serde(default = "default_smtp_timeout")]
    pub smtp_timeout_secs: u64,
}

fn default_port() -> u16 {
    3001
}

fn default_groq_model() -> String {
    crate::generation::DEFAULT_MODEL.to_string()
}

fn default_groq_api_base() -> String {
    crate::generation::DEFAULT_API_BASE.to_string()
}

fn default_groq_timeout() -> u64 {
    30
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_tls() -> String {
    "starttls".to_string()
}

fn default_smtp_timeout() -> u64 {
    10
}

/// Validated configuration. Immutable once built.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: String,
    pub email_user: String,
    pub email_pass: String,
    pub origin: String,
    pub port: u16,
    pub groq_model: String,
    pub groq_api_base: String,
    pub groq_timeout: Duration,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_tls: String,
    pub smtp_timeout: Duration,
}

impl Config {
    /// Load `.env` (if present) and the process environment.
    pub fn load() -> Result<Config, ConfigLoadError> {
        dotenvy::dotenv().ok();
        Config::validate(RawConfig::from_env()?)
    }

    /// Reject missing or blank required keys, naming all of them.
    pub fn validate(raw: RawConfig) -> Result<Config, ConfigLoadError> {
        fn present(value: &Option<String>) -> bool {
            value.as_deref().is_some_and(|v| !v.trim().is_empty())
        }

        let mut missing = Vec::new();
        for (key, value) in [
            ("GROQ_API_KEY", &raw.groq_api_key),
            ("EMAIL_USER", &raw.email_user),
            ("EMAIL_PASS", &raw.email_pass),
            ("ORIGIN", &raw.origin),
        ] {
            if !present(value) {
                missing.push(key);
            }
        }
        if !missing.is_empty() {
            return Err(ConfigLoadError::Missing(missing));
        }

        Ok(Config {
            groq_api_key: raw.groq_api_key.unwrap_or_default(),
            email_user: raw.email_user.unwrap_or_default(),
            email_pass: raw.email_pass.unwrap_or_default(),
            origin: raw.origin.unwrap_or_default(),
            port: raw.port,
            groq_model: raw.groq_model,
            groq_api_base: raw.groq_api_base,
            groq_timeout: Duration::from_secs(raw.groq_timeout_secs),
            smtp_host: raw.smtp_host,
            smtp_port: raw.smtp_port,
            smtp_tls: raw.smtp_tls,
            smtp_timeout: Duration::from_secs(raw.smtp_timeout_secs),
        })
    }

    pub fn groq(&self) -> GroqConfig {
        GroqConfig {
            api_key: self.groq_api_key.clone(),
            model: self.groq_model.clone(),
            api_base: self.groq_api_base.clone(),
            timeout: self.groq_timeout,
        }
    }

    pub fn mailer(&self) -> MailerConfig {
        MailerConfig {
            host: self.smtp_host.clone(),
            port: self.smtp_port,
            username: self.email_user.clone(),
            password: self.email_pass.clone(),
            tls: self.smtp_tls.clone(),
            timeout: self.smtp_timeout,
        }
    }
}
