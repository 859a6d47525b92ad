//! Mailer trait and SMTP implementation.

use std::error::Error as _;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{DeliveryError, Email, EmailBody};

/// SMTP reply codes that mean the credentials were refused.
const AUTH_REPLY_CODES: [&str; 4] = ["454", "530", "534", "535"];

/// Async email transport.
///
/// Tests substitute a recording implementation for [`SmtpMailer`].
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Open and authenticate a session without sending anything.
    async fn verify(&self) -> Result<(), DeliveryError>;

    /// Send a single message.
    async fn send(&self, email: &Email) -> Result<(), DeliveryError>;
}

/// Configuration for [`SmtpMailer`].
#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// TLS mode: "starttls" (default), "tls", or "none".
    pub tls: String,
    pub timeout: Duration,
}

/// SMTP-based mailer using lettre. The transport pools one authenticated
/// session and reuses it for every message.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: Arc<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpMailer {
    pub fn from_config(config: MailerConfig) -> Result<Self, DeliveryError> {
        let mut builder = match config.tls.as_str() {
            "none" => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
            "tls" => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| DeliveryError::Dispatch(e.to_string()))?,
            _ => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| DeliveryError::Dispatch(e.to_string()))?,
        };

        builder = builder
            .port(config.port)
            .timeout(Some(config.timeout))
            .credentials(Credentials::new(config.username, config.password));

        Ok(Self {
            transport: Arc::new(builder.build()),
        })
    }

    /// Build a lettre Message from our Email type.
    fn build_message(&self, email: &Email) -> Result<Message, DeliveryError> {
        let from: Mailbox = email
            .from
            .parse()
            .map_err(|_| DeliveryError::InvalidAddress(email.from.clone()))?;
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|_| DeliveryError::InvalidAddress(email.to.clone()))?;

        let builder = Message::builder().from(from).to(to).subject(&email.subject);

        let message = match &email.body {
            EmailBody::Text(text) => builder.body(text.clone()),
            EmailBody::Multipart { text, html } => builder.multipart(
                MultiPart::alternative_plain_html(text.clone(), html.clone()),
            ),
        };

        message.map_err(|e| DeliveryError::Build(e.to_string()))
    }
}

/// Sort a transport failure into the categories callers react to differently.
pub(crate) fn classify(err: lettre::transport::smtp::Error) -> DeliveryError {
    let reply = err.status().map(|code| code.to_string());
    let text = err.to_string();

    if reply
        .as_deref()
        .is_some_and(|code| AUTH_REPLY_CODES.contains(&code))
        || (err.is_client() && text.to_lowercase().contains("authentication"))
    {
        return DeliveryError::Authentication(text);
    }

    if err.is_timeout() || has_io_source(&err) {
        return DeliveryError::Unreachable(text);
    }

    DeliveryError::Dispatch(text)
}

fn has_io_source(err: &lettre::transport::smtp::Error) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if cause.is::<std::io::Error>() {
            return true;
        }
        source = cause.source();
    }
    false
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn verify(&self) -> Result<(), DeliveryError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(DeliveryError::Unreachable(
                "server did not accept the connection".to_string(),
            )),
            Err(e) => Err(classify(e)),
        }
    }

    async fn send(&self, email: &Email) -> Result<(), DeliveryError> {
        let message = self.build_message(email)?;

        self.transport.send(message).await.map_err(classify)?;

        Ok(())
    }
}
