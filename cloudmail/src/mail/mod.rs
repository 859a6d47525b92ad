//! Outbound email delivery.
//!
//! A thin abstraction over [lettre](https://lettre.rs): [`Mailer`] is the
//! transport seam, [`SmtpMailer`] the SMTP implementation, and
//! [`DeliveryClient`] fans one draft out to a validated recipient list.
//!
//! # Quick Start
//!
//! ```ignore
//! let mailer = SmtpMailer::from_config(config.mailer())?;
//! let delivery = DeliveryClient::new(Arc::new(mailer), config.email_user.clone());
//!
//! let recipients = parse_recipients("a@example.com, b@example.com")?;
//! delivery.deliver(&recipients, "Hello,\nsee you Monday.").await?;
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Required | Description |
//! |----------|----------|-------------|
//! | `EMAIL_USER` | Yes | SMTP username and sender address |
//! | `EMAIL_PASS` | Yes | SMTP password or app password |
//! | `SMTP_HOST` | No | SMTP server hostname (default: `smtp.gmail.com`) |
//! | `SMTP_PORT` | No | Port (default: 587) |
//! | `SMTP_TLS` | No | `starttls` (default), `tls`, or `none` |
//! | `SMTP_TIMEOUT_SECS` | No | Connection timeout (default: 10) |

mod delivery;
mod mailer;
mod message;

pub use delivery::{html_body, DeliveryClient, SUBJECT};
pub use mailer::{Mailer, MailerConfig, SmtpMailer};
pub use message::{Email, EmailBody, EmailBuilder};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The SMTP server rejected the configured credentials.
    #[error("SMTP authentication failed: {0}")]
    Authentication(String),

    /// The SMTP server could not be reached or resolved.
    #[error("SMTP server unreachable: {0}")]
    Unreachable(String),

    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    #[error("failed to build message: {0}")]
    Build(String),

    /// Any other failure while handing a message to the server.
    #[error("SMTP error: {0}")]
    Dispatch(String),
}
