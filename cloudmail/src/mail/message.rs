//! Email message types and builder.

use super::DeliveryError;

/// The body content of an email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailBody {
    /// Plain text only.
    Text(String),
    /// Both plain text and HTML (multipart/alternative).
    Multipart { text: String, html: String },
}

/// A single outbound message. The delivery client sends one per recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: EmailBody,
}

impl Email {
    pub fn builder() -> EmailBuilder {
        EmailBuilder::default()
    }
}

/// Builder for constructing [`Email`] instances.
#[derive(Debug, Default)]
pub struct EmailBuilder {
    from: Option<String>,
    to: Option<String>,
    subject: Option<String>,
    text: Option<String>,
    html: Option<String>,
}

impl EmailBuilder {
    pub fn from(mut self, address: impl Into<String>) -> Self {
        self.from = Some(address.into());
        self
    }

    pub fn to(mut self, address: impl Into<String>) -> Self {
        self.to = Some(address.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// HTML alternative; only sent alongside a text body.
    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn build(self) -> Result<Email, DeliveryError> {
        let from = self
            .from
            .ok_or_else(|| DeliveryError::Build("from address required".into()))?;
        let to = self
            .to
            .ok_or_else(|| DeliveryError::Build("recipient required".into()))?;
        let subject = self
            .subject
            .ok_or_else(|| DeliveryError::Build("subject required".into()))?;

        let body = match (self.text, self.html) {
            (Some(text), Some(html)) => EmailBody::Multipart { text, html },
            (Some(text), None) => EmailBody::Text(text),
            (None, _) => return Err(DeliveryError::Build("text body required".into())),
        };

        Ok(Email {
            from,
            to,
            subject,
            body,
        })
    }
}
