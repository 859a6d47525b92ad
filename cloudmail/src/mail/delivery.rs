//! Fan-out of one draft to every recipient.

use std::sync::Arc;

use futures::future::join_all;

use super::{DeliveryError, Email, Mailer};
use crate::recipients::RecipientList;

/// Subject line carried by every generated email.
pub const SUBJECT: &str = "Generated Email";

/// Render the plain-text body as HTML by turning line breaks into `<br>`.
pub fn html_body(text: &str) -> String {
    text.replace('\n', "<br>")
}

/// Sends a draft to a validated recipient list through a [`Mailer`].
#[derive(Clone)]
pub struct DeliveryClient {
    mailer: Arc<dyn Mailer>,
    from: String,
}

impl DeliveryClient {
    pub fn new(mailer: Arc<dyn Mailer>, from: impl Into<String>) -> Self {
        DeliveryClient {
            mailer,
            from: from.into(),
        }
    }

    /// Deliver `body` to every recipient.
    ///
    /// The session is verified before anything is sent. Messages are then
    /// dispatched concurrently and the result is reported only after all of
    /// them have settled: `Ok` if every dispatch succeeded, otherwise the
    /// error of the first failing recipient in list order.
    pub async fn deliver(&self, recipients: &RecipientList, body: &str) -> Result<(), DeliveryError> {
        self.mailer.verify().await?;

        let html = html_body(body);
        let emails = recipients
            .iter()
            .map(|to| {
                Email::builder()
                    .from(&self.from)
                    .to(to)
                    .subject(SUBJECT)
                    .text(body)
                    .html(&html)
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let results = join_all(emails.iter().map(|email| self.mailer.send(email))).await;

        let mut delivered = Vec::new();
        let mut first_failure = None;
        for (email, result) in emails.iter().zip(results) {
            match result {
                Ok(()) => delivered.push(email.to.as_str()),
                Err(e) => {
                    tracing::error!(recipient = %email.to, error = %e, "dispatch failed");
                    first_failure.get_or_insert(e);
                }
            }
        }

        match first_failure {
            None => {
                tracing::info!(count = delivered.len(), "email delivered to all recipients");
                Ok(())
            }
            Some(err) => {
                if !delivered.is_empty() {
                    tracing::warn!(
                        delivered = ?delivered,
                        "partial delivery reported as failure; listed recipients already received the email"
                    );
                }
                Err(err)
            }
        }
    }
}
