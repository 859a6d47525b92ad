//! HTTP access to the composition service.

use std::time::Duration;

use async_trait::async_trait;
use cloudmail::wire::{ErrorEnvelope, GenerateRequest, GenerateResponse, SendRequest};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered with a failure status; `message` is its envelope text.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("could not reach the service: {0}")]
    Unreachable(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// The two operations the controller drives.
#[async_trait]
pub trait ComposeApi: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ApiError>;

    /// `recipients` is sent exactly as typed; the service re-validates it.
    async fn send(&self, recipients: &str, body: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl<T: ComposeApi + ?Sized> ComposeApi for std::sync::Arc<T> {
    async fn generate(&self, prompt: &str) -> Result<String, ApiError> {
        (**self).generate(prompt).await
    }

    async fn send(&self, recipients: &str, body: &str) -> Result<(), ApiError> {
        (**self).send(recipients, body).await
    }
}

#[derive(Debug, Clone)]
pub struct HttpComposeApi {
    base: String,
    client: reqwest::Client,
}

impl HttpComposeApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Unreachable(e.to_string()))?;

        Ok(HttpComposeApi {
            base: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn post<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, ApiError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base);
        log::debug!("POST {url}");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Unreachable(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Unreachable(e.to_string()))?;

        if !status.is_success() {
            return Err(rejection(status, &bytes));
        }

        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn rejection(status: StatusCode, body: &[u8]) -> ApiError {
    let message = serde_json::from_slice::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    ApiError::Rejected {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl ComposeApi for HttpComposeApi {
    async fn generate(&self, prompt: &str) -> Result<String, ApiError> {
        let request = GenerateRequest {
            prompt: prompt.to_string(),
        };
        let response: GenerateResponse = self.post("/generate", &request).await?;
        Ok(response.email)
    }

    async fn send(&self, recipients: &str, body: &str) -> Result<(), ApiError> {
        let request = SendRequest {
            recipients: recipients.to_string(),
            email_body: body.to_string(),
        };
        let _: serde_json::Value = self.post("/send", &request).await?;
        Ok(())
    }
}
