//! Failure taxonomy for the service boundary.
//!
//! Every failure leaves a handler as `{ "error": <message> }`. `Display` carries
//! the detail for the server log; `http_message()` is what the caller sees.

use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::generation::GenerationError;
use crate::mail::DeliveryError;
use crate::recipients::RecipientError;
use crate::wire::ErrorEnvelope;
use crate::HttpError;

#[derive(Debug, thiserror::Error, HttpError)]
pub enum ComposeError {
    #[error("{0}")]
    #[http_error(BAD_REQUEST)]
    Validation(String),

    #[error("invalid request body: {0}")]
    #[http_error(BAD_REQUEST, "Invalid request body")]
    BadRequestBody(#[from] JsonRejection),

    #[error("generation provider error: {0}")]
    #[http_error(INTERNAL_SERVER_ERROR, "Groq API Error: {0}")]
    Provider(String),

    #[error("generation provider unreachable: {0}")]
    #[http_error(INTERNAL_SERVER_ERROR, "Network error: Unable to connect to Groq API")]
    Connectivity(String),

    #[error("smtp authentication failed: {0}")]
    #[http_error(
        INTERNAL_SERVER_ERROR,
        "Email authentication failed. Please check EMAIL_USER and EMAIL_PASS."
    )]
    Authentication(String),

    #[error("smtp server unreachable: {0}")]
    #[http_error(
        INTERNAL_SERVER_ERROR,
        "Email service not found. Please check your internet connection."
    )]
    Unreachable(String),

    #[error("delivery failed: {0}")]
    #[http_error(INTERNAL_SERVER_ERROR, "Failed to send email")]
    Delivery(String),

    #[error("internal error: {0:?}")]
    #[http_error(INTERNAL_SERVER_ERROR, "Internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("no route for {0}")]
    #[http_error(NOT_FOUND, "Endpoint not found")]
    NotFound(String),
}

impl ComposeError {
    pub fn validation(message: impl Into<String>) -> Self {
        ComposeError::Validation(message.into())
    }
}

impl From<RecipientError> for ComposeError {
    fn from(err: RecipientError) -> Self {
        ComposeError::Validation(err.to_string())
    }
}

impl From<GenerationError> for ComposeError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Provider(message) => ComposeError::Provider(message),
            GenerationError::Connectivity(detail) => ComposeError::Connectivity(detail),
            GenerationError::Internal(detail) => {
                ComposeError::Internal(anyhow::anyhow!("generation: {detail}"))
            }
        }
    }
}

impl From<DeliveryError> for ComposeError {
    fn from(err: DeliveryError) -> Self {
        match err {
            DeliveryError::Authentication(detail) => ComposeError::Authentication(detail),
            DeliveryError::Unreachable(detail) => ComposeError::Unreachable(detail),
            DeliveryError::Dispatch(detail) => ComposeError::Delivery(detail),
            err @ (DeliveryError::InvalidAddress(_) | DeliveryError::Build(_)) => {
                ComposeError::Internal(anyhow::Error::new(err))
            }
        }
    }
}

impl IntoResponse for ComposeError {
    fn into_response(self) -> Response {
        // Trace server errors since the detail is not returned in the response body
        if self.http_code().is_server_error() {
            tracing::error!("Error Status {}: {}", self.http_code(), self);
        } else {
            tracing::debug!("Rejected {}: {}", self.http_code(), self);
        }

        let body = Json(ErrorEnvelope {
            error: self.http_message(),
        });
        (self.http_code(), body).into_response()
    }
}
