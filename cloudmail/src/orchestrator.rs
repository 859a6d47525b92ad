//! The two service operations, `generate` and `send`, plus health and fallback routes.
//!
//! Handlers are stateless: the only shared value is [`AppState`], built once at
//! startup and never mutated.

use std::any::Any;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ComposeError;
use crate::generation::TextGenerator;
use crate::mail::DeliveryClient;
use crate::recipients::parse_recipients;
use crate::wire::{
    ErrorEnvelope, GenerateRequest, GenerateResponse, HealthResponse, SendRequest, SendResponse,
};

type Result<T> = std::result::Result<T, ComposeError>;
type JsonResult<T> = Result<Json<T>>;

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn TextGenerator>,
    pub delivery: DeliveryClient,
}

impl AppState {
    pub fn new(generator: Arc<dyn TextGenerator>, delivery: DeliveryClient) -> Self {
        AppState {
            generator,
            delivery,
        }
    }
}

/// Build the service router. `origin` is the only origin granted CORS access.
pub fn router(state: AppState, origin: &str) -> anyhow::Result<Router> {
    let origin: HeaderValue = origin
        .parse()
        .map_err(|e| anyhow::anyhow!("ORIGIN is not a valid header value: {e}"))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(Router::new()
        .route("/generate", post(generate))
        .route("/send", post(send))
        .route("/health", get(health))
        .fallback(not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(internal_error))
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

async fn generate(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<GenerateRequest>, ComposeError>,
) -> JsonResult<GenerateResponse> {
    if req.prompt.trim().is_empty() {
        return Err(ComposeError::validation("Prompt is required"));
    }

    let email = state.generator.generate(&req.prompt).await?;
    tracing::info!(chars = email.len(), "draft generated");
    Ok(Json(GenerateResponse { email }))
}

async fn send(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<SendRequest>, ComposeError>,
) -> JsonResult<SendResponse> {
    if req.recipients.trim().is_empty() || req.email_body.trim().is_empty() {
        return Err(ComposeError::validation(
            "Recipients and emailBody are required",
        ));
    }

    // Re-validated even when the client already checked.
    let recipients = parse_recipients(&req.recipients)?;

    state.delivery.deliver(&recipients, &req.email_body).await?;
    Ok(Json(SendResponse { success: true }))
}

async fn health() -> JsonResult<HealthResponse> {
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(anyhow::Error::new)?;

    Ok(Json(HealthResponse {
        status: "OK".to_string(),
        timestamp,
    }))
}

async fn not_found(uri: Uri) -> ComposeError {
    ComposeError::NotFound(uri.to_string())
}

fn internal_error(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!(%detail, "Unhandled error");

    let body = Json(ErrorEnvelope {
        error: "Internal server error".to_string(),
    });
    (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
}
