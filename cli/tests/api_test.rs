//! HttpComposeApi against an in-process stand-in for the service.

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use cloudmail::wire::{GenerateRequest, SendRequest};
use cloudmail_cli::{ApiError, ComposeApi, HttpComposeApi};
use serde_json::{json, Value};
use tokio::net::TcpListener;

async fn generate(Json(req): Json<GenerateRequest>) -> (StatusCode, Json<Value>) {
    if req.prompt == "fail" {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Network error: Unable to connect to Groq API"})),
        )
    } else {
        (StatusCode::OK, Json(json!({"email": format!("Draft for {}", req.prompt)})))
    }
}

async fn send(Json(req): Json<SendRequest>) -> (StatusCode, Json<Value>) {
    if req.email_body.is_empty() {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Recipients and emailBody are required"})),
        )
    } else if req.recipients.contains("bad") {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Invalid email addresses: bad"})),
        )
    } else {
        (StatusCode::OK, Json(json!({"success": true})))
    }
}

async fn start() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new()
        .route("/generate", post(generate))
        .route("/send", post(send));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr) -> HttpComposeApi {
    HttpComposeApi::new(&format!("http://{addr}/"), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn generate_returns_email_field() {
    let api = client(start().await);
    assert_eq!(api.generate("a note").await.unwrap(), "Draft for a note");
}

#[tokio::test]
async fn failures_carry_the_envelope_message() {
    let api = client(start().await);

    let err = api.generate("fail").await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected { status: 500, .. }));
    assert_eq!(err.to_string(), "Network error: Unable to connect to Groq API");

    let err = api.send("bad", "Hi").await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid email addresses: bad");
}

#[tokio::test]
async fn send_posts_email_body_field() {
    let api = client(start().await);
    api.send("a@b.com", "Hi").await.unwrap();
}

#[tokio::test]
async fn closed_port_is_unreachable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(addr).generate("hi").await.unwrap_err();
    assert!(matches!(err, ApiError::Unreachable(_)));
}
