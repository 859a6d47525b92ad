//! GroqClient against an in-process stand-in for the provider.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use cloudmail::generation::{GenerationError, GroqClient, GroqConfig, TextGenerator};
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Clone)]
struct Provider {
    status: StatusCode,
    reply: Value,
    seen: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

async fn completions(
    State(provider): State<Provider>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    provider.seen.lock().unwrap().push((auth, body));
    (provider.status, Json(provider.reply.clone()))
}

async fn start(provider: Provider) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new()
        .route("/openai/v1/chat/completions", post(completions))
        .with_state(provider);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr) -> GroqClient {
    let mut config = GroqConfig::new("gsk_test");
    config.api_base = format!("http://{addr}/openai/v1");
    config.timeout = Duration::from_secs(5);
    GroqClient::new(config).unwrap()
}

#[tokio::test]
async fn returns_first_completion_verbatim() {
    let provider = Provider {
        status: StatusCode::OK,
        reply: json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Dear Sam,\n\nThank you for everything.\n"}}]
        }),
        seen: Arc::default(),
    };
    let addr = start(provider.clone()).await;

    let draft = client(addr).generate("Write a thank-you note").await.unwrap();
    assert_eq!(draft, "Dear Sam,\n\nThank you for everything.\n");

    let seen = provider.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (auth, body) = &seen[0];
    assert_eq!(auth.as_deref(), Some("Bearer gsk_test"));
    assert_eq!(body["model"], "llama3-8b-8192");
    assert_eq!(
        body["messages"],
        json!([{"role": "user", "content": "Write a thank-you note"}])
    );
    assert_eq!(body["max_tokens"], 1000);
}

#[tokio::test]
async fn surfaces_provider_error_message() {
    let provider = Provider {
        status: StatusCode::UNAUTHORIZED,
        reply: json!({"error": {"message": "Invalid API Key", "type": "invalid_request_error"}}),
        seen: Arc::default(),
    };
    let addr = start(provider).await;

    let err = client(addr).generate("hi").await.unwrap_err();
    assert!(matches!(err, GenerationError::Provider(msg) if msg == "Invalid API Key"));
}

#[tokio::test]
async fn unreachable_provider_is_connectivity() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(addr).generate("hi").await.unwrap_err();
    assert!(matches!(err, GenerationError::Connectivity(_)), "{err:?}");
}

#[tokio::test]
async fn empty_choices_is_internal() {
    let provider = Provider {
        status: StatusCode::OK,
        reply: json!({"choices": []}),
        seen: Arc::default(),
    };
    let addr = start(provider).await;

    let err = client(addr).generate("hi").await.unwrap_err();
    assert!(matches!(err, GenerationError::Internal(_)));
}
