//! Test doubles for the generation and delivery seams.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use cloudmail::generation::{GenerationError, TextGenerator};
use cloudmail::mail::{DeliveryClient, DeliveryError, Email, Mailer};
use cloudmail::orchestrator::{router, AppState};
use http_body_util::BodyExt;
use serde_json::Value;

pub const ORIGIN: &str = "http://localhost:5173";
pub const SENDER: &str = "sender@example.com";

/// What the fake generator answers with.
#[derive(Debug, Clone)]
pub enum FakeReply {
    Draft(String),
    Provider(String),
    Offline,
    Broken,
    Panic,
}

pub struct FakeGenerator {
    reply: FakeReply,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn new(reply: FakeReply) -> Arc<Self> {
        Arc::new(FakeGenerator {
            reply,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            FakeReply::Draft(text) => Ok(text.clone()),
            FakeReply::Provider(msg) => Err(GenerationError::Provider(msg.clone())),
            FakeReply::Offline => Err(GenerationError::Connectivity("connection refused".into())),
            FakeReply::Broken => Err(GenerationError::Internal("missing field `choices`".into())),
            FakeReply::Panic => panic!("generator exploded"),
        }
    }
}

/// How the fake session verification behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Ok,
    BadCredentials,
    Unreachable,
}

/// Records every dispatched message; fails sends to the listed addresses.
pub struct RecordingMailer {
    session: Session,
    failing: Vec<String>,
    send_delay: Duration,
    pub verifications: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
    pub sent: Mutex<Vec<Email>>,
}

impl RecordingMailer {
    pub fn new(session: Session) -> Self {
        RecordingMailer {
            session,
            failing: Vec::new(),
            send_delay: Duration::ZERO,
            verifications: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_for(mut self, address: &str) -> Self {
        self.failing.push(address.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.send_delay = delay;
        self
    }

    pub fn sent_to(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|e| e.to.clone()).collect()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn verify(&self) -> Result<(), DeliveryError> {
        self.verifications.fetch_add(1, Ordering::SeqCst);
        match self.session {
            Session::Ok => Ok(()),
            Session::BadCredentials => Err(DeliveryError::Authentication(
                "535 5.7.8 Username and Password not accepted".into(),
            )),
            Session::Unreachable => Err(DeliveryError::Unreachable("no route to host".into())),
        }
    }

    async fn send(&self, email: &Email) -> Result<(), DeliveryError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.send_delay.is_zero() {
            tokio::time::sleep(self.send_delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&email.to) {
            return Err(DeliveryError::Dispatch(format!("550 mailbox unavailable: {}", email.to)));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

pub fn app(generator: Arc<FakeGenerator>, mailer: Arc<RecordingMailer>) -> axum::Router {
    let state = AppState::new(generator, DeliveryClient::new(mailer, SENDER));
    router(state, ORIGIN).unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("origin", ORIGIN)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
