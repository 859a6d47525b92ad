//! Draft generation against a text-generation provider.
//!
//! [`TextGenerator`] is the seam the orchestrator depends on; [`GroqClient`]
//! implements it for Groq's OpenAI-compatible chat completions API.
//!
//! # Environment Variables
//!
//! | Variable | Required | Description |
//! |----------|----------|-------------|
//! | `GROQ_API_KEY` | Yes | Bearer credential |
//! | `GROQ_MODEL` | No | Model id (default: `llama3-8b-8192`) |
//! | `GROQ_API_BASE` | No | API root (default: `https://api.groq.com/openai/v1`) |
//! | `GROQ_TIMEOUT_SECS` | No | Request deadline (default: 30) |

mod groq;

pub use groq::{GroqClient, GroqConfig, DEFAULT_API_BASE, DEFAULT_MODEL};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    /// The provider answered with an error payload.
    #[error("provider error: {0}")]
    Provider(String),

    /// The request never reached the provider.
    #[error("provider unreachable: {0}")]
    Connectivity(String),

    /// Building the request or reading the response failed locally.
    #[error("generation failed: {0}")]
    Internal(String),
}

/// Produces a draft from a prompt. One attempt per call; no retries.
#[async_trait]
pub trait TextGenerator: Send + Sync + 'static {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
