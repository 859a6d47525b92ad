//! JSON bodies exchanged between the terminal client and the service.
//!
//! Request fields default to empty so a missing field and a blank field are
//! rejected by the same validation path.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRequest {
    /// Comma-separated addresses, exactly as typed.
    #[serde(default)]
    pub recipients: String,
    #[serde(default, rename = "emailBody")]
    pub email_body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResponse {
    pub success: bool,
}

/// Body of every failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// RFC 3339, UTC.
    pub timestamp: String,
}
