//! Generate email drafts with a text-generation provider and deliver them over SMTP.
//!
//! [`recipients`] and [`wire`] are always available so the terminal client can
//! share them; everything else requires the default `server` feature.

pub mod recipients;
pub mod wire;

#[cfg(feature = "server")]
pub use cloudmail_macros::HttpError;

#[cfg(feature = "server")]
pub mod config;
#[cfg(feature = "server")]
pub mod error;
#[cfg(feature = "server")]
pub mod generation;
#[cfg(feature = "server")]
pub mod mail;
#[cfg(feature = "server")]
pub mod orchestrator;
#[cfg(feature = "server")]
mod serve;

#[cfg(feature = "server")]
pub use config::{Config, EnvConfig};
#[cfg(feature = "server")]
pub use serve::{serve, shutdown_signal};
