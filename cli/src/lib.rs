//! Terminal client for the CloudMail service.

pub mod api;
pub mod commands;
pub mod controller;
pub mod notifications;

pub use api::{ApiError, ComposeApi, HttpComposeApi};
pub use controller::{Controller, FormState, LaneOutcome};
pub use notifications::{Notification, NotificationEvent, NotificationId, NotificationKind, NotificationQueue};
