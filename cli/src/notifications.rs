//! Transient, self-expiring status messages.
//!
//! The queue is shared by every lane of the controller. Appending never looks
//! at lane state, and each notification owns exactly one pending expiry that a
//! manual dismissal cancels.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::AbortHandle;

pub const DEFAULT_DISPLAY: Duration = Duration::from_secs(5);

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Unique for the lifetime of the process; never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(u64);

impl NotificationId {
    fn next() -> Self {
        NotificationId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n-{}", self.0)
    }
}

impl FromStr for NotificationId {
    type Err = std::num::ParseIntError;

    /// Accepts `n-7` or a bare `7`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches("n-");
        digits.parse().map(NotificationId)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub kind: NotificationKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    Pushed(Notification),
    Removed(NotificationId),
}

struct Entry {
    notification: Notification,
    expiry: Option<AbortHandle>,
}

struct Inner {
    entries: Mutex<Vec<Entry>>,
    events: broadcast::Sender<NotificationEvent>,
}

impl Inner {
    fn entries(&self) -> MutexGuard<'_, Vec<Entry>> {
        // A panic while holding the lock cannot leave the Vec half-updated.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn remove(&self, id: NotificationId, cancel_expiry: bool) -> bool {
        let removed = {
            let mut entries = self.entries();
            entries
                .iter()
                .position(|e| e.notification.id == id)
                .map(|pos| entries.remove(pos))
        };

        match removed {
            Some(entry) => {
                if cancel_expiry {
                    if let Some(handle) = entry.expiry {
                        handle.abort();
                    }
                }
                // No subscribers is fine.
                let _ = self.events.send(NotificationEvent::Removed(id));
                true
            }
            None => false,
        }
    }
}

/// Ordered collection of live notifications, oldest first.
///
/// Cloning yields another handle to the same queue. [`push`](Self::push)
/// schedules expiry on the current tokio runtime.
#[derive(Clone)]
pub struct NotificationQueue {
    inner: Arc<Inner>,
    display_for: Duration,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(DEFAULT_DISPLAY)
    }
}

impl NotificationQueue {
    pub fn new(display_for: Duration) -> Self {
        let (events, _) = broadcast::channel(64);
        NotificationQueue {
            inner: Arc::new(Inner {
                entries: Mutex::new(Vec::new()),
                events,
            }),
            display_for,
        }
    }

    /// Append a notification and schedule its automatic removal.
    pub fn push(&self, message: impl Into<String>, kind: NotificationKind) -> NotificationId {
        let notification = Notification {
            id: NotificationId::next(),
            message: message.into(),
            kind,
        };
        let id = notification.id;

        {
            // Held across the spawn so the expiry cannot run before its entry exists.
            let mut entries = self.inner.entries();
            let expiry = tokio::spawn(expire(Arc::downgrade(&self.inner), id, self.display_for));
            entries.push(Entry {
                notification: notification.clone(),
                expiry: Some(expiry.abort_handle()),
            });
        }

        log::debug!("notification {id} pushed");
        let _ = self.inner.events.send(NotificationEvent::Pushed(notification));
        id
    }

    /// Remove by id and cancel its pending expiry. Returns false if already gone.
    pub fn remove(&self, id: NotificationId) -> bool {
        self.inner.remove(id, true)
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.inner
            .entries()
            .iter()
            .map(|e| e.notification.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.inner.events.subscribe()
    }
}

async fn expire(inner: Weak<Inner>, id: NotificationId, after: Duration) {
    tokio::time::sleep(after).await;
    if let Some(inner) = inner.upgrade() {
        if inner.remove(id, false) {
            log::debug!("notification {id} expired");
        }
    }
}
