//! Transient user notifications
//!
//! Remote commands report progress and outcome through short-lived
//! notification cards rather than a formal result channel. The notifier
//! keeps the currently active cards and broadcasts create/dismiss events for
//! streaming consumers (SSE).

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Notification id used for in-progress remote command cards, so a later
/// dismiss replaces the progress card with the outcome
pub const PROGRESS_ID: &str = "tribeca-remote-service";

/// Default notification title
pub const TITLE: &str = "Subaru";

/// A single notification card
#[derive(Debug, Clone, serde::Serialize)]
pub struct Notification {
    /// Stable id; dismissing reuses it
    pub id: String,

    /// Short title
    pub title: String,

    /// Body text
    pub message: String,

    /// Creation time (RFC 3339)
    pub created_at: String,
}

/// Event fanned out to streaming consumers
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NotificationEvent {
    Created(Notification),
    Dismissed { id: String },
}

/// Handle for creating and dismissing notifications
#[derive(Clone)]
pub struct Notifier {
    active: Arc<RwLock<HashMap<String, Notification>>>,
    events: broadcast::Sender<NotificationEvent>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    /// Create a notifier with its own event channel
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            active: Arc::new(RwLock::new(HashMap::new())),
            events,
        }
    }

    /// Create a notification with a random id
    pub fn create(&self, message: &str) -> Notification {
        self.create_with_id(&uuid::Uuid::new_v4().to_string(), message)
    }

    /// Create (or replace) a notification under a fixed id
    pub fn create_with_id(&self, id: &str, message: &str) -> Notification {
        let notification = Notification {
            id: id.to_string(),
            title: TITLE.to_string(),
            message: message.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        if let Ok(mut active) = self.active.write() {
            active.insert(id.to_string(), notification.clone());
        }
        let _ = self
            .events
            .send(NotificationEvent::Created(notification.clone()));
        notification
    }

    /// Dismiss a notification by id; unknown ids are ignored
    pub fn dismiss(&self, id: &str) {
        let removed = self
            .active
            .write()
            .map(|mut active| active.remove(id).is_some())
            .unwrap_or(false);
        if removed {
            let _ = self
                .events
                .send(NotificationEvent::Dismissed { id: id.to_string() });
        }
    }

    /// Currently active notifications, newest last
    pub fn active(&self) -> Vec<Notification> {
        let mut list: Vec<Notification> = self
            .active
            .read()
            .map(|active| active.values().cloned().collect())
            .unwrap_or_default();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        list
    }

    /// Subscribe to create/dismiss events
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.events.subscribe()
    }
}
