// Flash messages
// At most one pending message per session, consumed by the next rendered page

use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::session::SessionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashMessage {
    pub kind: FlashKind,
    pub message: String,
}

impl FlashMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Danger,
            message: message.into(),
        }
    }
}

struct Pending {
    message: FlashMessage,
    expires_at: Instant,
}

/// Session id -> pending message, consume-once with a TTL
pub struct FlashStore {
    ttl: Duration,
    pending: Mutex<HashMap<SessionId, Pending>>,
}

impl FlashStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the session's pending message
    pub async fn set(&self, session: SessionId, message: FlashMessage) {
        self.set_at(session, message, Instant::now()).await;
    }

    /// Return and remove the pending message, unless it has expired
    pub async fn take(&self, session: SessionId) -> Option<FlashMessage> {
        self.take_at(session, Instant::now()).await
    }

    async fn set_at(&self, session: SessionId, message: FlashMessage, now: Instant) {
        let mut pending = self.pending.lock().await;
        pending.retain(|_, p| p.expires_at > now);
        pending.insert(
            session,
            Pending {
                message,
                expires_at: now + self.ttl,
            },
        );
    }

    async fn take_at(&self, session: SessionId, now: Instant) -> Option<FlashMessage> {
        let entry = self.pending.lock().await.remove(&session)?;
        (entry.expires_at > now).then_some(entry.message)
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.pending.lock().await.len()
    }
}
