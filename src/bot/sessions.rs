//! In-memory conversation sessions, one slot per `channel:user_id`.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::placement::Session;

/// A session slot. `None` means the user has no conversation in progress.
pub type SessionSlot = Arc<Mutex<Option<Session>>>;

/// Hands out per-user session slots.
///
/// Locking a slot serializes that user's inputs while other users proceed in parallel.
#[derive(Default)]
pub struct SessionManager {
    slots: RwLock<HashMap<String, SessionSlot>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the slot for `key`, creating an empty one on first use.
    pub async fn slot(&self, key: &str) -> SessionSlot {
        if let Some(slot) = self.slots.read().await.get(key) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write().await;
        Arc::clone(slots.entry(key.to_string()).or_default())
    }
}
