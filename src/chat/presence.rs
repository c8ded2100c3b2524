use std::sync::Arc;

use serde_json::Value;

use crate::api::events::USER_ONLINE;
use crate::api::models::User;
use crate::transport::Transport;

/// Emits `userOnline` once per identity change.
pub struct PresenceAnnouncer<T> {
    transport: Arc<T>,
    announced: Option<String>,
}

impl<T: Transport> PresenceAnnouncer<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport, announced: None }
    }

    /// Returns whether an announcement was emitted. Going back to no user
    /// emits nothing, but the next login is announced again.
    pub fn observe(&mut self, user: Option<&User>) -> bool {
        let Some(user) = user else {
            self.announced = None;
            return false;
        };
        if self.announced.as_deref() == Some(user.id.as_str()) {
            return false;
        }
        self.announced = Some(user.id.clone());
        log::info!("Announcing {} online", user.id);
        if let Err(e) = self.transport.emit(USER_ONLINE, Value::String(user.id.clone())) {
            log::warn!("presence announce dropped: {}", e);
        }
        true
    }

    pub fn announced(&self) -> Option<&str> {
        self.announced.as_deref()
    }
}
