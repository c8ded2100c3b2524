use serde::{Deserialize, Serialize};

/// Chat message broadcast. Emitted on submit and received from the server.
pub const SEND_MSG: &str = "sendMsg";
/// Presence announcement, payload is the user id.
pub const USER_ONLINE: &str = "userOnline";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingEvent {
    pub event_type: String,
    pub data: serde_json::Value,
}
