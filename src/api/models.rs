use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// The conversation partner currently selected in the sidebar.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Receiver {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

/// `{message, senderId, receiverId}`, both on the socket and in the REST body.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub message: String,
    pub sender_id: String,
    pub receiver_id: String,
}

impl ChatMessage {
    pub fn new(message: impl Into<String>, sender_id: impl Into<String>, receiver_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            sender_id: sender_id.into(),
            receiver_id: receiver_id.into(),
        }
    }

    /// Inbound payloads are never rejected. Whatever the server broadcast is
    /// kept, with missing fields left empty.
    pub fn from_payload(payload: &Value) -> Self {
        if let Some(text) = payload.as_str() {
            return Self::new(text, "", "");
        }
        let field = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| payload.get(*k))
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };
        Self {
            message: field(&["message", "text"]),
            sender_id: field(&["senderId", "sender"]),
            receiver_id: field(&["receiverId", "receiver"]),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct SendMessageResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// Who is typing to whom. Only meaningful together with the store's typing flag.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TypingSignal {
    pub sender_id: String,
    pub receiver_id: String,
}
