pub mod client;
pub mod events;
pub mod models;

pub use client::{ApiClient, MessageApi};
pub use models::{ChatMessage, Receiver, SendMessageResponse, TypingSignal, User};
