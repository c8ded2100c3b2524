//! Real-time chat client core: a socket.io transport, a view-model store,
//! and the session that keeps them in sync with the REST backend.

pub mod api;
pub mod app;
pub mod chat;
pub mod error;
pub mod notify;
pub mod store;
pub mod transport;
pub mod utils;

pub use app::Settings;
pub use chat::{ChatSession, Command};
pub use error::{ApiError, ChatError, ConfigError, TransportError};
pub use store::{Action, ChatState, Store, Theme};
pub use transport::{SocketClient, Subscription, Transport};
