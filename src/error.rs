use thiserror::Error;

/// Failures surfaced by the chat session. Every one of them ends up as a
/// notification; none is fatal.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Please type something")]
    EmptyMessage,

    #[error("Select a conversation first")]
    NoReceiver,

    #[error("You are not signed in")]
    NotSignedIn,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ChatError {
    /// Validation errors leave the store untouched and never reach the wire.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ChatError::EmptyMessage | ChatError::NoReceiver | ChatError::NotSignedIn
        )
    }
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid server URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Server refused namespace {namespace}: {reason}")]
    ConnectRefused { namespace: String, reason: String },

    #[error("Connection closed")]
    Closed,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(u16),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Could not write config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("No config dir")]
    NoConfigDir,
}

pub type Result<T> = std::result::Result<T, ChatError>;
