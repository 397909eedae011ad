// src/errors.rs
use thiserror::Error;

/// How an error is surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before any request was sent.
    Validation,
    /// The backend answered with `success: false`.
    Application,
    /// The request failed or the response could not be understood.
    Transport,
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to parse JSON response: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Backend request failed with status {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Unexpected response structure: {0}")]
    UnexpectedResponse(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Rejected(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Validation(_) => ErrorKind::Validation,
            ClientError::Rejected(_) => ErrorKind::Application,
            _ => ErrorKind::Transport,
        }
    }

    /// Text shown in the notification banner. Transport failures never leak
    /// their cause; the caller supplies the generic message for its flow.
    pub fn user_message(&self, transport_fallback: &str) -> String {
        match self.kind() {
            ErrorKind::Validation | ErrorKind::Application => self.to_string(),
            ErrorKind::Transport => transport_fallback.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
