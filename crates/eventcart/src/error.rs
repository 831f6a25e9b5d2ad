use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventCartError {
    #[error("Remote fetch failed: {0}")]
    RemoteFetch(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl From<confique::Error> for EventCartError {
    fn from(err: confique::Error) -> Self {
        EventCartError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EventCartError>;
