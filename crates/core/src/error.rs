use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The widget has no path, so no request URI can be built for it.
    #[error("Widget is not attached to a rooted tree: {0}")]
    Unaddressable(String),

    #[error("No transport available: {0}")]
    TransportUnavailable(String),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
