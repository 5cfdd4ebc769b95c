//! Error types for the review notifier service

/// Errors that can occur in the review notifier service
#[derive(Debug, thiserror::Error)]
pub enum ReviewNotifierError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures talking to a remote HTTP endpoint
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The server could not be reached at all
    #[error("connection failure: {0}")]
    ConnectionFailure(String),

    /// The server answered with a non-success status
    #[error("server returned status {status}: {body}")]
    ServerError { status: u16, body: String },

    /// The response body was not the structured data we expected
    #[error("failed to decode response: {0}")]
    DecodeFailure(String),

    #[error("request timed out: {0}")]
    Timeout(String),
}

/// A status record could not be turned into a notification
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("unknown status '{0}'")]
    UnknownStatus(String),
}

/// Result type alias for review notifier operations
pub type Result<T> = std::result::Result<T, ReviewNotifierError>;
