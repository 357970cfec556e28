use thiserror::Error;

/// Errors that can occur in the snapshot store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying blob I/O failed.
    #[error("blob I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A snapshot document could not be encoded or decoded.
    #[error("snapshot codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// A key escapes the store root or is otherwise unusable.
    #[error("invalid blob key: {0}")]
    InvalidKey(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
