use thiserror::Error;

/// Failure of the upstream order-file read. Degrades to an empty view.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("order read unavailable: {0}")]
    Unavailable(String),

    #[error("malformed order files: {0}")]
    Malformed(String),
}

/// File-local retrieval failure. Never affects other files or the selection.
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("gateway fetch failed: {0}")]
    Fetch(String),

    #[error("decrypt rejected: {0}")]
    Decrypt(String),

    #[error("plaintext is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("payload format not recognized")]
    FormatUnrecognized,

    #[error("save failed: {0}")]
    Save(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ZarelaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, ZarelaError>;
