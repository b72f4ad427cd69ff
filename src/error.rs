use thiserror::Error;

/// Errors that can occur while scanning a log file
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to stat log file: {0}")]
    Stat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while persisting the offset table
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to serialize offset table: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when delivering a notification
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}
