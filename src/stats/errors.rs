use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("File is not readable as text: {0}")]
    Unreadable(#[from] std::str::Utf8Error),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage failure: {0}")]
    Backend(String),

    #[error("Storage call timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("An event identifier is required")]
    MissingEventId,

    #[error("Could not read the uploaded file: {0}")]
    UnreadableFile(#[from] ParseError),

    #[error("Could not parse any player stats for {event_id}")]
    NoValidRows { event_id: String },

    #[error("Storage failure: {0}")]
    StorageFailure(String),

    #[error("Storage call timed out after {0:?}")]
    StorageTimeout(Duration),
}

impl From<StorageError> for UploadError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Backend(msg) => UploadError::StorageFailure(msg),
            StorageError::Timeout(after) => UploadError::StorageTimeout(after),
        }
    }
}
