use thiserror::Error;

/// Image store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store or its client could not be built from the supplied settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The remote write did not complete; nothing was stored
    #[error("Failed to upload image to bucket {bucket} under key {key}: {source}")]
    Upload {
        bucket: String,
        key: String,
        #[source]
        source: PutError,
    },
}

impl StoreError {
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            StoreError::Upload {
                source: PutError::Cancelled,
                ..
            }
        )
    }
}

/// Why a single object write failed
#[derive(Debug, Error)]
pub enum PutError {
    #[error("Upload cancelled")]
    Cancelled,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Write rejected by store: {0}")]
    Rejected(String),

    #[error("Transport failure: {0}")]
    Transport(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
