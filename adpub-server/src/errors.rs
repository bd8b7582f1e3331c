use blob_storage::StoreError;
use thiserror::Error;

/// Internal failure taxonomy. Every variant collapses to the same
/// `{"status":"failure"}` body at the HTTP boundary; the distinctions exist
/// for logging only and provider detail is never leaked to callers.
#[derive(Debug, Error)]
pub enum AdpubError {
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(#[from] reqwest::Error),

    #[error("provider rejected request: {0}")]
    ProviderRejected(String),

    #[error("invalid input: {0}")]
    InputInvalid(String),

    #[error("object storage operation failed: {0}")]
    Store(#[from] StoreError),
}
