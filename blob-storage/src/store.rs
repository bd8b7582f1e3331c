use async_trait::async_trait;
use thiserror::Error;

use crate::local_store::LocalBlobStore;
use crate::s3_store::S3BlobStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("storage provider error: {0}")]
    Provider(String),
}

/// Options applied when writing an object.
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    pub content_type: Option<String>,
    pub public_read: bool,
}

impl PutOptions {
    /// Options for a publicly fetchable object with the given content type.
    pub fn public(content_type: &str) -> Self {
        Self {
            content_type: Some(content_type.to_string()),
            public_read: true,
        }
    }
}

/// Trait for storing and fetching named blobs in a single bucket.
#[async_trait]
pub trait ObjectStore {
    /// Retrieves a blob by its key. Absence is `StoreError::NotFound`.
    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Stores a blob under the given key, overwriting any previous value.
    async fn put(&self, key: &str, data: &[u8], opts: &PutOptions) -> Result<(), StoreError>;

    /// The URL at which a public-read blob can be fetched. Deterministic in
    /// the bucket (or base directory) and the key.
    fn public_url(&self, key: &str) -> String;
}

#[derive(Debug, Clone)]
pub enum BlobStores {
    Local(LocalBlobStore),
    S3(S3BlobStore),
}

impl BlobStores {
    /// Returns a reference to the inner value as a trait object.
    pub fn as_trait(&self) -> &dyn ObjectStore {
        match self {
            BlobStores::Local(a) => a,
            BlobStores::S3(b) => b,
        }
    }
}
