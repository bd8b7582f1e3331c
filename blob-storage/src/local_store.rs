use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

use crate::store::{ObjectStore, PutOptions, StoreError};

/// An `ObjectStore` implementation that keeps blobs in a local directory.
/// Used for tests and local runs; content type and visibility options are
/// accepted but have no filesystem equivalent.
#[derive(Clone, Debug)]
pub struct LocalBlobStore {
    directory: PathBuf,
}

impl LocalBlobStore {
    /// Creates a new `LocalBlobStore` targeting the specified directory.
    pub fn new(directory: PathBuf) -> Self {
        Self { directory }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Provider(err.to_string())
    }
}

#[async_trait]
impl ObjectStore for LocalBlobStore {
    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let mut path = self.directory.clone();
        path.push(key);
        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, data: &[u8], _opts: &PutOptions) -> Result<(), StoreError> {
        fs::create_dir_all(&self.directory).await?;
        let mut path = self.directory.clone();
        path.push(key);
        fs::write(path, data).await?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.directory.display(), key)
    }
}
