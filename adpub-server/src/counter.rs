use blob_storage::{ObjectStore, PutOptions, StoreError};
use tracing::warn;

/// Reserved key holding the upload counter as decimal text.
pub const COUNTER_KEY: &str = "upload_count";

/// Reads the current upload count. An absent blob reads as zero, as does a
/// blob whose contents do not parse.
pub async fn current(store: &dyn ObjectStore) -> u64 {
    match store.get(COUNTER_KEY).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).trim().parse().unwrap_or(0),
        Err(StoreError::NotFound(_)) => 0,
        Err(e) => {
            warn!("upload counter read failed, treating as zero: {}", e);
            0
        }
    }
}

/// Read-modify-write increment of the counter blob, returning the new
/// encoded value. Not atomic: overlapping increments can lose updates, an
/// accepted limitation of this service.
pub async fn increment(store: &dyn ObjectStore) -> Result<String, StoreError> {
    let next = current(store).await + 1;
    let encoded = next.to_string();
    store
        .put(COUNTER_KEY, encoded.as_bytes(), &PutOptions::default())
        .await?;
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blob_storage::LocalBlobStore;
    use tempfile::tempdir;

    #[actix_web::test]
    async fn test_absent_counter_reads_as_zero() {
        let temp_dir = tempdir().unwrap();
        let store = LocalBlobStore::new(temp_dir.path().to_path_buf());

        assert_eq!(current(&store).await, 0);
    }

    #[actix_web::test]
    async fn test_sequential_increments() {
        let temp_dir = tempdir().unwrap();
        let store = LocalBlobStore::new(temp_dir.path().to_path_buf());

        assert_eq!(increment(&store).await.unwrap(), "1");
        assert_eq!(increment(&store).await.unwrap(), "2");
        assert_eq!(current(&store).await, 2);

        let stored = store.get(COUNTER_KEY).await.unwrap();
        assert_eq!(stored, b"2");
    }

    #[actix_web::test]
    async fn test_garbage_counter_resets_to_one() {
        let temp_dir = tempdir().unwrap();
        let store = LocalBlobStore::new(temp_dir.path().to_path_buf());

        store
            .put(COUNTER_KEY, b"not a number", &PutOptions::default())
            .await
            .unwrap();

        assert_eq!(current(&store).await, 0);
        assert_eq!(increment(&store).await.unwrap(), "1");
    }
}
