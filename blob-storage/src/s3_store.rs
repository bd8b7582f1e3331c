use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client as S3Client;

use crate::store::{ObjectStore, PutOptions, StoreError};

/// An `ObjectStore` implementation backed by an S3 bucket.
#[derive(Clone, Debug)]
pub struct S3BlobStore {
    client: S3Client,
    bucket: String,
}

impl S3BlobStore {
    /// Creates a new `S3BlobStore` from an existing client.
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Creates a new instance by loading AWS configuration (credentials,
    /// region, endpoint overrides) from the environment.
    pub async fn from_env(bucket: impl Into<String>) -> Self {
        let shared_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let client = S3Client::new(&shared_config);
        Self::new(client, bucket)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3BlobStore {
    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| match &e {
                SdkError::ServiceError(service_err) if service_err.err().is_no_such_key() => {
                    StoreError::NotFound(key.to_string())
                }
                _ => StoreError::Provider(e.to_string()),
            })?;
        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Provider(e.to_string()))?;
        Ok(data.into_bytes().to_vec())
    }

    async fn put(&self, key: &str, data: &[u8], opts: &PutOptions) -> Result<(), StoreError> {
        let acl = opts.public_read.then_some(ObjectCannedAcl::PublicRead);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data.to_vec()))
            .set_content_type(opts.content_type.clone())
            .set_acl(acl)
            .send()
            .await
            .map_err(|e| StoreError::Provider(e.to_string()))?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://{}.s3.amazonaws.com/{}", self.bucket, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_public_url_shape() {
        // Static config: no credential or region lookup, no requests made.
        let conf = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new("us-east-1"))
            .build();
        let store = S3BlobStore::new(S3Client::from_conf(conf), "adpub-images");

        let url = store.public_url("abc123.png");
        assert_eq!(url, "https://adpub-images.s3.amazonaws.com/abc123.png");
    }

    // Needs AWS credentials and a writable TEST bucket in the environment.
    #[tokio::test]
    #[ignore]
    async fn test_s3_round_trip() {
        let bucket = std::env::var("TEST_BUCKET").expect("TEST_BUCKET env var must be set");
        let store = S3BlobStore::from_env(bucket).await;

        let key = format!("{}.bin", Uuid::new_v4());
        let data = b"this is test data";

        store.put(&key, data, &PutOptions::default()).await.expect("upload failed");
        let retrieved = store.get(&key).await.expect("download failed");
        assert_eq!(retrieved, data);
    }
}
