pub mod local_store;
pub mod s3_store;
pub mod store;

pub use local_store::LocalBlobStore;
pub use s3_store::S3BlobStore;
pub use store::{BlobStores, ObjectStore, PutOptions, StoreError};
