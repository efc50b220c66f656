//! S3-compatible BlobStore

use crate::{BlobConfig, BlobError};
use docsift_domain::traits::BlobStore;
use docsift_domain::BlobKey;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, Region};
use tracing::{debug, info};

/// Blob store backed by an S3-compatible bucket
///
/// Uses path-style addressing, which Backblaze B2 and MinIO require.
pub struct S3BlobStore {
    bucket: Box<Bucket>,
}

impl S3BlobStore {
    /// Build a store from validated configuration
    ///
    /// No request is made until the first `put` or `get`.
    pub fn new(config: &BlobConfig) -> Result<Self, BlobError> {
        let credentials = Credentials::new(
            Some(&config.access_key_id),
            Some(&config.secret_access_key),
            None,
            None,
            None,
        )
        .map_err(|e| BlobError::Credentials(e.to_string()))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| BlobError::Backend(e.to_string()))?
            .with_path_style();

        info!(
            bucket = %config.bucket,
            endpoint = %config.endpoint,
            "Configured blob store"
        );
        Ok(Self { bucket: Box::new(bucket) })
    }

    /// Name of the target bucket
    pub fn bucket_name(&self) -> &str {
        &self.bucket.name
    }
}

impl BlobStore for S3BlobStore {
    type Error = BlobError;

    async fn put(&self, key: &BlobKey, bytes: &[u8], content_type: &str) -> Result<(), BlobError> {
        let response = self
            .bucket
            .put_object_with_content_type(key.as_str(), bytes, content_type)
            .await
            .map_err(|e| backend_error(e, key))?;
        check_status(response.status_code(), key)?;

        debug!(key = %key, bytes = bytes.len(), "Stored blob");
        Ok(())
    }

    async fn get(&self, key: &BlobKey) -> Result<Vec<u8>, BlobError> {
        let response = self
            .bucket
            .get_object(key.as_str())
            .await
            .map_err(|e| backend_error(e, key))?;
        check_status(response.status_code(), key)?;

        let bytes = response.bytes().to_vec();
        debug!(key = %key, bytes = bytes.len(), "Fetched blob");
        Ok(bytes)
    }
}

fn backend_error(error: S3Error, key: &BlobKey) -> BlobError {
    match error {
        S3Error::HttpFailWithBody(404, _) => BlobError::NotFound(key.to_string()),
        other => BlobError::Backend(other.to_string()),
    }
}

fn check_status(status: u16, key: &BlobKey) -> Result<(), BlobError> {
    match status {
        200..=299 => Ok(()),
        404 => Err(BlobError::NotFound(key.to_string())),
        status => Err(BlobError::UnexpectedStatus {
            status,
            key: key.to_string(),
        }),
    }
}
