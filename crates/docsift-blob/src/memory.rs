//! In-memory BlobStore for tests

use crate::BlobError;
use docsift_domain::traits::BlobStore;
use docsift_domain::BlobKey;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Clone)]
struct StoredBlob {
    bytes: Vec<u8>,
    content_type: String,
}

/// Blob store holding objects in a shared map
///
/// Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    objects: Arc<RwLock<HashMap<String, StoredBlob>>>,
    reject_writes: bool,
}

impl MemoryBlobStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose `put` always fails, for exercising error paths
    pub fn failing() -> Self {
        Self {
            reject_writes: true,
            ..Self::default()
        }
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.objects.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the store holds no objects
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Content type recorded for a key
    pub fn content_type(&self, key: &BlobKey) -> Option<String> {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key.as_str())
            .map(|blob| blob.content_type.clone())
    }
}

impl BlobStore for MemoryBlobStore {
    type Error = BlobError;

    async fn put(&self, key: &BlobKey, bytes: &[u8], content_type: &str) -> Result<(), BlobError> {
        if self.reject_writes {
            return Err(BlobError::Backend("writes rejected".to_string()));
        }

        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                key.as_str().to_string(),
                StoredBlob {
                    bytes: bytes.to_vec(),
                    content_type: content_type.to_string(),
                },
            );
        Ok(())
    }

    async fn get(&self, key: &BlobKey) -> Result<Vec<u8>, BlobError> {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key.as_str())
            .map(|blob| blob.bytes.clone())
            .ok_or_else(|| BlobError::NotFound(key.to_string()))
    }
}
