//! Blob keys - references to raw uploaded bytes in object storage

use crate::document::DocumentId;
use std::fmt;

/// Prefix under which every uploaded document is stored
pub const DOCUMENT_PREFIX: &str = "documents/";

/// Final path component of a client-supplied filename
///
/// Both `/` and `\` separate components. `.` and `..` have no name and
/// yield an empty string.
///
/// # Examples
///
/// ```
/// use docsift_domain::blob_key::base_filename;
///
/// assert_eq!(base_filename("C:\\scans\\inv.pdf"), "inv.pdf");
/// assert_eq!(base_filename("x/../inv.txt"), "inv.txt");
/// assert_eq!(base_filename("a/.."), "");
/// ```
pub fn base_filename(filename: &str) -> &str {
    let base = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();
    match base {
        "." | ".." => "",
        name => name,
    }
}

/// Opaque reference to raw bytes in the blob store
///
/// Keys are derived deterministically from the document id and original
/// filename (`documents/{id}-{filename}`), so a key can be rebuilt from a
/// known id and filename without a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobKey(String);

impl BlobKey {
    /// Derive the key for a document's raw bytes
    ///
    /// # Examples
    ///
    /// ```
    /// use docsift_domain::{BlobKey, DocumentId};
    ///
    /// let key = BlobKey::derive(&DocumentId::from("42"), "inv.txt");
    /// assert_eq!(key.as_str(), "documents/42-inv.txt");
    /// ```
    pub fn derive(id: &DocumentId, filename: &str) -> Self {
        Self(format!("{}{}-{}", DOCUMENT_PREFIX, id, base_filename(filename)))
    }

    /// Wrap a key read back from storage
    pub fn from_stored(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BlobKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
