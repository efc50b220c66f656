//! Blob store configuration from the environment

use std::fmt;
use thiserror::Error;

/// Bucket name variable
pub const ENV_BUCKET: &str = "BLOB_BUCKET";
/// Access key id variable
pub const ENV_ACCESS_KEY_ID: &str = "BLOB_ACCESS_KEY_ID";
/// Secret access key variable
pub const ENV_SECRET_ACCESS_KEY: &str = "BLOB_SECRET_ACCESS_KEY";
/// Region variable
pub const ENV_REGION: &str = "BLOB_REGION";
/// Endpoint variable: full URL or bare region name
pub const ENV_ENDPOINT: &str = "BLOB_ENDPOINT";

/// Region used when `BLOB_REGION` is unset
pub const DEFAULT_REGION: &str = "us-west-004";

/// Blob storage is missing or misconfigured
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageConfigError {
    /// Required variables are unset or empty
    #[error("Blob storage is not configured, missing: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    /// The endpoint is neither an http(s) URL nor a region name
    #[error(
        "Invalid BLOB_ENDPOINT {endpoint:?}: expected a full URL (e.g. https://s3.us-west-004.backblazeb2.com) or a region name (e.g. us-west-004)"
    )]
    InvalidEndpoint {
        /// Offending value
        endpoint: String,
    },
}

/// Connection settings for an S3-compatible bucket
#[derive(Clone, PartialEq, Eq)]
pub struct BlobConfig {
    /// Bucket name
    pub bucket: String,
    /// Access key id
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Signing region
    pub region: String,
    /// Resolved endpoint URL
    pub endpoint: String,
}

impl BlobConfig {
    /// Read the configuration from process environment variables
    pub fn from_env() -> Result<Self, StorageConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through an arbitrary variable lookup
    ///
    /// Empty values count as unset. Every missing variable is reported at
    /// once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, StorageConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bucket = get(ENV_BUCKET);
        let access_key_id = get(ENV_ACCESS_KEY_ID);
        let secret_access_key = get(ENV_SECRET_ACCESS_KEY);

        let (bucket, access_key_id, secret_access_key) =
            match (bucket, access_key_id, secret_access_key) {
                (Some(b), Some(a), Some(s)) => (b, a, s),
                (b, a, s) => {
                    let missing = [(ENV_BUCKET, b), (ENV_ACCESS_KEY_ID, a), (ENV_SECRET_ACCESS_KEY, s)]
                        .into_iter()
                        .filter(|(_, value)| value.is_none())
                        .map(|(name, _)| name)
                        .collect();
                    return Err(StorageConfigError::Missing(missing));
                }
            };

        let region = get(ENV_REGION).unwrap_or_else(|| DEFAULT_REGION.to_string());
        let endpoint = resolve_endpoint(get(ENV_ENDPOINT).as_deref(), &region)?;

        Ok(Self {
            bucket,
            access_key_id,
            secret_access_key,
            region,
            endpoint,
        })
    }
}

impl fmt::Debug for BlobConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobConfig")
            .field("bucket", &self.bucket)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Turn an optional endpoint setting into a URL
///
/// A full http(s) URL is used as is. A bare name is treated as a Backblaze
/// B2 region. Without a setting the endpoint is derived from `region`.
pub fn resolve_endpoint(endpoint: Option<&str>, region: &str) -> Result<String, StorageConfigError> {
    let candidate = endpoint.unwrap_or(region);

    if candidate.starts_with("http://") || candidate.starts_with("https://") {
        return Ok(candidate.trim_end_matches('/').to_string());
    }

    let bare_region = !candidate.is_empty()
        && !candidate.contains("://")
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');

    if bare_region {
        Ok(format!("https://s3.{}.backblazeb2.com", candidate))
    } else {
        Err(StorageConfigError::InvalidEndpoint {
            endpoint: candidate.to_string(),
        })
    }
}
