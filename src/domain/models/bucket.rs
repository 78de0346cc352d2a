use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bucket record as reported by the remote service.
///
/// The remote service is the sole owner of bucket records; this layer never
/// caches them beyond a single call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// Unique bucket identifier
    pub id: String,
    /// Whether objects are readable without a signed URL
    pub public: bool,
    /// Optional MIME-type allowlist enforced on upload
    pub allowed_mime_types: Option<Vec<String>>,
    /// Optional per-file size limit in bytes
    pub file_size_limit: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Bucket {
    /// The upload constraints this bucket enforces.
    pub fn policy(&self) -> BucketPolicy {
        BucketPolicy {
            allowed_mime_types: self.allowed_mime_types.clone(),
            file_size_limit: self.file_size_limit,
        }
    }
}

/// Upload constraints checked before a file is sent to the remote service.
///
/// An absent constraint means that dimension always passes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BucketPolicy {
    pub allowed_mime_types: Option<Vec<String>>,
    pub file_size_limit: Option<u64>,
}

/// Settings applied when creating or updating a bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketSettings {
    /// Defaults to private when unspecified
    pub public: Option<bool>,
    pub allowed_mime_types: Option<Vec<String>>,
    pub file_size_limit: Option<u64>,
}

/// One entry of the declarative bucket provisioning config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketConfig {
    pub id: String,
    #[serde(default)]
    pub public: bool,
    pub allowed_mime_types: Option<Vec<String>>,
    pub file_size_limit: Option<u64>,
}

impl BucketConfig {
    pub fn settings(&self) -> BucketSettings {
        BucketSettings {
            public: Some(self.public),
            allowed_mime_types: self.allowed_mime_types.clone(),
            file_size_limit: self.file_size_limit,
        }
    }
}

/// Outcome of provisioning a declarative bucket config.
///
/// Provisioning never fails as a whole; per-bucket failures are accumulated
/// and the remaining buckets are still attempted.
#[derive(Debug, Default)]
pub struct BucketProvisionReport {
    /// Buckets created by this run
    pub created: Vec<String>,
    /// Buckets that were already present (including creation races)
    pub existing: Vec<String>,
    /// Creation failures keyed by bucket id
    pub errors: Vec<(String, crate::domain::errors::StorageError)>,
}
