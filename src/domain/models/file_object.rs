use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A stored object as reported by a list call.
///
/// Every read reflects the remote state at call time; nothing is cached
/// locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileObject {
    /// Path relative to the listed prefix
    pub name: String,
    /// Opaque remote identifier, absent for folder placeholders
    pub id: Option<String>,
    pub size: u64,
    pub content_type: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
    /// Arbitrary metadata bag attached by the remote service
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// A typed file handed to the upload path: name and content type are known,
/// so bucket-policy validation can run before any network traffic.
#[derive(Debug, Clone)]
pub struct FilePayload {
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl FilePayload {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Body of an upload call.
///
/// Raw byte bodies carry no name or content type, so they skip bucket-policy
/// validation the same way an untyped blob does.
#[derive(Debug, Clone)]
pub enum UploadBody {
    File(FilePayload),
    Raw(Bytes),
}

impl UploadBody {
    pub fn len(&self) -> u64 {
        match self {
            UploadBody::File(file) => file.size(),
            UploadBody::Raw(data) => data.len() as u64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_bytes(self) -> Bytes {
        match self {
            UploadBody::File(file) => file.data,
            UploadBody::Raw(data) => data,
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        match self {
            UploadBody::File(file) => Some(&file.content_type),
            UploadBody::Raw(_) => None,
        }
    }
}

impl From<FilePayload> for UploadBody {
    fn from(file: FilePayload) -> Self {
        UploadBody::File(file)
    }
}

impl From<Bytes> for UploadBody {
    fn from(data: Bytes) -> Self {
        UploadBody::Raw(data)
    }
}

/// Options for a single upload call.
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Cache-control header value, defaults to "3600"
    pub cache_control: Option<String>,
    /// Overrides the payload's own content type when set
    pub content_type: Option<String>,
    /// Overwrite an existing object at the same path. Defaults to false:
    /// uploads to an existing path fail unless explicitly opted in.
    pub upsert: bool,
}

/// Options for `upload_file_with_validation`: where the object lands and how
/// its name is derived.
#[derive(Debug, Clone, Default)]
pub struct UploadPlacement {
    /// Optional folder prefix for the destination path
    pub folder: Option<String>,
    /// Generate a collision-resistant filename instead of keeping the
    /// original one
    pub unique_name: bool,
    pub upload: UploadOptions,
}

/// Produced once per successful upload; immutable afterward.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadResult {
    /// Path the object was stored under
    pub path: String,
    /// Opaque remote identifier, when the service reports one
    pub id: Option<String>,
    /// Resolved public URL of the stored object
    pub public_url: String,
}

/// Produced once per successful download call; not cached.
#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub data: Bytes,
    /// Basename of the downloaded path
    pub filename: String,
    pub content_type: Option<String>,
    pub size: u64,
}

/// Sort key for list calls, passed through to the remote service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortBy {
    pub column: String,
    pub ascending: bool,
}

/// Options for list calls. Defaults applied by the file service:
/// limit 100, offset 0.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub sort_by: Option<SortBy>,
    /// Free-text filename search, passed through verbatim
    pub search: Option<String>,
}
