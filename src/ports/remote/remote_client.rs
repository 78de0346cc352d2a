use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::models::{
    Bucket, BucketSettings, FileObject, SortBy, TransformOptions, UrlOptions,
};
use crate::domain::value_objects::BucketName;

/// The raw error shape a remote client may surface: an optional message, an
/// optional status code, and a flag for transport-level failures.
///
/// This is deliberately narrow. The hosted service returns loosely typed
/// error bodies; the error mapper pattern-matches on this shape exactly once
/// and nothing above the service layer ever sees it.
#[derive(Debug, Clone, Default)]
pub struct RemoteError {
    pub message: Option<String>,
    pub status_code: Option<u16>,
    /// True when the request never produced a service response
    pub network: bool,
}

impl RemoteError {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn network(detail: impl Into<String>) -> Self {
        Self {
            message: Some(detail.into()),
            status_code: None,
            network: true,
        }
    }
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}", message),
            None => write!(f, "remote storage error"),
        }
    }
}

impl std::error::Error for RemoteError {}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Parameters forwarded verbatim to the remote upload endpoint. Defaults are
/// resolved by the file service before the call crosses this boundary.
#[derive(Debug, Clone)]
pub struct RemoteUploadOptions {
    pub cache_control: String,
    pub content_type: Option<String>,
    pub upsert: bool,
}

/// What the remote service reports about a stored object after upload.
#[derive(Debug, Clone)]
pub struct RemoteUploadedObject {
    pub path: String,
    pub id: Option<String>,
}

/// Raw downloaded payload before the file service shapes it into a
/// `DownloadResult`.
#[derive(Debug, Clone)]
pub struct RemotePayload {
    pub data: Bytes,
    pub content_type: Option<String>,
}

/// Parameters forwarded verbatim to the remote list endpoint.
#[derive(Debug, Clone)]
pub struct RemoteListQuery {
    pub prefix: String,
    pub limit: usize,
    pub offset: usize,
    pub sort_by: Option<SortBy>,
    pub search: Option<String>,
}

/// A signed upload grant as issued by the remote service.
#[derive(Debug, Clone)]
pub struct RemoteSignedUploadUrl {
    pub url: String,
    pub token: String,
}

/// Contract the hosted storage backend must present.
///
/// This layer treats the implementation as opaque: bucket CRUD, per-bucket
/// file operations and URL issuance, every fallible call returning
/// `RemoteResult`. Consistency of mutations is entirely the remote service's
/// concern; nothing here holds locks or transactions.
#[async_trait]
pub trait RemoteStorageClient: Send + Sync + 'static {
    // Bucket admin

    async fn list_buckets(&self) -> RemoteResult<Vec<Bucket>>;

    async fn get_bucket(&self, bucket: &BucketName) -> RemoteResult<Bucket>;

    async fn create_bucket(
        &self,
        bucket: &BucketName,
        settings: &BucketSettings,
    ) -> RemoteResult<()>;

    async fn update_bucket(
        &self,
        bucket: &BucketName,
        settings: &BucketSettings,
    ) -> RemoteResult<()>;

    async fn delete_bucket(&self, bucket: &BucketName) -> RemoteResult<()>;

    /// Remove every object from the bucket, keeping the bucket record.
    async fn empty_bucket(&self, bucket: &BucketName) -> RemoteResult<()>;

    // File operations

    async fn list(&self, bucket: &BucketName, query: &RemoteListQuery)
        -> RemoteResult<Vec<FileObject>>;

    async fn upload(
        &self,
        bucket: &BucketName,
        path: &str,
        data: Bytes,
        options: &RemoteUploadOptions,
    ) -> RemoteResult<RemoteUploadedObject>;

    async fn download(
        &self,
        bucket: &BucketName,
        path: &str,
        transform: Option<&TransformOptions>,
    ) -> RemoteResult<RemotePayload>;

    /// Returns the remote service's status message.
    async fn move_object(
        &self,
        bucket: &BucketName,
        from: &str,
        to: &str,
    ) -> RemoteResult<String>;

    /// Returns the path of the new copy.
    async fn copy_object(&self, bucket: &BucketName, from: &str, to: &str)
        -> RemoteResult<String>;

    /// Batch delete. The remote service reports the removed objects but no
    /// per-path failure detail.
    async fn remove(&self, bucket: &BucketName, paths: &[String])
        -> RemoteResult<Vec<FileObject>>;

    // URL issuance

    /// Deterministic string construction; no network involved.
    fn public_url(&self, bucket: &BucketName, path: &str, options: &UrlOptions) -> String;

    async fn create_signed_url(
        &self,
        bucket: &BucketName,
        path: &str,
        expires_in: u64,
        options: &UrlOptions,
    ) -> RemoteResult<String>;

    async fn create_signed_urls(
        &self,
        bucket: &BucketName,
        paths: &[String],
        expires_in: u64,
    ) -> RemoteResult<Vec<String>>;

    async fn create_signed_upload_url(
        &self,
        bucket: &BucketName,
        path: &str,
    ) -> RemoteResult<RemoteSignedUploadUrl>;
}
