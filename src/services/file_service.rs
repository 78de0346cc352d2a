use std::sync::Arc;

use tracing::debug;

use crate::domain::errors::{ErrorKind, StorageError, StorageResult};
use crate::domain::models::{
    BucketPolicy, DownloadOptions, DownloadResult, FileObject, FilePayload, ListOptions,
    UploadBody, UploadOptions, UploadPlacement, UploadResult, UrlOptions,
};
use crate::domain::paths::{basename, generate_unique_filename, join_paths, validate_file};
use crate::domain::value_objects::BucketName;
use crate::ports::remote::{RemoteListQuery, RemoteStorageClient, RemoteUploadOptions};
use crate::services::error_mapper::map_remote_error;

const DEFAULT_CACHE_CONTROL: &str = "3600";
const DEFAULT_LIST_LIMIT: usize = 100;

/// File operations over the remote storage client: upload, download, move,
/// copy, delete and list. Every remote failure crosses this boundary as a
/// mapped `StorageError`; nothing is retried here.
#[derive(Clone)]
pub struct FileService {
    client: Arc<dyn RemoteStorageClient>,
}

impl FileService {
    pub fn new(client: Arc<dyn RemoteStorageClient>) -> Self {
        Self { client }
    }

    /// Upload a body to an explicit path.
    ///
    /// Typed file bodies are validated against the target bucket's policy
    /// before any upload traffic: a policy violation short-circuits with
    /// `FileTooLarge` or `InvalidMimeType`. Raw byte bodies skip validation.
    /// Cache-control defaults to "3600" and upsert to false, so overwriting
    /// an existing path is opt-in.
    pub async fn upload_file(
        &self,
        bucket: &BucketName,
        path: &str,
        body: UploadBody,
        options: UploadOptions,
    ) -> StorageResult<UploadResult> {
        if let UploadBody::File(file) = &body {
            let record = self
                .client
                .get_bucket(bucket)
                .await
                .map_err(map_remote_error)?;
            self.check_policy(file, &record.policy())?;
        }

        let remote_options = RemoteUploadOptions {
            cache_control: options
                .cache_control
                .unwrap_or_else(|| DEFAULT_CACHE_CONTROL.to_string()),
            content_type: options
                .content_type
                .or_else(|| body.content_type().map(String::from)),
            upsert: options.upsert,
        };

        debug!(bucket = %bucket, path, size = body.len(), "uploading file");

        let uploaded = self
            .client
            .upload(bucket, path, body.into_bytes(), &remote_options)
            .await
            .map_err(map_remote_error)?;

        let public_url = self
            .client
            .public_url(bucket, &uploaded.path, &UrlOptions::default());

        Ok(UploadResult {
            path: uploaded.path,
            id: uploaded.id,
            public_url,
        })
    }

    /// Upload a typed file, validating against an explicitly supplied policy
    /// and deriving the destination path from the placement: optional folder
    /// prefix plus either the original or a generated unique filename.
    pub async fn upload_file_with_validation(
        &self,
        bucket: &BucketName,
        file: FilePayload,
        policy: &BucketPolicy,
        placement: UploadPlacement,
    ) -> StorageResult<UploadResult> {
        self.check_policy(&file, policy)?;

        let filename = if placement.unique_name {
            generate_unique_filename(&file.name)
        } else {
            file.name.clone()
        };

        let path = match &placement.folder {
            Some(folder) => join_paths([folder.as_str(), filename.as_str()]),
            None => filename,
        };

        self.upload_file(bucket, &path, UploadBody::File(file), placement.upload)
            .await
    }

    /// Download an object, optionally asking the remote service for an
    /// image transform. The transform's format is forwarded only when it is
    /// explicitly `origin`; the download endpoint does not accept the other
    /// formats, unlike the URL-construction path.
    pub async fn download_file(
        &self,
        bucket: &BucketName,
        path: &str,
        options: DownloadOptions,
    ) -> StorageResult<DownloadResult> {
        let transform = options.transform.map(|t| t.for_download());

        let payload = self
            .client
            .download(bucket, path, transform.as_ref())
            .await
            .map_err(map_remote_error)?;

        Ok(DownloadResult {
            filename: basename(path).to_string(),
            content_type: payload.content_type,
            size: payload.data.len() as u64,
            data: payload.data,
        })
    }

    /// Move an object within a bucket. Returns the remote status message.
    pub async fn move_file(
        &self,
        bucket: &BucketName,
        from: &str,
        to: &str,
    ) -> StorageResult<String> {
        self.client
            .move_object(bucket, from, to)
            .await
            .map_err(map_remote_error)
    }

    /// Copy an object within a bucket. Returns the new path.
    pub async fn copy_file(
        &self,
        bucket: &BucketName,
        from: &str,
        to: &str,
    ) -> StorageResult<String> {
        self.client
            .copy_object(bucket, from, to)
            .await
            .map_err(map_remote_error)
    }

    /// Delete a single object. Defined as the one-element batch delete so the
    /// two share semantics exactly.
    pub async fn delete_file(&self, bucket: &BucketName, path: &str) -> StorageResult<Vec<FileObject>> {
        self.delete_files(bucket, &[path.to_string()]).await
    }

    /// Batch delete. The remote call reports removed objects but no per-path
    /// failure detail; on failure callers cannot tell which paths survived.
    pub async fn delete_files(
        &self,
        bucket: &BucketName,
        paths: &[String],
    ) -> StorageResult<Vec<FileObject>> {
        debug!(bucket = %bucket, count = paths.len(), "deleting files");
        self.client
            .remove(bucket, paths)
            .await
            .map_err(map_remote_error)
    }

    /// List objects under a prefix. Defaults: limit 100, offset 0. Sort key
    /// and free-text search are passed through to the remote service.
    pub async fn list_files(
        &self,
        bucket: &BucketName,
        prefix: &str,
        options: ListOptions,
    ) -> StorageResult<Vec<FileObject>> {
        let query = RemoteListQuery {
            prefix: prefix.to_string(),
            limit: options.limit.unwrap_or(DEFAULT_LIST_LIMIT),
            offset: options.offset.unwrap_or(0),
            sort_by: options.sort_by,
            search: options.search,
        };

        self.client
            .list(bucket, &query)
            .await
            .map_err(map_remote_error)
    }

    fn check_policy(&self, file: &FilePayload, policy: &BucketPolicy) -> StorageResult<()> {
        if let Err(reason) = validate_file(file, policy) {
            let kind = if reason.is_size_related() {
                ErrorKind::FileTooLarge
            } else {
                ErrorKind::InvalidMimeType
            };
            let status = if kind == ErrorKind::FileTooLarge { 413 } else { 415 };
            return Err(StorageError::new(kind, reason.to_string()).with_status(status));
        }
        Ok(())
    }
}
