use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::debug;

use crate::domain::errors::StorageResult;
use crate::domain::models::{SignedUploadUrl, SignedUrl, SignedUrlOptions, UrlOptions};
use crate::domain::value_objects::BucketName;
use crate::ports::remote::RemoteStorageClient;
use crate::services::error_mapper::map_remote_error;

const DEFAULT_EXPIRES_IN: u64 = 3600;

/// URL issuance over the remote storage client: public URLs (pure string
/// construction), time-limited signed URLs, and signed upload grants.
#[derive(Clone)]
pub struct UrlService {
    client: Arc<dyn RemoteStorageClient>,
}

impl UrlService {
    pub fn new(client: Arc<dyn RemoteStorageClient>) -> Self {
        Self { client }
    }

    /// Public URL for an object. Deterministic; always returns a URL.
    pub fn get_public_url(&self, bucket: &BucketName, path: &str, options: &UrlOptions) -> String {
        self.client.public_url(bucket, path, options)
    }

    /// Issue a signed URL. `expires_at` is computed client-side from the
    /// request time plus the requested TTL (default 3600s); the remote
    /// service does not renegotiate the window, so treat it as approximate.
    pub async fn create_signed_url(
        &self,
        bucket: &BucketName,
        path: &str,
        options: SignedUrlOptions,
    ) -> StorageResult<SignedUrl> {
        let expires_in = options.expires_in.unwrap_or(DEFAULT_EXPIRES_IN);
        let url_options = UrlOptions {
            download: options.download,
            transform: options.transform,
        };

        debug!(bucket = %bucket, path, expires_in, "creating signed url");

        let url = self
            .client
            .create_signed_url(bucket, path, expires_in, &url_options)
            .await
            .map_err(map_remote_error)?;

        Ok(SignedUrl {
            url,
            path: path.to_string(),
            expires_at: Utc::now() + Duration::seconds(expires_in as i64),
        })
    }

    /// Batch signed-URL issuance. One TTL covers the whole batch.
    pub async fn create_signed_urls(
        &self,
        bucket: &BucketName,
        paths: &[String],
        expires_in: Option<u64>,
    ) -> StorageResult<Vec<SignedUrl>> {
        let expires_in = expires_in.unwrap_or(DEFAULT_EXPIRES_IN);

        let urls = self
            .client
            .create_signed_urls(bucket, paths, expires_in)
            .await
            .map_err(map_remote_error)?;

        let expires_at = Utc::now() + Duration::seconds(expires_in as i64);
        Ok(urls
            .into_iter()
            .zip(paths.iter())
            .map(|(url, path)| SignedUrl {
                url,
                path: path.clone(),
                expires_at,
            })
            .collect())
    }

    /// Issue a signed upload URL plus the one-time token authorizing a direct
    /// client-to-storage upload.
    pub async fn create_signed_upload_url(
        &self,
        bucket: &BucketName,
        path: &str,
    ) -> StorageResult<SignedUploadUrl> {
        let grant = self
            .client
            .create_signed_upload_url(bucket, path)
            .await
            .map_err(map_remote_error)?;

        Ok(SignedUploadUrl {
            url: grant.url,
            path: path.to_string(),
            token: grant.token,
        })
    }
}
