use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::adapters::outbound::remote::url_query;
use crate::domain::models::{
    Bucket, BucketSettings, FileObject, TransformOptions, UrlOptions,
};
use crate::domain::value_objects::BucketName;
use crate::ports::remote::{
    RemoteError, RemoteListQuery, RemotePayload, RemoteResult, RemoteSignedUploadUrl,
    RemoteStorageClient, RemoteUploadOptions, RemoteUploadedObject,
};

const DEFAULT_BASE_URL: &str = "http://storage.local/storage/v1";

#[derive(Clone)]
struct StoredObject {
    id: String,
    data: Bytes,
    content_type: Option<String>,
    cache_control: String,
    etag: String,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
}

#[derive(Default)]
struct RemoteState {
    buckets: HashMap<String, Bucket>,
    // bucket id -> path -> object; BTreeMap keeps listings name-ordered
    objects: HashMap<String, BTreeMap<String, StoredObject>>,
}

/// In-memory implementation of the remote storage client for testing and
/// development. Mirrors the hosted service's observable behavior, including
/// its loosely worded error messages, so the error mapper sees realistic
/// input.
#[derive(Clone)]
pub struct InMemoryRemoteClient {
    base_url: String,
    state: Arc<RwLock<RemoteState>>,
}

impl InMemoryRemoteClient {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            state: Arc::new(RwLock::new(RemoteState::default())),
        }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            state: Arc::new(RwLock::new(RemoteState::default())),
        }
    }

    fn bucket_not_found() -> RemoteError {
        RemoteError::message("Bucket not found").with_status(404)
    }

    fn object_not_found() -> RemoteError {
        RemoteError::message("Object not found").with_status(404)
    }

    fn already_exists() -> RemoteError {
        RemoteError::message("The resource already exists").with_status(409)
    }

    fn file_object(path: &str, stored: &StoredObject) -> FileObject {
        let mut metadata = HashMap::new();
        metadata.insert("eTag".to_string(), serde_json::json!(stored.etag));
        metadata.insert(
            "cacheControl".to_string(),
            serde_json::json!(stored.cache_control),
        );

        FileObject {
            name: path.to_string(),
            id: Some(stored.id.clone()),
            size: stored.data.len() as u64,
            content_type: stored.content_type.clone(),
            last_modified: Some(stored.updated_at),
            metadata,
        }
    }
}

impl Default for InMemoryRemoteClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteStorageClient for InMemoryRemoteClient {
    async fn list_buckets(&self) -> RemoteResult<Vec<Bucket>> {
        let state = self.state.read().await;
        let mut buckets: Vec<Bucket> = state.buckets.values().cloned().collect();
        buckets.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(buckets)
    }

    async fn get_bucket(&self, bucket: &BucketName) -> RemoteResult<Bucket> {
        let state = self.state.read().await;
        state
            .buckets
            .get(bucket.as_str())
            .cloned()
            .ok_or_else(Self::bucket_not_found)
    }

    async fn create_bucket(
        &self,
        bucket: &BucketName,
        settings: &BucketSettings,
    ) -> RemoteResult<()> {
        let mut state = self.state.write().await;
        if state.buckets.contains_key(bucket.as_str()) {
            return Err(Self::already_exists());
        }

        let now = Utc::now();
        state.buckets.insert(
            bucket.as_str().to_string(),
            Bucket {
                id: bucket.as_str().to_string(),
                public: settings.public.unwrap_or(false),
                allowed_mime_types: settings.allowed_mime_types.clone(),
                file_size_limit: settings.file_size_limit,
                created_at: Some(now),
                updated_at: Some(now),
            },
        );
        state
            .objects
            .insert(bucket.as_str().to_string(), BTreeMap::new());
        Ok(())
    }

    async fn update_bucket(
        &self,
        bucket: &BucketName,
        settings: &BucketSettings,
    ) -> RemoteResult<()> {
        let mut state = self.state.write().await;
        let record = state
            .buckets
            .get_mut(bucket.as_str())
            .ok_or_else(Self::bucket_not_found)?;

        if let Some(public) = settings.public {
            record.public = public;
        }
        record.allowed_mime_types = settings.allowed_mime_types.clone();
        record.file_size_limit = settings.file_size_limit;
        record.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &BucketName) -> RemoteResult<()> {
        let mut state = self.state.write().await;
        let occupied = state
            .objects
            .get(bucket.as_str())
            .map(|objects| !objects.is_empty())
            .unwrap_or(false);
        if occupied {
            return Err(RemoteError::message(
                "Bucket must be empty before it can be deleted",
            )
            .with_status(409));
        }
        if state.buckets.remove(bucket.as_str()).is_none() {
            return Err(Self::bucket_not_found());
        }
        state.objects.remove(bucket.as_str());
        Ok(())
    }

    async fn empty_bucket(&self, bucket: &BucketName) -> RemoteResult<()> {
        let mut state = self.state.write().await;
        if !state.buckets.contains_key(bucket.as_str()) {
            return Err(Self::bucket_not_found());
        }
        state
            .objects
            .insert(bucket.as_str().to_string(), BTreeMap::new());
        Ok(())
    }

    async fn list(
        &self,
        bucket: &BucketName,
        query: &RemoteListQuery,
    ) -> RemoteResult<Vec<FileObject>> {
        let state = self.state.read().await;
        let objects = state
            .objects
            .get(bucket.as_str())
            .ok_or_else(Self::bucket_not_found)?;

        let prefix = if query.prefix.is_empty() {
            String::new()
        } else {
            format!("{}/", query.prefix.trim_end_matches('/'))
        };

        let mut entries: Vec<FileObject> = objects
            .iter()
            .filter(|(path, _)| path.starts_with(&prefix))
            .map(|(path, stored)| Self::file_object(&path[prefix.len()..], stored))
            .filter(|entry| match &query.search {
                Some(needle) => entry.name.contains(needle),
                None => true,
            })
            .collect();

        if let Some(sort) = &query.sort_by {
            entries.sort_by(|a, b| {
                let ordering = match sort.column.as_str() {
                    "updated_at" | "created_at" => a.last_modified.cmp(&b.last_modified),
                    "size" => a.size.cmp(&b.size),
                    _ => a.name.cmp(&b.name),
                };
                if sort.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        Ok(entries
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }

    async fn upload(
        &self,
        bucket: &BucketName,
        path: &str,
        data: Bytes,
        options: &RemoteUploadOptions,
    ) -> RemoteResult<RemoteUploadedObject> {
        let mut state = self.state.write().await;
        let record = state
            .buckets
            .get(bucket.as_str())
            .ok_or_else(Self::bucket_not_found)?
            .clone();

        // The hosted service enforces bucket policy server-side as well.
        if let Some(limit) = record.file_size_limit {
            if data.len() as u64 > limit {
                return Err(RemoteError::message(
                    "The object exceeds the maximum allowed size",
                )
                .with_status(413));
            }
        }
        if let (Some(allowed), Some(content_type)) =
            (&record.allowed_mime_types, &options.content_type)
        {
            if !allowed.is_empty() && !allowed.iter().any(|m| m == content_type) {
                return Err(RemoteError::message(format!(
                    "mime type {} is not supported",
                    content_type
                ))
                .with_status(415));
            }
        }

        let objects = state
            .objects
            .entry(bucket.as_str().to_string())
            .or_default();
        if objects.contains_key(path) && !options.upsert {
            return Err(Self::already_exists());
        }

        let now = Utc::now();
        let created_at = objects
            .get(path)
            .map(|existing| existing.created_at)
            .unwrap_or(now);
        let stored = StoredObject {
            id: Uuid::new_v4().to_string(),
            etag: format!("{:x}", md5::compute(&data)),
            data,
            content_type: options.content_type.clone(),
            cache_control: options.cache_control.clone(),
            created_at,
            updated_at: now,
        };
        let id = stored.id.clone();
        objects.insert(path.to_string(), stored);

        Ok(RemoteUploadedObject {
            path: path.to_string(),
            id: Some(id),
        })
    }

    async fn download(
        &self,
        bucket: &BucketName,
        path: &str,
        _transform: Option<&TransformOptions>,
    ) -> RemoteResult<RemotePayload> {
        // Transforms are a remote-side concern; the in-memory store returns
        // the stored bytes untouched.
        let state = self.state.read().await;
        let stored = state
            .objects
            .get(bucket.as_str())
            .ok_or_else(Self::bucket_not_found)?
            .get(path)
            .ok_or_else(Self::object_not_found)?;

        Ok(RemotePayload {
            data: stored.data.clone(),
            content_type: stored.content_type.clone(),
        })
    }

    async fn move_object(
        &self,
        bucket: &BucketName,
        from: &str,
        to: &str,
    ) -> RemoteResult<String> {
        let mut state = self.state.write().await;
        let objects = state
            .objects
            .get_mut(bucket.as_str())
            .ok_or_else(Self::bucket_not_found)?;

        if objects.contains_key(to) {
            return Err(Self::already_exists());
        }
        let mut stored = objects.remove(from).ok_or_else(Self::object_not_found)?;
        stored.updated_at = Utc::now();
        objects.insert(to.to_string(), stored);
        Ok("Successfully moved".to_string())
    }

    async fn copy_object(&self, bucket: &BucketName, from: &str, to: &str) -> RemoteResult<String> {
        let mut state = self.state.write().await;
        let objects = state
            .objects
            .get_mut(bucket.as_str())
            .ok_or_else(Self::bucket_not_found)?;

        if objects.contains_key(to) {
            return Err(Self::already_exists());
        }
        let mut copy = objects.get(from).ok_or_else(Self::object_not_found)?.clone();
        copy.id = Uuid::new_v4().to_string();
        copy.created_at = Utc::now();
        copy.updated_at = copy.created_at;
        objects.insert(to.to_string(), copy);
        Ok(to.to_string())
    }

    async fn remove(
        &self,
        bucket: &BucketName,
        paths: &[String],
    ) -> RemoteResult<Vec<FileObject>> {
        let mut state = self.state.write().await;
        let objects = state
            .objects
            .get_mut(bucket.as_str())
            .ok_or_else(Self::bucket_not_found)?;

        // Missing paths are skipped silently, matching the hosted service.
        let mut removed = Vec::new();
        for path in paths {
            if let Some(stored) = objects.remove(path) {
                removed.push(Self::file_object(path, &stored));
            }
        }
        Ok(removed)
    }

    fn public_url(&self, bucket: &BucketName, path: &str, options: &UrlOptions) -> String {
        let query = url_query(options);
        if options.transform.as_ref().map(|t| !t.is_noop()).unwrap_or(false) {
            format!(
                "{}/render/image/public/{}/{}{}",
                self.base_url, bucket, path, query
            )
        } else {
            format!("{}/object/public/{}/{}{}", self.base_url, bucket, path, query)
        }
    }

    async fn create_signed_url(
        &self,
        bucket: &BucketName,
        path: &str,
        expires_in: u64,
        options: &UrlOptions,
    ) -> RemoteResult<String> {
        let state = self.state.read().await;
        let exists = state
            .objects
            .get(bucket.as_str())
            .ok_or_else(Self::bucket_not_found)?
            .contains_key(path);
        if !exists {
            return Err(Self::object_not_found());
        }

        let extra = url_query(options).replacen('?', "&", 1);
        Ok(format!(
            "{}/object/sign/{}/{}?token={}&expires_in={}{}",
            self.base_url,
            bucket,
            path,
            Uuid::new_v4().simple(),
            expires_in,
            extra
        ))
    }

    async fn create_signed_urls(
        &self,
        bucket: &BucketName,
        paths: &[String],
        expires_in: u64,
    ) -> RemoteResult<Vec<String>> {
        let mut urls = Vec::with_capacity(paths.len());
        for path in paths {
            urls.push(
                self.create_signed_url(bucket, path, expires_in, &UrlOptions::default())
                    .await?,
            );
        }
        Ok(urls)
    }

    async fn create_signed_upload_url(
        &self,
        bucket: &BucketName,
        path: &str,
    ) -> RemoteResult<RemoteSignedUploadUrl> {
        let state = self.state.read().await;
        if !state.buckets.contains_key(bucket.as_str()) {
            return Err(Self::bucket_not_found());
        }

        let token = Uuid::new_v4().simple().to_string();
        Ok(RemoteSignedUploadUrl {
            url: format!(
                "{}/object/upload/sign/{}/{}?token={}",
                self.base_url, bucket, path, token
            ),
            token,
        })
    }
}
