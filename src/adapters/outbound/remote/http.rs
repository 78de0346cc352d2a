use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adapters::outbound::remote::url_query;
use crate::domain::models::{
    Bucket, BucketSettings, FileObject, TransformOptions, UrlOptions,
};
use crate::domain::value_objects::BucketName;
use crate::ports::remote::{
    RemoteError, RemoteListQuery, RemotePayload, RemoteResult, RemoteSignedUploadUrl,
    RemoteStorageClient, RemoteUploadOptions, RemoteUploadedObject,
};

/// HTTP implementation of the remote storage client against a
/// Supabase-storage-style REST surface (`/storage/v1/...`), authenticated
/// with a bearer service key.
pub struct HttpRemoteClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct BucketDto {
    id: String,
    public: bool,
    allowed_mime_types: Option<Vec<String>>,
    file_size_limit: Option<u64>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<BucketDto> for Bucket {
    fn from(dto: BucketDto) -> Self {
        Bucket {
            id: dto.id,
            public: dto.public,
            allowed_mime_types: dto.allowed_mime_types,
            file_size_limit: dto.file_size_limit,
            created_at: dto.created_at,
            updated_at: dto.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateBucketBody<'a> {
    id: &'a str,
    name: &'a str,
    public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    allowed_mime_types: Option<&'a Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_size_limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ObjectDto {
    name: String,
    id: Option<String>,
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    metadata: Option<HashMap<String, serde_json::Value>>,
}

impl From<ObjectDto> for FileObject {
    fn from(dto: ObjectDto) -> Self {
        let metadata = dto.metadata.unwrap_or_default();
        let size = metadata
            .get("size")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        let content_type = metadata
            .get("mimetype")
            .and_then(|v| v.as_str())
            .map(String::from);

        FileObject {
            name: dto.name,
            id: dto.id,
            size,
            content_type,
            last_modified: dto.updated_at,
            metadata,
        }
    }
}

#[derive(Debug, Serialize)]
struct SortByBody {
    column: String,
    order: &'static str,
}

#[derive(Debug, Serialize)]
struct ListBody<'a> {
    prefix: &'a str,
    limit: usize,
    offset: usize,
    #[serde(rename = "sortBy", skip_serializing_if = "Option::is_none")]
    sort_by: Option<SortByBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(rename = "Key")]
    key: String,
    #[serde(rename = "Id")]
    id: Option<String>,
}

#[derive(Debug, Serialize)]
struct MoveCopyBody<'a> {
    #[serde(rename = "bucketId")]
    bucket_id: &'a str,
    #[serde(rename = "sourceKey")]
    source_key: &'a str,
    #[serde(rename = "destinationKey")]
    destination_key: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    message: String,
}

#[derive(Debug, Serialize)]
struct RemoveBody<'a> {
    prefixes: &'a [String],
}

#[derive(Debug, Serialize)]
struct SignBody<'a> {
    #[serde(rename = "expiresIn")]
    expires_in: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    transform: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    paths: Option<&'a [String]>,
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

#[derive(Debug, Deserialize)]
struct SignBatchEntry {
    #[serde(rename = "signedURL")]
    signed_url: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SignedUploadResponse {
    url: String,
}

/// Loosely typed error body the service returns on failure.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl HttpRemoteClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.endpoint(path))
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
    }

    /// Transport failures become network-flagged remote errors; service
    /// failures carry the response's message and status so the error mapper
    /// can classify them.
    fn transport_error(err: reqwest::Error) -> RemoteError {
        RemoteError {
            message: Some(err.to_string()),
            status_code: err.status().map(|s| s.as_u16()),
            network: err.status().is_none(),
        }
    }

    async fn check(response: reqwest::Response) -> RemoteResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|parsed| parsed.message.or(parsed.error))
            .unwrap_or(body);

        debug!(status = status.as_u16(), message, "remote storage error");

        Err(RemoteError {
            message: Some(message),
            status_code: Some(status.as_u16()),
            network: false,
        })
    }

    async fn json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> RemoteResult<T> {
        Self::check(response)
            .await?
            .json::<T>()
            .await
            .map_err(Self::transport_error)
    }

    fn transform_json(transform: &TransformOptions) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (key, value) in transform.to_query_pairs() {
            match key {
                "width" | "height" | "quality" => {
                    if let Ok(number) = value.parse::<u64>() {
                        map.insert(key.to_string(), serde_json::json!(number));
                    }
                }
                _ => {
                    map.insert(key.to_string(), serde_json::json!(value));
                }
            }
        }
        serde_json::Value::Object(map)
    }
}

#[async_trait]
impl RemoteStorageClient for HttpRemoteClient {
    async fn list_buckets(&self) -> RemoteResult<Vec<Bucket>> {
        let response = self
            .request(reqwest::Method::GET, "/bucket")
            .send()
            .await
            .map_err(Self::transport_error)?;
        let buckets: Vec<BucketDto> = Self::json(response).await?;
        Ok(buckets.into_iter().map(Bucket::from).collect())
    }

    async fn get_bucket(&self, bucket: &BucketName) -> RemoteResult<Bucket> {
        let response = self
            .request(reqwest::Method::GET, &format!("/bucket/{}", bucket))
            .send()
            .await
            .map_err(Self::transport_error)?;
        let dto: BucketDto = Self::json(response).await?;
        Ok(dto.into())
    }

    async fn create_bucket(
        &self,
        bucket: &BucketName,
        settings: &BucketSettings,
    ) -> RemoteResult<()> {
        let body = CreateBucketBody {
            id: bucket.as_str(),
            name: bucket.as_str(),
            public: settings.public.unwrap_or(false),
            allowed_mime_types: settings.allowed_mime_types.as_ref(),
            file_size_limit: settings.file_size_limit,
        };
        let response = self
            .request(reqwest::Method::POST, "/bucket")
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;
        Self::check(response).await?;
        Ok(())
    }

    async fn update_bucket(
        &self,
        bucket: &BucketName,
        settings: &BucketSettings,
    ) -> RemoteResult<()> {
        let body = serde_json::json!({
            "public": settings.public.unwrap_or(false),
            "allowed_mime_types": settings.allowed_mime_types,
            "file_size_limit": settings.file_size_limit,
        });
        let response = self
            .request(reqwest::Method::PUT, &format!("/bucket/{}", bucket))
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &BucketName) -> RemoteResult<()> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("/bucket/{}", bucket))
            .send()
            .await
            .map_err(Self::transport_error)?;
        Self::check(response).await?;
        Ok(())
    }

    async fn empty_bucket(&self, bucket: &BucketName) -> RemoteResult<()> {
        let response = self
            .request(reqwest::Method::POST, &format!("/bucket/{}/empty", bucket))
            .send()
            .await
            .map_err(Self::transport_error)?;
        Self::check(response).await?;
        Ok(())
    }

    async fn list(
        &self,
        bucket: &BucketName,
        query: &RemoteListQuery,
    ) -> RemoteResult<Vec<FileObject>> {
        let body = ListBody {
            prefix: &query.prefix,
            limit: query.limit,
            offset: query.offset,
            sort_by: query.sort_by.as_ref().map(|sort| SortByBody {
                column: sort.column.clone(),
                order: if sort.ascending { "asc" } else { "desc" },
            }),
            search: query.search.as_deref(),
        };
        let response = self
            .request(reqwest::Method::POST, &format!("/object/list/{}", bucket))
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;
        let objects: Vec<ObjectDto> = Self::json(response).await?;
        Ok(objects.into_iter().map(FileObject::from).collect())
    }

    async fn upload(
        &self,
        bucket: &BucketName,
        path: &str,
        data: Bytes,
        options: &RemoteUploadOptions,
    ) -> RemoteResult<RemoteUploadedObject> {
        let mut request = self
            .request(reqwest::Method::POST, &format!("/object/{}/{}", bucket, path))
            .header(
                "cache-control",
                format!("max-age={}", options.cache_control),
            )
            .header("x-upsert", if options.upsert { "true" } else { "false" })
            .body(data);
        if let Some(content_type) = &options.content_type {
            request = request.header("content-type", content_type.clone());
        }

        let response = request.send().await.map_err(Self::transport_error)?;
        let uploaded: UploadResponse = Self::json(response).await?;

        // The service reports the key as "<bucket>/<path>".
        let prefix = format!("{}/", bucket);
        let stored_path = uploaded
            .key
            .strip_prefix(&prefix)
            .unwrap_or(&uploaded.key)
            .to_string();

        Ok(RemoteUploadedObject {
            path: stored_path,
            id: uploaded.id,
        })
    }

    async fn download(
        &self,
        bucket: &BucketName,
        path: &str,
        transform: Option<&TransformOptions>,
    ) -> RemoteResult<RemotePayload> {
        let endpoint = match transform {
            Some(t) if !t.is_noop() => {
                let options = UrlOptions {
                    download: None,
                    transform: Some(t.clone()),
                };
                format!(
                    "/render/image/authenticated/{}/{}{}",
                    bucket,
                    path,
                    url_query(&options)
                )
            }
            _ => format!("/object/{}/{}", bucket, path),
        };

        let response = self
            .request(reqwest::Method::GET, &endpoint)
            .send()
            .await
            .map_err(Self::transport_error)?;
        let response = Self::check(response).await?;

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let data = response.bytes().await.map_err(Self::transport_error)?;

        Ok(RemotePayload { data, content_type })
    }

    async fn move_object(
        &self,
        bucket: &BucketName,
        from: &str,
        to: &str,
    ) -> RemoteResult<String> {
        let body = MoveCopyBody {
            bucket_id: bucket.as_str(),
            source_key: from,
            destination_key: to,
        };
        let response = self
            .request(reqwest::Method::POST, "/object/move")
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;
        let message: MessageResponse = Self::json(response).await?;
        Ok(message.message)
    }

    async fn copy_object(&self, bucket: &BucketName, from: &str, to: &str) -> RemoteResult<String> {
        let body = MoveCopyBody {
            bucket_id: bucket.as_str(),
            source_key: from,
            destination_key: to,
        };
        let response = self
            .request(reqwest::Method::POST, "/object/copy")
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;
        let uploaded: UploadResponse = Self::json(response).await?;

        let prefix = format!("{}/", bucket);
        Ok(uploaded
            .key
            .strip_prefix(&prefix)
            .unwrap_or(&uploaded.key)
            .to_string())
    }

    async fn remove(
        &self,
        bucket: &BucketName,
        paths: &[String],
    ) -> RemoteResult<Vec<FileObject>> {
        let body = RemoveBody { prefixes: paths };
        let response = self
            .request(reqwest::Method::DELETE, &format!("/object/{}", bucket))
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;
        let objects: Vec<ObjectDto> = Self::json(response).await?;
        Ok(objects.into_iter().map(FileObject::from).collect())
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
        let body = SignBody {
            expires_in,
            transform: options.transform.as_ref().map(Self::transform_json),
            paths: None,
        };
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/object/sign/{}/{}", bucket, path),
            )
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;
        let signed: SignResponse = Self::json(response).await?;

        let mut url = format!("{}{}", self.base_url, signed.signed_url);
        if let Some(download) = &options.download {
            url.push_str(&format!("&download={}", download));
        }
        Ok(url)
    }

    async fn create_signed_urls(
        &self,
        bucket: &BucketName,
        paths: &[String],
        expires_in: u64,
    ) -> RemoteResult<Vec<String>> {
        let body = SignBody {
            expires_in,
            transform: None,
            paths: Some(paths),
        };
        let response = self
            .request(reqwest::Method::POST, &format!("/object/sign/{}", bucket))
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;
        let entries: Vec<SignBatchEntry> = Self::json(response).await?;

        entries
            .into_iter()
            .map(|entry| match (entry.signed_url, entry.error) {
                (Some(signed), None) => Ok(format!("{}{}", self.base_url, signed)),
                (_, Some(error)) => Err(RemoteError::message(error)),
                (None, None) => Err(RemoteError::message("missing signed URL in response")),
            })
            .collect()
    }

    async fn create_signed_upload_url(
        &self,
        bucket: &BucketName,
        path: &str,
    ) -> RemoteResult<RemoteSignedUploadUrl> {
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/object/upload/sign/{}/{}", bucket, path),
            )
            .send()
            .await
            .map_err(Self::transport_error)?;
        let signed: SignedUploadResponse = Self::json(response).await?;

        let token = signed
            .url
            .split_once("token=")
            .map(|(_, token)| token.to_string())
            .ok_or_else(|| RemoteError::message("missing token in signed upload URL"))?;

        Ok(RemoteSignedUploadUrl {
            url: format!("{}{}", self.base_url, signed.url),
            token,
        })
    }
}
