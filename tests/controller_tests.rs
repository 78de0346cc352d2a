use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use storage_kit::{
    BucketConfig, BucketName, BucketSettings, DeleteController, DownloadCallbacks,
    DownloadController, ErrorKind, FilePayload, ListController, ListOptions, Progress,
    RemoteError, RemoteListQuery, RemotePayload, RemoteResult, RemoteSignedUploadUrl,
    RemoteStorageClient, RemoteUploadOptions, RemoteUploadedObject, SignedUrlController,
    SignedUrlOptions, StorageServices, UploadCallbacks, UploadController, UploadOptions,
    create_in_memory_storage,
};
use storage_kit::domain::models::{
    Bucket, DownloadOptions, DownloadStatus, FileObject, MultiUploadStatus, TransformOptions,
    UploadStatus, UrlOptions,
};
use storage_kit::InMemoryRemoteClient;

fn name(s: &str) -> BucketName {
    BucketName::new(s).unwrap()
}

fn png(name: &str, size: usize) -> FilePayload {
    FilePayload::new(name, "image/png", Bytes::from(vec![0u8; size]))
}

/// How the fake misbehaves. Everything not covered by the active mode
/// delegates to a real in-memory client.
#[derive(Clone, Copy, PartialEq)]
enum FakeMode {
    /// Every fallible call fails as a transport error.
    FailAll,
    /// Uploads never complete; everything else behaves normally.
    HangUpload,
    /// Lookups say the bucket is missing while creation says it already
    /// exists, reproducing a concurrent-provisioner race.
    BucketRace,
}

struct FakeClient {
    mode: FakeMode,
    inner: InMemoryRemoteClient,
}

impl FakeClient {
    fn new(mode: FakeMode) -> Self {
        Self {
            mode,
            inner: InMemoryRemoteClient::new(),
        }
    }

    fn services(mode: FakeMode) -> StorageServices {
        StorageServices::from_client(Arc::new(Self::new(mode)))
    }

    fn transport_error(&self) -> RemoteError {
        RemoteError::network("connection reset by peer")
    }
}

#[async_trait]
impl RemoteStorageClient for FakeClient {
    async fn list_buckets(&self) -> RemoteResult<Vec<Bucket>> {
        match self.mode {
            FakeMode::FailAll => Err(self.transport_error()),
            _ => self.inner.list_buckets().await,
        }
    }

    async fn get_bucket(&self, bucket: &BucketName) -> RemoteResult<Bucket> {
        match self.mode {
            FakeMode::FailAll => Err(self.transport_error()),
            FakeMode::BucketRace => Err(RemoteError::message("Bucket not found").with_status(404)),
            _ => self.inner.get_bucket(bucket).await,
        }
    }

    async fn create_bucket(
        &self,
        bucket: &BucketName,
        settings: &BucketSettings,
    ) -> RemoteResult<()> {
        match self.mode {
            FakeMode::FailAll => Err(self.transport_error()),
            FakeMode::BucketRace => {
                Err(RemoteError::message("The resource already exists").with_status(409))
            }
            _ => self.inner.create_bucket(bucket, settings).await,
        }
    }

    async fn update_bucket(
        &self,
        bucket: &BucketName,
        settings: &BucketSettings,
    ) -> RemoteResult<()> {
        match self.mode {
            FakeMode::FailAll => Err(self.transport_error()),
            _ => self.inner.update_bucket(bucket, settings).await,
        }
    }

    async fn delete_bucket(&self, bucket: &BucketName) -> RemoteResult<()> {
        match self.mode {
            FakeMode::FailAll => Err(self.transport_error()),
            _ => self.inner.delete_bucket(bucket).await,
        }
    }

    async fn empty_bucket(&self, bucket: &BucketName) -> RemoteResult<()> {
        match self.mode {
            FakeMode::FailAll => Err(self.transport_error()),
            _ => self.inner.empty_bucket(bucket).await,
        }
    }

    async fn list(
        &self,
        bucket: &BucketName,
        query: &RemoteListQuery,
    ) -> RemoteResult<Vec<FileObject>> {
        match self.mode {
            FakeMode::FailAll => Err(self.transport_error()),
            _ => self.inner.list(bucket, query).await,
        }
    }

    async fn upload(
        &self,
        bucket: &BucketName,
        path: &str,
        data: Bytes,
        options: &RemoteUploadOptions,
    ) -> RemoteResult<RemoteUploadedObject> {
        match self.mode {
            FakeMode::FailAll => Err(self.transport_error()),
            FakeMode::HangUpload => std::future::pending().await,
            _ => self.inner.upload(bucket, path, data, options).await,
        }
    }

    async fn download(
        &self,
        bucket: &BucketName,
        path: &str,
        transform: Option<&TransformOptions>,
    ) -> RemoteResult<RemotePayload> {
        match self.mode {
            FakeMode::FailAll => Err(self.transport_error()),
            _ => self.inner.download(bucket, path, transform).await,
        }
    }

    async fn move_object(
        &self,
        bucket: &BucketName,
        from: &str,
        to: &str,
    ) -> RemoteResult<String> {
        match self.mode {
            FakeMode::FailAll => Err(self.transport_error()),
            _ => self.inner.move_object(bucket, from, to).await,
        }
    }

    async fn copy_object(
        &self,
        bucket: &BucketName,
        from: &str,
        to: &str,
    ) -> RemoteResult<String> {
        match self.mode {
            FakeMode::FailAll => Err(self.transport_error()),
            _ => self.inner.copy_object(bucket, from, to).await,
        }
    }

    async fn remove(
        &self,
        bucket: &BucketName,
        paths: &[String],
    ) -> RemoteResult<Vec<FileObject>> {
        match self.mode {
            FakeMode::FailAll => Err(self.transport_error()),
            _ => self.inner.remove(bucket, paths).await,
        }
    }

    fn public_url(&self, bucket: &BucketName, path: &str, options: &UrlOptions) -> String {
        self.inner.public_url(bucket, path, options)
    }

    async fn create_signed_url(
        &self,
        bucket: &BucketName,
        path: &str,
        expires_in: u64,
        options: &UrlOptions,
    ) -> RemoteResult<String> {
        match self.mode {
            FakeMode::FailAll => Err(self.transport_error()),
            _ => self.inner.create_signed_url(bucket, path, expires_in, options).await,
        }
    }

    async fn create_signed_urls(
        &self,
        bucket: &BucketName,
        paths: &[String],
        expires_in: u64,
    ) -> RemoteResult<Vec<String>> {
        match self.mode {
            FakeMode::FailAll => Err(self.transport_error()),
            _ => self.inner.create_signed_urls(bucket, paths, expires_in).await,
        }
    }

    async fn create_signed_upload_url(
        &self,
        bucket: &BucketName,
        path: &str,
    ) -> RemoteResult<RemoteSignedUploadUrl> {
        match self.mode {
            FakeMode::FailAll => Err(self.transport_error()),
            _ => self.inner.create_signed_upload_url(bucket, path).await,
        }
    }
}

async fn storage_with_bucket(bucket: &str) -> StorageServices {
    let services = create_in_memory_storage();
    services
        .buckets
        .create_bucket(&name(bucket), BucketSettings::default())
        .await
        .unwrap();
    services
}

#[tokio::test]
async fn test_upload_controller_reports_progress_and_success() {
    let services = storage_with_bucket("gallery").await;
    let bucket = name("gallery");

    let seen: Arc<Mutex<Vec<Progress>>> = Arc::new(Mutex::new(Vec::new()));
    let successes: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

    let controller = UploadController::new(
        services.files.clone(),
        UploadCallbacks {
            on_progress: Some({
                let seen = seen.clone();
                Arc::new(move |progress| seen.lock().unwrap().push(progress))
            }),
            on_success: Some({
                let successes = successes.clone();
                Arc::new(move |result| successes.lock().unwrap().push(result.path.clone()))
            }),
            on_error: None,
        },
    );

    let result = controller
        .upload(&bucket, "a.png", png("a.png", 1_000), UploadOptions::default())
        .await
        .unwrap();
    assert!(result.is_some());

    let state = controller.state().await;
    assert_eq!(state.status, UploadStatus::Success);
    assert_eq!(state.progress.percentage, 100);
    assert!(state.error.is_none());

    let seen = seen.lock().unwrap();
    assert_eq!(seen.first().map(|p| p.percentage), Some(0));
    assert_eq!(seen.last().map(|p| p.percentage), Some(100));
    assert_eq!(successes.lock().unwrap().as_slice(), &["a.png".to_string()]);
}

#[tokio::test]
async fn test_upload_controller_records_error_and_invokes_callback() {
    let services = create_in_memory_storage();
    let bucket = name("avatars");
    services
        .buckets
        .create_bucket(
            &bucket,
            BucketSettings {
                allowed_mime_types: Some(vec!["image/png".into()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let errors: Arc<Mutex<Vec<ErrorKind>>> = Arc::new(Mutex::new(Vec::new()));
    let controller = UploadController::new(
        services.files.clone(),
        UploadCallbacks {
            on_error: Some({
                let errors = errors.clone();
                Arc::new(move |err| errors.lock().unwrap().push(err.kind()))
            }),
            ..Default::default()
        },
    );

    let err = controller
        .upload(
            &bucket,
            "notes.txt",
            FilePayload::new("notes.txt", "text/plain", Bytes::from_static(b"hi")),
            UploadOptions::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidMimeType);

    let state = controller.state().await;
    assert_eq!(state.status, UploadStatus::Error);
    assert_eq!(state.progress.percentage, 0);
    assert_eq!(errors.lock().unwrap().as_slice(), &[ErrorKind::InvalidMimeType]);
}

#[tokio::test]
async fn test_multi_upload_partial_outcome() {
    let services = create_in_memory_storage();
    let bucket = name("gallery");
    services
        .buckets
        .create_bucket(
            &bucket,
            BucketSettings {
                allowed_mime_types: Some(vec!["image/png".into()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let controller = UploadController::new(services.files.clone(), UploadCallbacks::default());
    let files = vec![
        png("a.png", 16),
        FilePayload::new("b.txt", "text/plain", Bytes::from_static(b"nope")),
        png("c.png", 16),
    ];

    let state = controller
        .upload_many(&bucket, files, Some("batch".into()), UploadOptions::default())
        .await;

    assert_eq!(state.status, MultiUploadStatus::Partial);
    assert_eq!(state.total, 3);
    assert_eq!(state.completed, 2);
    assert_eq!(state.failed, 1);
    assert_eq!(state.files["b.txt"].status, UploadStatus::Error);
    assert_eq!(state.files["a.png"].status, UploadStatus::Success);

    // Successful files landed under the folder.
    let listed = services
        .files
        .list_files(&bucket, "batch", ListOptions::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);
}

#[tokio::test]
async fn test_upload_cancellation_returns_none_and_goes_idle() {
    let services = FakeClient::services(FakeMode::HangUpload);
    let bucket = name("gallery");
    services
        .buckets
        .create_bucket(&bucket, BucketSettings::default())
        .await
        .unwrap();

    let controller = Arc::new(UploadController::new(
        services.files.clone(),
        UploadCallbacks::default(),
    ));

    let handle = {
        let controller = controller.clone();
        let bucket = bucket.clone();
        tokio::spawn(async move {
            controller
                .upload(&bucket, "slow.png", png("slow.png", 4_096), UploadOptions::default())
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(controller.state().await.status, UploadStatus::Uploading);

    controller.cancel();
    let outcome = handle.await.unwrap().unwrap();
    assert!(outcome.is_none());
    assert_eq!(controller.state().await.status, UploadStatus::Idle);
}

#[tokio::test]
async fn test_delete_controller_reports_per_path_buckets() {
    let services = storage_with_bucket("gallery").await;
    let bucket = name("gallery");
    for path in ["a.png", "b.png"] {
        services
            .files
            .upload_file(&bucket, path, png(path, 8).into(), UploadOptions::default())
            .await
            .unwrap();
    }

    let controller = DeleteController::new(services.files.clone());
    let report = controller
        .delete_files(&bucket, vec!["a.png".into(), "b.png".into()])
        .await;

    assert_eq!(report.success, vec!["a.png".to_string(), "b.png".to_string()]);
    assert!(report.failed.is_empty());
    assert!(controller.state().await.error.is_none());
}

#[tokio::test]
async fn test_delete_controller_marks_whole_batch_failed() {
    let services = FakeClient::services(FakeMode::FailAll);
    let bucket = name("gallery");

    let controller = DeleteController::new(services.files.clone());
    let paths = vec!["a.png".to_string(), "b.png".to_string(), "c.png".to_string()];
    let report = controller.delete_files(&bucket, paths.clone()).await;

    // The batch call reports no per-path detail, so a failure marks every
    // requested path.
    assert!(report.success.is_empty());
    assert_eq!(report.failed, paths);

    let state = controller.state().await;
    assert!(!state.deleting);
    assert_eq!(state.error.map(|e| e.kind()), Some(ErrorKind::NetworkError));
}

#[tokio::test]
async fn test_list_controller_auto_fetches() {
    let services = storage_with_bucket("gallery").await;
    let bucket = name("gallery");
    for path in ["a.png", "b.png"] {
        services
            .files
            .upload_file(&bucket, path, png(path, 8).into(), UploadOptions::default())
            .await
            .unwrap();
    }

    let controller = ListController::new(
        services.files.clone(),
        bucket.clone(),
        "",
        ListOptions::default(),
        true,
    )
    .await;

    let state = controller.state().await;
    assert_eq!(state.files.len(), 2);
    assert!(!state.loading);
    assert!(state.error.is_none());

    // A later refresh picks up new objects.
    services
        .files
        .upload_file(&bucket, "c.png", png("c.png", 8).into(), UploadOptions::default())
        .await
        .unwrap();
    controller.refresh().await;
    assert_eq!(controller.state().await.files.len(), 3);
}

#[tokio::test]
async fn test_list_controller_surfaces_flat_error_string() {
    let services = create_in_memory_storage();

    let controller = ListController::new(
        services.files.clone(),
        name("no-such-bucket"),
        "",
        ListOptions::default(),
        true,
    )
    .await;

    let state = controller.state().await;
    assert!(state.files.is_empty());
    let message = state.error.expect("missing bucket should surface an error");
    assert!(message.contains("not found"), "unexpected message: {message}");
}

#[tokio::test]
async fn test_list_controller_without_auto_fetch_stays_empty() {
    let services = storage_with_bucket("gallery").await;

    let controller = ListController::new(
        services.files.clone(),
        name("gallery"),
        "",
        ListOptions::default(),
        false,
    )
    .await;

    let state = controller.state().await;
    assert!(state.files.is_empty());
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_download_controller_save_to_device() {
    let services = storage_with_bucket("gallery").await;
    let bucket = name("gallery");
    services
        .files
        .upload_file(
            &bucket,
            "docs/report.png",
            png("report.png", 42).into(),
            UploadOptions::default(),
        )
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let controller = DownloadController::new(services.files.clone(), DownloadCallbacks::default());

    let written = controller
        .save_to_device(&bucket, "docs/report.png", DownloadOptions::default(), dir.path())
        .await
        .unwrap();

    assert_eq!(written, dir.path().join("report.png"));
    let on_disk = tokio::fs::read(&written).await.unwrap();
    assert_eq!(on_disk.len(), 42);

    let state = controller.state().await;
    assert_eq!(state.status, DownloadStatus::Success);
    assert_eq!(state.progress.percentage, 100);
}

#[tokio::test]
async fn test_download_controller_auto_records_error() {
    let services = storage_with_bucket("gallery").await;

    let errors: Arc<Mutex<Vec<ErrorKind>>> = Arc::new(Mutex::new(Vec::new()));
    let controller = DownloadController::auto(
        services.files.clone(),
        DownloadCallbacks {
            on_error: Some({
                let errors = errors.clone();
                Arc::new(move |err| errors.lock().unwrap().push(err.kind()))
            }),
            ..Default::default()
        },
        &name("gallery"),
        "missing.png",
        DownloadOptions::default(),
    )
    .await;

    let state = controller.state().await;
    assert_eq!(state.status, DownloadStatus::Error);
    assert_eq!(state.error.map(|e| e.kind()), Some(ErrorKind::FileNotFound));
    assert_eq!(errors.lock().unwrap().as_slice(), &[ErrorKind::FileNotFound]);
}

#[tokio::test]
async fn test_signed_url_controller_schedules_refresh_for_long_windows() {
    let services = storage_with_bucket("private-docs").await;
    let bucket = name("private-docs");
    services
        .files
        .upload_file(
            &bucket,
            "contract.pdf",
            Bytes::from_static(&[1, 2, 3]).into(),
            UploadOptions::default(),
        )
        .await
        .unwrap();

    let controller = SignedUrlController::new(
        services.urls.clone(),
        bucket.clone(),
        "contract.pdf",
        SignedUrlOptions {
            expires_in: Some(3600),
            ..Default::default()
        },
        true,
    )
    .await;

    let state = controller.state().await;
    assert!(state.url.is_some());
    assert!(state.error.is_none());
    assert!(controller.is_valid().await);
    assert!(controller.refresh_scheduled());

    // Reset clears the URL and aborts the pending timer.
    controller.reset().await;
    assert!(controller.state().await.url.is_none());
    assert!(!controller.refresh_scheduled());
}

#[tokio::test]
async fn test_signed_url_controller_skips_refresh_for_short_windows() {
    let services = storage_with_bucket("private-docs").await;
    let bucket = name("private-docs");
    services
        .files
        .upload_file(
            &bucket,
            "contract.pdf",
            Bytes::from_static(&[1]).into(),
            UploadOptions::default(),
        )
        .await
        .unwrap();

    let controller = SignedUrlController::new(
        services.urls.clone(),
        bucket,
        "contract.pdf",
        SignedUrlOptions {
            expires_in: Some(60),
            ..Default::default()
        },
        true,
    )
    .await;

    // A 60 second window leaves no room ahead of the refresh buffer.
    assert!(controller.state().await.url.is_some());
    assert!(!controller.refresh_scheduled());
}

#[tokio::test]
async fn test_signed_url_controller_records_failure() {
    let services = storage_with_bucket("private-docs").await;

    let controller = SignedUrlController::new(
        services.urls.clone(),
        name("private-docs"),
        "missing.pdf",
        SignedUrlOptions::default(),
        true,
    )
    .await;

    let state = controller.state().await;
    assert!(state.url.is_none());
    assert_eq!(state.error.map(|e| e.kind()), Some(ErrorKind::FileNotFound));
    assert!(!controller.is_valid().await);
    assert!(!controller.refresh_scheduled());
}

#[tokio::test]
async fn test_initialize_buckets_reclassifies_create_race_as_existing() {
    let services = FakeClient::services(FakeMode::BucketRace);

    let configs = vec![BucketConfig {
        id: "uploads".into(),
        public: false,
        allowed_mime_types: None,
        file_size_limit: None,
    }];

    // Lookup misses but creation collides: another provisioner won the race,
    // so the bucket counts as existing rather than as an error.
    let report = services.buckets.initialize_buckets(&configs).await;
    assert_eq!(report.existing, vec!["uploads".to_string()]);
    assert!(report.created.is_empty());
    assert!(report.errors.is_empty());
}
