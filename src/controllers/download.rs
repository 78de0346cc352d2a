use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::controllers::upload::ErrorCallback;
use crate::domain::errors::{ErrorKind, StorageError, StorageResult};
use crate::domain::models::{
    DownloadOptions, DownloadResult, DownloadState, DownloadStatus, Progress,
};
use crate::domain::value_objects::BucketName;
use crate::services::FileService;

pub type DownloadSuccessCallback = Arc<dyn Fn(&DownloadResult) + Send + Sync>;

#[derive(Clone, Default)]
pub struct DownloadCallbacks {
    pub on_success: Option<DownloadSuccessCallback>,
    pub on_error: Option<ErrorCallback>,
}

/// Stateful wrapper around the file service's download operation, with an
/// optional auto-download lifecycle and a save-to-disk convenience.
pub struct DownloadController {
    files: FileService,
    callbacks: DownloadCallbacks,
    state: Arc<RwLock<DownloadState>>,
}

impl DownloadController {
    pub fn new(files: FileService, callbacks: DownloadCallbacks) -> Self {
        Self {
            files,
            callbacks,
            state: Arc::new(RwLock::new(DownloadState::default())),
        }
    }

    /// Construct a controller and immediately run the download (the
    /// auto-download lifecycle). The outcome is recorded in controller state.
    pub async fn auto(
        files: FileService,
        callbacks: DownloadCallbacks,
        bucket: &BucketName,
        path: &str,
        options: DownloadOptions,
    ) -> Self {
        let controller = Self::new(files, callbacks);
        let _ = controller.download(bucket, path, options).await;
        controller
    }

    pub async fn download(
        &self,
        bucket: &BucketName,
        path: &str,
        options: DownloadOptions,
    ) -> StorageResult<DownloadResult> {
        {
            let mut state = self.state.write().await;
            *state = DownloadState {
                status: DownloadStatus::Downloading,
                ..Default::default()
            };
        }

        match self.files.download_file(bucket, path, options).await {
            Ok(result) => {
                {
                    let mut state = self.state.write().await;
                    state.status = DownloadStatus::Success;
                    state.progress = Progress::complete(result.size);
                    state.result = Some(result.clone());
                }
                if let Some(on_success) = &self.callbacks.on_success {
                    on_success(&result);
                }
                Ok(result)
            }
            Err(err) => {
                {
                    let mut state = self.state.write().await;
                    state.status = DownloadStatus::Error;
                    state.progress = Progress::default();
                    state.error = Some(err.clone());
                }
                if let Some(on_error) = &self.callbacks.on_error {
                    on_error(&err);
                }
                Err(err)
            }
        }
    }

    /// Download and write the payload into `dir` under its inferred
    /// filename. Returns the written path.
    pub async fn save_to_device(
        &self,
        bucket: &BucketName,
        path: &str,
        options: DownloadOptions,
        dir: &Path,
    ) -> StorageResult<PathBuf> {
        let result = self.download(bucket, path, options).await?;
        let destination = dir.join(&result.filename);

        debug!(path, destination = %destination.display(), "saving download to device");

        tokio::fs::write(&destination, &result.data)
            .await
            .map_err(|err| {
                StorageError::new(
                    ErrorKind::DownloadFailed,
                    format!("Failed to write downloaded file: {}", err),
                )
            })?;

        Ok(destination)
    }

    pub async fn reset(&self) {
        *self.state.write().await = DownloadState::default();
    }

    pub async fn state(&self) -> DownloadState {
        self.state.read().await.clone()
    }
}
