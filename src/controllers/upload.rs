use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::domain::errors::{StorageError, StorageResult};
use crate::domain::models::{
    FilePayload, MultiUploadState, MultiUploadStatus, Progress, UploadBody, UploadOptions,
    UploadResult, UploadState, UploadStatus,
};
use crate::domain::paths::join_paths;
use crate::domain::value_objects::BucketName;
use crate::services::FileService;

/// Interval between synthetic progress ticks.
const PROGRESS_TICK: Duration = Duration::from_millis(200);

pub type ProgressCallback = Arc<dyn Fn(Progress) + Send + Sync>;
pub type UploadSuccessCallback = Arc<dyn Fn(&UploadResult) + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(&StorageError) + Send + Sync>;

/// Callbacks invoked as upload state changes occur.
#[derive(Clone, Default)]
pub struct UploadCallbacks {
    pub on_progress: Option<ProgressCallback>,
    pub on_success: Option<UploadSuccessCallback>,
    pub on_error: Option<ErrorCallback>,
}

/// Stateful wrapper around the file service's upload operations.
///
/// Tracks a per-operation state machine (idle -> uploading -> success|error),
/// synthesizes byte progress (the remote client reports none), and supports
/// cooperative cancellation. Cancellation only flips local state back to
/// idle; it does not guarantee the in-flight remote request stops.
pub struct UploadController {
    files: FileService,
    callbacks: UploadCallbacks,
    state: Arc<RwLock<UploadState>>,
    multi: Arc<RwLock<MultiUploadState>>,
    cancel: Mutex<CancellationToken>,
}

impl UploadController {
    pub fn new(files: FileService, callbacks: UploadCallbacks) -> Self {
        Self {
            files,
            callbacks,
            state: Arc::new(RwLock::new(UploadState::default())),
            multi: Arc::new(RwLock::new(MultiUploadState::default())),
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    /// Upload one file. Returns `Ok(None)` when the operation was cancelled
    /// locally before completing.
    pub async fn upload(
        &self,
        bucket: &BucketName,
        path: &str,
        file: FilePayload,
        options: UploadOptions,
    ) -> StorageResult<Option<UploadResult>> {
        let token = self.fresh_token();
        match run_single(
            &self.files,
            &self.callbacks,
            &self.state,
            &token,
            bucket,
            path,
            file,
            options,
        )
        .await
        {
            None => Ok(None),
            Some(Ok(result)) => Ok(Some(result)),
            Some(Err(err)) => Err(err),
        }
    }

    /// Upload several files sequentially, keyed by original filename.
    ///
    /// Files are processed in the order supplied, never concurrently, so the
    /// per-filename state map and the counters update deterministically.
    /// Final status: success with zero failures, error when every file
    /// failed, partial otherwise. Returns the final aggregate state.
    pub async fn upload_many(
        &self,
        bucket: &BucketName,
        files: Vec<FilePayload>,
        folder: Option<String>,
        options: UploadOptions,
    ) -> MultiUploadState {
        let token = self.fresh_token();
        let total = files.len();

        {
            let mut multi = self.multi.write().await;
            *multi = MultiUploadState {
                status: MultiUploadStatus::Uploading,
                total,
                ..Default::default()
            };
            for file in &files {
                multi.files.insert(file.name.clone(), UploadState::default());
            }
        }

        for file in files {
            if token.is_cancelled() {
                let mut multi = self.multi.write().await;
                multi.status = MultiUploadStatus::Idle;
                return multi.clone();
            }

            let name = file.name.clone();
            let path = match &folder {
                Some(folder) => join_paths([folder.as_str(), name.as_str()]),
                None => name.clone(),
            };

            // Each file gets its own state slot so the aggregate map always
            // holds the file's final machine state.
            let slot = Arc::new(RwLock::new(UploadState::default()));
            let outcome = run_single(
                &self.files,
                &self.callbacks,
                &slot,
                &token,
                bucket,
                &path,
                file,
                options.clone(),
            )
            .await;

            let final_state = slot.read().await.clone();
            let mut multi = self.multi.write().await;
            multi.files.insert(name, final_state);
            match outcome {
                None => {
                    multi.status = MultiUploadStatus::Idle;
                    return multi.clone();
                }
                Some(Ok(_)) => multi.completed += 1,
                Some(Err(_)) => multi.failed += 1,
            }
        }

        let mut multi = self.multi.write().await;
        multi.status = if multi.failed == 0 {
            MultiUploadStatus::Success
        } else if multi.completed == 0 {
            MultiUploadStatus::Error
        } else {
            MultiUploadStatus::Partial
        };
        multi.clone()
    }

    /// Request cancellation of the in-flight operation. Local state returns
    /// to idle; network-level termination is best-effort only.
    pub fn cancel(&self) {
        self.cancel.lock().expect("cancel token lock poisoned").cancel();
    }

    /// Return both state machines to idle.
    pub async fn reset(&self) {
        self.cancel();
        *self.state.write().await = UploadState::default();
        *self.multi.write().await = MultiUploadState::default();
    }

    pub async fn state(&self) -> UploadState {
        self.state.read().await.clone()
    }

    pub async fn multi_state(&self) -> MultiUploadState {
        self.multi.read().await.clone()
    }

    fn fresh_token(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.cancel.lock().expect("cancel token lock poisoned") = token.clone();
        token
    }
}

/// Drive one upload through its state machine. Returns `None` on local
/// cancellation, otherwise the operation outcome.
#[allow(clippy::too_many_arguments)]
async fn run_single(
    files: &FileService,
    callbacks: &UploadCallbacks,
    slot: &Arc<RwLock<UploadState>>,
    token: &CancellationToken,
    bucket: &BucketName,
    path: &str,
    file: FilePayload,
    options: UploadOptions,
) -> Option<StorageResult<UploadResult>> {
    let total = file.size();

    {
        let mut state = slot.write().await;
        *state = UploadState {
            status: UploadStatus::Uploading,
            progress: Progress::new(0, total),
            result: None,
            error: None,
        };
    }
    if let Some(on_progress) = &callbacks.on_progress {
        on_progress(Progress::new(0, total));
    }

    let ticker = spawn_progress_ticker(slot.clone(), callbacks.on_progress.clone(), total);

    let outcome = tokio::select! {
        _ = token.cancelled() => None,
        result = files.upload_file(bucket, path, UploadBody::File(file), options) => Some(result),
    };
    ticker.abort();

    match outcome {
        None => {
            debug!(path, "upload cancelled locally");
            *slot.write().await = UploadState::default();
            None
        }
        Some(Ok(result)) => {
            {
                let mut state = slot.write().await;
                state.status = UploadStatus::Success;
                state.progress = Progress::complete(total);
                state.result = Some(result.clone());
            }
            if let Some(on_progress) = &callbacks.on_progress {
                on_progress(Progress::complete(total));
            }
            if let Some(on_success) = &callbacks.on_success {
                on_success(&result);
            }
            Some(Ok(result))
        }
        Some(Err(err)) => {
            {
                let mut state = slot.write().await;
                state.status = UploadStatus::Error;
                state.progress = Progress::new(0, total);
                state.error = Some(err.clone());
            }
            if let Some(on_error) = &callbacks.on_error {
                on_error(&err);
            }
            Some(Err(err))
        }
    }
}

/// Synthetic progress: the remote client reports no real byte progress, so
/// each tick adds 10% of the file size up to a 90% ceiling; completion code
/// forces 100. Kept behind the same callback interface a genuine progress
/// stream would use, so it can be replaced without touching consumers.
fn spawn_progress_ticker(
    slot: Arc<RwLock<UploadState>>,
    on_progress: Option<ProgressCallback>,
    total: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let step = total / 10;
        if step == 0 {
            return;
        }
        let ceiling = total.saturating_mul(9) / 10;

        let mut interval = tokio::time::interval(PROGRESS_TICK);
        interval.tick().await; // immediate first tick
        loop {
            interval.tick().await;
            let progress = {
                let mut state = slot.write().await;
                if state.status != UploadStatus::Uploading {
                    break;
                }
                if state.progress.loaded >= ceiling {
                    continue;
                }
                let next = (state.progress.loaded + step).min(ceiling);
                state.progress = Progress::new(next, total);
                state.progress
            };
            if let Some(on_progress) = &on_progress {
                on_progress(progress);
            }
        }
    })
}
