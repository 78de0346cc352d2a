use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use crate::domain::errors::StorageError;
use crate::domain::value_objects::BucketName;
use crate::services::FileService;

/// Outcome of a delete run partitioned into per-path buckets.
///
/// The remote batch-delete call reports no per-path results, so on failure
/// every requested path is conservatively marked failed even though some may
/// have succeeded server-side, and on success all are marked succeeded. This
/// is an all-or-nothing approximation, not a per-file guarantee.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteReport {
    pub success: Vec<String>,
    pub failed: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DeleteState {
    pub deleting: bool,
    pub last_report: DeleteReport,
    pub error: Option<StorageError>,
}

/// Stateful wrapper around single and batch delete.
pub struct DeleteController {
    files: FileService,
    state: Arc<RwLock<DeleteState>>,
}

impl DeleteController {
    pub fn new(files: FileService) -> Self {
        Self {
            files,
            state: Arc::new(RwLock::new(DeleteState::default())),
        }
    }

    /// Single delete, defined as the one-element batch.
    pub async fn delete_file(&self, bucket: &BucketName, path: &str) -> DeleteReport {
        self.delete_files(bucket, vec![path.to_string()]).await
    }

    pub async fn delete_files(&self, bucket: &BucketName, paths: Vec<String>) -> DeleteReport {
        self.state.write().await.deleting = true;

        let outcome = self.files.delete_files(bucket, &paths).await;

        let mut state = self.state.write().await;
        state.deleting = false;
        let report = match outcome {
            Ok(_) => {
                state.error = None;
                DeleteReport {
                    success: paths,
                    failed: Vec::new(),
                }
            }
            Err(err) => {
                warn!(error = %err, count = paths.len(), "batch delete failed");
                state.error = Some(err);
                DeleteReport {
                    success: Vec::new(),
                    failed: paths,
                }
            }
        };
        state.last_report = report.clone();
        report
    }

    pub async fn reset(&self) {
        *self.state.write().await = DeleteState::default();
    }

    pub async fn state(&self) -> DeleteState {
        self.state.read().await.clone()
    }
}
