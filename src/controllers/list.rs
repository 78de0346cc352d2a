use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::models::{FileObject, ListOptions};
use crate::domain::value_objects::BucketName;
use crate::services::FileService;

/// List state surfaced to UI consumers. The error is a flat message string
/// rather than the structured error, by design.
#[derive(Debug, Clone, Default)]
pub struct ListState {
    pub files: Vec<FileObject>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Stateful wrapper around the file service's list operation with an
/// auto-fetch lifecycle and explicit refresh.
pub struct ListController {
    files: FileService,
    bucket: BucketName,
    prefix: String,
    options: ListOptions,
    state: Arc<RwLock<ListState>>,
}

impl ListController {
    /// Construct the controller. `auto_fetch` (the default lifecycle) runs
    /// the initial fetch before returning.
    pub async fn new(
        files: FileService,
        bucket: BucketName,
        prefix: impl Into<String>,
        options: ListOptions,
        auto_fetch: bool,
    ) -> Self {
        let controller = Self {
            files,
            bucket,
            prefix: prefix.into(),
            options,
            state: Arc::new(RwLock::new(ListState::default())),
        };
        if auto_fetch {
            controller.refresh().await;
        }
        controller
    }

    /// Re-run the same fetch and replace the file list.
    pub async fn refresh(&self) {
        self.state.write().await.loading = true;

        let outcome = self
            .files
            .list_files(&self.bucket, &self.prefix, self.options.clone())
            .await;

        let mut state = self.state.write().await;
        state.loading = false;
        match outcome {
            Ok(files) => {
                state.files = files;
                state.error = None;
            }
            Err(err) => {
                state.error = Some(err.to_string());
            }
        }
    }

    pub async fn state(&self) -> ListState {
        self.state.read().await.clone()
    }
}
