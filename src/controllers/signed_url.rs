use std::sync::{Arc, Mutex, Weak};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::domain::errors::{StorageError, StorageResult};
use crate::domain::models::{SignedUrl, SignedUrlOptions};
use crate::domain::value_objects::BucketName;
use crate::services::UrlService;

/// How long before expiry the pre-emptive refresh fires.
const REFRESH_BUFFER_SECS: i64 = 60;

#[derive(Debug, Clone, Default)]
pub struct SignedUrlState {
    pub url: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub generating: bool,
    pub error: Option<StorageError>,
}

/// Stateful wrapper around signed-URL issuance for one object.
///
/// Tracks the locally computed expiry and schedules a one-shot refresh 60
/// seconds before it, but only when more than 60 seconds remain at schedule
/// time, so consumers never observe a stale URL. The timer is aborted on
/// reset and on drop.
pub struct SignedUrlController {
    urls: UrlService,
    bucket: BucketName,
    path: String,
    options: SignedUrlOptions,
    state: Arc<RwLock<SignedUrlState>>,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
    weak_self: Weak<Self>,
}

impl SignedUrlController {
    /// Construct the controller. `auto_generate` (the default lifecycle)
    /// issues the first URL before returning.
    pub async fn new(
        urls: UrlService,
        bucket: BucketName,
        path: impl Into<String>,
        options: SignedUrlOptions,
        auto_generate: bool,
    ) -> Arc<Self> {
        let controller = Arc::new_cyclic(|weak| Self {
            urls,
            bucket,
            path: path.into(),
            options,
            state: Arc::new(RwLock::new(SignedUrlState::default())),
            refresh_task: Mutex::new(None),
            weak_self: weak.clone(),
        });

        if auto_generate {
            let _ = controller.generate().await;
        }
        controller
    }

    /// Issue a fresh signed URL, record it, and schedule the pre-emptive
    /// refresh when the window is long enough.
    pub async fn generate(&self) -> StorageResult<SignedUrl> {
        self.state.write().await.generating = true;

        let outcome = self
            .urls
            .create_signed_url(&self.bucket, &self.path, self.options.clone())
            .await;

        let mut state = self.state.write().await;
        state.generating = false;
        match outcome {
            Ok(signed) => {
                state.url = Some(signed.url.clone());
                state.expires_at = Some(signed.expires_at);
                state.error = None;
                drop(state);
                self.schedule_refresh(signed.expires_at);
                Ok(signed)
            }
            Err(err) => {
                state.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Whether the locally tracked expiry is still in the future.
    pub async fn is_valid(&self) -> bool {
        self.state
            .read()
            .await
            .expires_at
            .map(|at| at > Utc::now())
            .unwrap_or(false)
    }

    /// True when a pre-emptive refresh timer is pending.
    pub fn refresh_scheduled(&self) -> bool {
        self.refresh_task
            .lock()
            .expect("refresh task lock poisoned")
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }

    /// Clear state and abort any pending refresh timer.
    pub async fn reset(&self) {
        self.abort_refresh();
        *self.state.write().await = SignedUrlState::default();
    }

    pub async fn state(&self) -> SignedUrlState {
        self.state.read().await.clone()
    }

    fn schedule_refresh(&self, expires_at: DateTime<Utc>) {
        self.abort_refresh();

        let lead = expires_at - Utc::now() - Duration::seconds(REFRESH_BUFFER_SECS);
        if lead <= Duration::zero() {
            // Window too short to renew ahead of time; let it lapse.
            return;
        }

        let weak = self.weak_self.clone();
        let sleep = lead.to_std().unwrap_or_default();
        debug!(path = %self.path, in_secs = sleep.as_secs(), "scheduling signed url refresh");

        let task = tokio::spawn(async move {
            tokio::time::sleep(sleep).await;
            if let Some(controller) = weak.upgrade() {
                let _ = controller.generate().await;
            }
        });

        *self
            .refresh_task
            .lock()
            .expect("refresh task lock poisoned") = Some(task);
    }

    fn abort_refresh(&self) {
        if let Some(task) = self
            .refresh_task
            .lock()
            .expect("refresh task lock poisoned")
            .take()
        {
            task.abort();
        }
    }
}

impl Drop for SignedUrlController {
    fn drop(&mut self) {
        self.abort_refresh();
    }
}
