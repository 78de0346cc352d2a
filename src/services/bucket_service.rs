use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::errors::{ErrorKind, StorageResult};
use crate::domain::models::{Bucket, BucketConfig, BucketProvisionReport, BucketSettings};
use crate::domain::value_objects::BucketName;
use crate::ports::remote::RemoteStorageClient;
use crate::services::error_mapper::map_remote_error;

/// Bucket administration over the remote storage client.
///
/// Thin call-throughs: every remote failure is mapped through the error
/// taxonomy once; no bucket state is cached locally.
#[derive(Clone)]
pub struct BucketService {
    client: Arc<dyn RemoteStorageClient>,
}

impl BucketService {
    pub fn new(client: Arc<dyn RemoteStorageClient>) -> Self {
        Self { client }
    }

    pub async fn list_buckets(&self) -> StorageResult<Vec<Bucket>> {
        self.client.list_buckets().await.map_err(map_remote_error)
    }

    pub async fn get_bucket(&self, bucket: &BucketName) -> StorageResult<Bucket> {
        self.client
            .get_bucket(bucket)
            .await
            .map_err(map_remote_error)
    }

    /// Create a bucket. Visibility defaults to private when unspecified.
    pub async fn create_bucket(
        &self,
        bucket: &BucketName,
        settings: BucketSettings,
    ) -> StorageResult<()> {
        let settings = BucketSettings {
            public: Some(settings.public.unwrap_or(false)),
            ..settings
        };
        debug!(bucket = %bucket, public = settings.public, "creating bucket");
        self.client
            .create_bucket(bucket, &settings)
            .await
            .map_err(map_remote_error)
    }

    pub async fn update_bucket(
        &self,
        bucket: &BucketName,
        settings: BucketSettings,
    ) -> StorageResult<()> {
        self.client
            .update_bucket(bucket, &settings)
            .await
            .map_err(map_remote_error)
    }

    pub async fn delete_bucket(&self, bucket: &BucketName) -> StorageResult<()> {
        self.client
            .delete_bucket(bucket)
            .await
            .map_err(map_remote_error)
    }

    /// Remove all objects from the bucket without deleting the bucket record.
    pub async fn empty_bucket(&self, bucket: &BucketName) -> StorageResult<()> {
        self.client
            .empty_bucket(bucket)
            .await
            .map_err(map_remote_error)
    }

    /// Idempotently provision buckets from a declarative config.
    ///
    /// Buckets that already exist are recorded as existing and skipped. A
    /// create that loses a race to another initializer (the remote reports
    /// "already exists") is reclassified as existing rather than a failure.
    /// Any other failure is accumulated per bucket; one bad bucket never
    /// aborts the rest.
    pub async fn initialize_buckets(&self, configs: &[BucketConfig]) -> BucketProvisionReport {
        let mut report = BucketProvisionReport::default();

        for config in configs {
            let name = match BucketName::new(config.id.clone()) {
                Ok(name) => name,
                Err(err) => {
                    warn!(bucket = %config.id, error = %err, "invalid bucket id in config");
                    report.errors.push((
                        config.id.clone(),
                        crate::domain::errors::StorageError::unknown(err.to_string()),
                    ));
                    continue;
                }
            };

            if self.get_bucket(&name).await.is_ok() {
                report.existing.push(config.id.clone());
                continue;
            }

            match self.create_bucket(&name, config.settings()).await {
                Ok(()) => {
                    info!(bucket = %name, "bucket created");
                    report.created.push(config.id.clone());
                }
                Err(err) if err.kind() == ErrorKind::BucketAlreadyExists => {
                    // Lost a creation race with another initializer.
                    report.existing.push(config.id.clone());
                }
                Err(err) => {
                    warn!(bucket = %name, error = %err, "bucket creation failed");
                    report.errors.push((config.id.clone(), err));
                }
            }
        }

        report
    }
}
