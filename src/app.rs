use std::sync::Arc;

use crate::adapters::outbound::remote::{HttpRemoteClient, InMemoryRemoteClient};
use crate::ports::remote::RemoteStorageClient;
use crate::services::{BucketService, FileService, ImageUrlService, UrlService};

/// Remote backend configuration
#[derive(Debug, Clone)]
pub enum StorageBackend {
    /// Hermetic in-memory backend for tests and development
    InMemory,
    /// Hosted storage service over HTTP
    Http { base_url: String, api_key: String },
}

/// Configuration for the storage layer
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: StorageBackend,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::InMemory,
        }
    }
}

/// Service container: one handle per operation family, all sharing the same
/// injected remote client.
#[derive(Clone)]
pub struct StorageServices {
    pub buckets: BucketService,
    pub files: FileService,
    pub urls: UrlService,
    pub images: ImageUrlService,
}

impl StorageServices {
    /// Wire the services around an explicitly injected remote client. This
    /// is the seam tests use to substitute fakes.
    pub fn from_client(client: Arc<dyn RemoteStorageClient>) -> Self {
        let urls = UrlService::new(client.clone());
        Self {
            buckets: BucketService::new(client.clone()),
            files: FileService::new(client),
            images: ImageUrlService::new(urls.clone()),
            urls,
        }
    }
}

/// Errors raised while assembling the storage layer
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Environment variable missing: {0}")]
    MissingEnvironment(&'static str),
}

/// Builder wiring a backend choice into a service container
pub struct AppBuilder {
    config: AppConfig,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_backend(mut self, backend: StorageBackend) -> Self {
        self.config.backend = backend;
        self
    }

    pub fn build(self) -> Result<StorageServices, AppError> {
        let client: Arc<dyn RemoteStorageClient> = match self.config.backend {
            StorageBackend::InMemory => Arc::new(InMemoryRemoteClient::new()),
            StorageBackend::Http { base_url, api_key } => {
                if base_url.is_empty() {
                    return Err(AppError::InvalidConfiguration(
                        "base_url cannot be empty".to_string(),
                    ));
                }
                Arc::new(HttpRemoteClient::new(base_url, api_key))
            }
        };
        Ok(StorageServices::from_client(client))
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Storage services backed by the hermetic in-memory client
pub fn create_in_memory_storage() -> StorageServices {
    StorageServices::from_client(Arc::new(InMemoryRemoteClient::new()))
}

/// Storage services backed by a hosted service over HTTP
pub fn create_http_storage(
    base_url: impl Into<String>,
    api_key: impl Into<String>,
) -> Result<StorageServices, AppError> {
    AppBuilder::new()
        .with_backend(StorageBackend::Http {
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
        .build()
}

/// Storage services configured from `STORAGE_URL` and `STORAGE_API_KEY`
pub fn create_storage_from_env() -> Result<StorageServices, AppError> {
    let base_url =
        std::env::var("STORAGE_URL").map_err(|_| AppError::MissingEnvironment("STORAGE_URL"))?;
    let api_key = std::env::var("STORAGE_API_KEY")
        .map_err(|_| AppError::MissingEnvironment("STORAGE_API_KEY"))?;
    create_http_storage(base_url, api_key)
}
