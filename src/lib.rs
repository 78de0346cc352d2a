pub mod adapters;
pub mod app;
pub mod controllers;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Domain types - models, value objects and errors
pub use domain::{
    Bucket,
    BucketConfig,
    // Value objects
    BucketName,
    BucketPolicy,
    BucketProvisionReport,
    BucketSettings,
    DownloadOptions,
    DownloadResult,
    DownloadState,
    DownloadStatus,
    // Errors
    ErrorKind,
    FileObject,
    FilePayload,
    ImageFormat,
    ListOptions,
    MultiUploadState,
    MultiUploadStatus,
    Progress,
    ResizeMode,
    SignedUploadUrl,
    SignedUrl,
    SignedUrlOptions,
    SortBy,
    StorageError,
    StorageResult,
    TransformOptions,
    // Models
    UploadBody,
    UploadOptions,
    UploadPlacement,
    UploadResult,
    UploadState,
    UploadStatus,
    UrlOptions,
    ValidationError,
};

// Port types - the contract the remote storage backend presents
pub use ports::remote::{
    RemoteError, RemoteListQuery, RemotePayload, RemoteResult, RemoteSignedUploadUrl,
    RemoteStorageClient, RemoteUploadOptions, RemoteUploadedObject,
};

// Service layer - operation functions over the remote client
pub use services::{
    BucketService, FileService, ImageUrlService, ResponsiveImageOptions, ResponsiveImageSet,
    UrlService, map_remote_error,
};

// Stateful controllers - hook-style wrappers with progress and lifecycles
pub use controllers::{
    DeleteController, DeleteReport, DownloadCallbacks, DownloadController, ListController,
    ListState, SignedUrlController, SignedUrlState, UploadCallbacks, UploadController,
};

// Application factory and configuration
pub use app::{
    AppBuilder, AppConfig, AppError, StorageBackend, StorageServices, create_http_storage,
    create_in_memory_storage, create_storage_from_env,
};

// Adapter types - remote client implementations
pub use adapters::outbound::remote::{HttpRemoteClient, InMemoryRemoteClient};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        Bucket, BucketConfig, BucketName, BucketPolicy, BucketService, BucketSettings,
        DeleteController, DownloadController, FileObject, FilePayload, FileService,
        ImageUrlService, InMemoryRemoteClient, ListController, ListOptions, RemoteStorageClient,
        SignedUrlController, StorageError, StorageResult, StorageServices, TransformOptions,
        UploadCallbacks, UploadController, UploadOptions, UrlService, create_http_storage,
        create_in_memory_storage,
    };
}
