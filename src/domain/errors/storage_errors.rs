/// Closed set of error kinds produced by the storage operation layer.
///
/// Every failure coming back from the remote service is funneled through the
/// error mapper exactly once and lands on one of these tags; callers never
/// see the raw remote error shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Requested file or bucket does not exist
    FileNotFound,

    /// Bucket (or object, on non-upsert upload) already exists
    BucketAlreadyExists,

    /// File exceeds the bucket's size limit
    FileTooLarge,

    /// File's MIME type is excluded by the bucket's allowlist
    InvalidMimeType,

    /// Caller lacks permission for the operation
    PermissionDenied,

    /// Remote service applied rate limiting
    RateLimited,

    /// Storage quota exhausted
    QuotaExceeded,

    /// Transport-level failure reaching the remote service
    NetworkError,

    /// Upload completed abnormally (e.g. malformed success payload)
    UploadFailed,

    /// Download completed abnormally (e.g. local write failure)
    DownloadFailed,

    /// Delete completed abnormally
    DeleteFailed,

    /// Anything the mapper could not classify
    UnknownError,
}

impl ErrorKind {
    /// Stable kebab-case tag, suitable for logs and wire payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::FileNotFound => "file-not-found",
            ErrorKind::BucketAlreadyExists => "bucket-already-exists",
            ErrorKind::FileTooLarge => "file-too-large",
            ErrorKind::InvalidMimeType => "invalid-mime-type",
            ErrorKind::PermissionDenied => "permission-denied",
            ErrorKind::RateLimited => "rate-limited",
            ErrorKind::QuotaExceeded => "storage-quota-exceeded",
            ErrorKind::NetworkError => "network-error",
            ErrorKind::UploadFailed => "upload-failed",
            ErrorKind::DownloadFailed => "download-failed",
            ErrorKind::DeleteFailed => "delete-failed",
            ErrorKind::UnknownError => "unknown-error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A classified storage failure: kind tag, human-readable message, optional
/// HTTP-like status code, and the original error text when one was available.
///
/// `Clone` is required because controller state machines retain the error in
/// their terminal state; the cause is therefore stored as a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageError {
    kind: ErrorKind,
    message: String,
    status_code: Option<u16>,
    cause: Option<String>,
}

impl StorageError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
            cause: None,
        }
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Unclassified failure with the given message.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownError, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "[{}] {} ({})", self.kind, self.message, code),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for StorageError {}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
