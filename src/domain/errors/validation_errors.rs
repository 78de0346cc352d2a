/// Validation errors for domain value objects and upload pre-checks
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    // BucketName validation errors
    EmptyBucketName,
    BucketNameTooLong {
        actual: usize,
        max: usize,
    },
    BucketNameInvalidCharacter(char),

    // File validation errors (upload pre-checks against a bucket policy)
    FileSizeExceedsLimit {
        size: u64,
        limit: u64,
    },
    MimeTypeNotAllowed {
        mime_type: String,
    },
}

impl ValidationError {
    /// True when the failure is about the file's size rather than its type.
    /// Upload paths use this to pick between the size and type error kinds.
    pub fn is_size_related(&self) -> bool {
        // Matching on the rendered message keeps parity with how the upload
        // path classifies validation failures it only sees as text.
        self.to_string().contains("size")
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyBucketName => write!(f, "Bucket name cannot be empty"),
            ValidationError::BucketNameTooLong { actual, max } => {
                write!(
                    f,
                    "Bucket name too long: {} characters (max: {})",
                    actual, max
                )
            }
            ValidationError::BucketNameInvalidCharacter(c) => {
                write!(
                    f,
                    "Invalid character in bucket name: '{}'. Only lowercase letters, numbers, '-', '_' and '.' allowed",
                    c
                )
            }
            ValidationError::FileSizeExceedsLimit { size, limit } => {
                write!(
                    f,
                    "File size {} exceeds the maximum allowed size of {}",
                    crate::domain::paths::format_bytes(*size),
                    crate::domain::paths::format_bytes(*limit)
                )
            }
            ValidationError::MimeTypeNotAllowed { mime_type } => {
                write!(f, "File type '{}' is not allowed in this bucket", mime_type)
            }
        }
    }
}

impl std::error::Error for ValidationError {}
