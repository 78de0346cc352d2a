//! Path, filename and size utilities shared by the operation layer.

use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::ValidationError;
use crate::domain::models::{BucketPolicy, FilePayload};

/// Normalize a user-supplied storage path.
///
/// Backslashes become forward slashes, duplicate slashes collapse, leading
/// and trailing slashes are stripped, and within each segment any character
/// outside `[A-Za-z0-9-_.]` is replaced with `-`. Idempotent.
pub fn sanitize_path(path: &str) -> String {
    let normalized = path.replace('\\', "/");

    normalized
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            segment
                .chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                        c
                    } else {
                        '-'
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Join path segments with `/`, trimming slashes per segment and dropping
/// empty segments.
pub fn join_paths<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    segments
        .into_iter()
        .map(|s| s.as_ref().trim_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Derive a collision-resistant filename from an original one, preserving
/// the extension. Millisecond timestamp plus a random suffix keeps two calls
/// within the same tick distinct.
pub fn generate_unique_filename(original: &str) -> String {
    let timestamp = Utc::now().timestamp_millis();
    let suffix = Uuid::new_v4().simple().to_string();
    let suffix = &suffix[..8];

    match original.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            format!("{}-{}-{}.{}", stem, timestamp, suffix, ext)
        }
        _ => format!("{}-{}-{}", original, timestamp, suffix),
    }
}

/// Basename of a path: everything after the last `/`.
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Check a file against a bucket policy. Fails closed: a set size limit or a
/// set non-empty MIME allowlist rejects anything outside it; an absent
/// constraint always passes.
pub fn validate_file(file: &FilePayload, policy: &BucketPolicy) -> Result<(), ValidationError> {
    if let Some(limit) = policy.file_size_limit {
        if file.size() > limit {
            return Err(ValidationError::FileSizeExceedsLimit {
                size: file.size(),
                limit,
            });
        }
    }

    if let Some(allowed) = &policy.allowed_mime_types {
        if !allowed.is_empty() && !allowed.iter().any(|m| m == &file.content_type) {
            return Err(ValidationError::MimeTypeNotAllowed {
                mime_type: file.content_type.clone(),
            });
        }
    }

    Ok(())
}

/// Human-readable byte count with 1024 scaling.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.2} {}", value, UNITS[unit])
}
