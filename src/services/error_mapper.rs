//! Translates raw remote-service failures into the closed `StorageError`
//! taxonomy. Services apply this mapping exactly once, at the point a remote
//! call returns; nothing above the service layer re-interprets raw shapes.

use crate::domain::errors::{ErrorKind, StorageError};
use crate::ports::remote::RemoteError;

/// One matching rule: case-sensitive message fragments, the kind they select,
/// the conventional HTTP status, and the fixed human-readable message.
type KeywordRule = (&'static [&'static str], ErrorKind, u16, &'static str);

/// Ordered matching table. First rule whose fragment occurs in the remote
/// message wins, so domain-specific matches always beat generic fallbacks.
/// Kept as literal data so ordering and coverage are auditable at a glance.
const KEYWORD_RULES: &[KeywordRule] = &[
    (
        &["not found"],
        ErrorKind::FileNotFound,
        404,
        "The requested file was not found",
    ),
    (
        &["already exists"],
        ErrorKind::BucketAlreadyExists,
        409,
        "A resource with this name already exists",
    ),
    (
        &["too large", "exceeds"],
        ErrorKind::FileTooLarge,
        413,
        "The file exceeds the maximum allowed size",
    ),
    (
        &["mime type", "content type"],
        ErrorKind::InvalidMimeType,
        415,
        "This file type is not allowed",
    ),
    (
        &["permission", "unauthorized"],
        ErrorKind::PermissionDenied,
        403,
        "You do not have permission to perform this operation",
    ),
    (
        &["rate limit"],
        ErrorKind::RateLimited,
        429,
        "Too many requests, please try again later",
    ),
    (
        &["quota", "storage limit"],
        ErrorKind::QuotaExceeded,
        507,
        "Storage quota exceeded",
    ),
];

/// Map a raw remote error to exactly one `StorageError`.
///
/// Policy, in order: keyword match on the message (fixed message + status);
/// otherwise a transport failure becomes `NetworkError`; otherwise the
/// original message is preserved under `UnknownError`. Status codes are only
/// attached by keyword matches; unknown and network errors carry none.
pub fn map_remote_error(error: RemoteError) -> StorageError {
    if let Some(message) = &error.message {
        for (fragments, kind, status, fixed_message) in KEYWORD_RULES {
            if fragments.iter().any(|fragment| message.contains(fragment)) {
                return StorageError::new(*kind, *fixed_message)
                    .with_status(*status)
                    .with_cause(message.clone());
            }
        }
    }

    if error.network {
        let mut mapped = StorageError::new(
            ErrorKind::NetworkError,
            "A network error occurred while contacting the storage service",
        );
        if let Some(message) = error.message {
            mapped = mapped.with_cause(message);
        }
        return mapped;
    }

    match error.message {
        Some(message) => StorageError::new(ErrorKind::UnknownError, message.clone())
            .with_cause(message),
        None => StorageError::unknown("An unknown storage error occurred"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let mapped = map_remote_error(RemoteError::message("Bucket not found"));
        assert_eq!(mapped.kind(), ErrorKind::FileNotFound);
        assert_eq!(mapped.status_code(), Some(404));
        assert_eq!(mapped.cause(), Some("Bucket not found"));
    }

    #[test]
    fn test_size_keywords_map_to_413() {
        let mapped = map_remote_error(RemoteError::message("File exceeds maximum size"));
        assert_eq!(mapped.kind(), ErrorKind::FileTooLarge);
        assert_eq!(mapped.status_code(), Some(413));

        let mapped = map_remote_error(RemoteError::message("Payload too large"));
        assert_eq!(mapped.kind(), ErrorKind::FileTooLarge);
    }

    #[test]
    fn test_remaining_keyword_rules() {
        let cases = [
            ("The resource already exists", ErrorKind::BucketAlreadyExists, 409),
            ("invalid mime type text/html", ErrorKind::InvalidMimeType, 415),
            ("unsupported content type", ErrorKind::InvalidMimeType, 415),
            ("permission denied", ErrorKind::PermissionDenied, 403),
            ("unauthorized", ErrorKind::PermissionDenied, 403),
            ("rate limit reached", ErrorKind::RateLimited, 429),
            ("quota exhausted", ErrorKind::QuotaExceeded, 507),
            ("storage limit reached", ErrorKind::QuotaExceeded, 507),
        ];
        for (message, kind, status) in cases {
            let mapped = map_remote_error(RemoteError::message(message));
            assert_eq!(mapped.kind(), kind, "message: {message}");
            assert_eq!(mapped.status_code(), Some(status));
        }
    }

    #[test]
    fn test_unmatched_message_is_unknown_with_original_text() {
        let mapped = map_remote_error(RemoteError::message("boom"));
        assert_eq!(mapped.kind(), ErrorKind::UnknownError);
        assert_eq!(mapped.message(), "boom");
        assert_eq!(mapped.cause(), Some("boom"));
        assert_eq!(mapped.status_code(), None);
    }

    #[test]
    fn test_network_error_has_no_status() {
        let mapped = map_remote_error(RemoteError::network("connection refused"));
        assert_eq!(mapped.kind(), ErrorKind::NetworkError);
        assert_eq!(mapped.status_code(), None);
        assert_eq!(mapped.cause(), Some("connection refused"));
    }

    #[test]
    fn test_keyword_match_wins_over_network_flag() {
        let mut error = RemoteError::message("object not found");
        error.network = true;
        assert_eq!(map_remote_error(error).kind(), ErrorKind::FileNotFound);
    }

    #[test]
    fn test_empty_error_is_generic_unknown() {
        let mapped = map_remote_error(RemoteError::default());
        assert_eq!(mapped.kind(), ErrorKind::UnknownError);
        assert_eq!(mapped.status_code(), None);
    }
}
