//! Pure MIME-type classification helpers. No bytes are inspected; these look
//! at the declared content type only.

/// MIME types treated as documents by the icon/classification helpers.
pub const DOCUMENT_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "text/plain",
    "text/csv",
];

pub fn is_image_file(content_type: &str) -> bool {
    content_type.starts_with("image/")
}

pub fn is_video_file(content_type: &str) -> bool {
    content_type.starts_with("video/")
}

pub fn is_document_file(content_type: &str) -> bool {
    DOCUMENT_MIME_TYPES.contains(&content_type)
}

/// Icon name for a content type, for UI consumers.
pub fn file_type_icon(content_type: &str) -> &'static str {
    if is_image_file(content_type) {
        return "image";
    }
    if is_video_file(content_type) {
        return "video";
    }
    if content_type.starts_with("audio/") {
        return "audio";
    }
    if content_type == "application/pdf" {
        return "pdf";
    }
    if content_type == "application/zip" || content_type == "application/x-tar" {
        return "archive";
    }
    if is_document_file(content_type) {
        return "document";
    }
    "file"
}
