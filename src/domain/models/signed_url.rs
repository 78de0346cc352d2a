use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How the remote service fits an image into the requested dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    Cover,
    Contain,
    Fill,
}

impl ResizeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResizeMode::Cover => "cover",
            ResizeMode::Contain => "contain",
            ResizeMode::Fill => "fill",
        }
    }
}

/// Output format requested from the remote image transformer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Keep the stored format untouched
    Origin,
    Webp,
    Avif,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Origin => "origin",
            ImageFormat::Webp => "webp",
            ImageFormat::Avif => "avif",
        }
    }
}

/// Parameters the remote service applies to derive a resized/reformatted
/// image. Encoded into URLs as query parameters; no pixels are processed
/// locally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub resize: Option<ResizeMode>,
    pub format: Option<ImageFormat>,
    /// 1..=100
    pub quality: Option<u8>,
}

impl TransformOptions {
    pub fn is_noop(&self) -> bool {
        self.width.is_none()
            && self.height.is_none()
            && self.resize.is_none()
            && self.format.is_none()
            && self.quality.is_none()
    }

    /// Query pairs in a fixed order, so derived URLs are deterministic.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(width) = self.width {
            pairs.push(("width", width.to_string()));
        }
        if let Some(height) = self.height {
            pairs.push(("height", height.to_string()));
        }
        if let Some(resize) = self.resize {
            pairs.push(("resize", resize.as_str().to_string()));
        }
        if let Some(format) = self.format {
            pairs.push(("format", format.as_str().to_string()));
        }
        if let Some(quality) = self.quality {
            pairs.push(("quality", quality.to_string()));
        }
        pairs
    }

    /// The variant of this transform the download endpoint accepts.
    ///
    /// The remote download API only honors an explicit `origin` format;
    /// any other format is dropped rather than forwarded. This asymmetry
    /// versus the URL-construction path is part of the remote contract.
    pub fn for_download(&self) -> TransformOptions {
        TransformOptions {
            format: match self.format {
                Some(ImageFormat::Origin) => Some(ImageFormat::Origin),
                _ => None,
            },
            ..self.clone()
        }
    }
}

/// Options shared by public-URL construction and signed-URL issuance.
#[derive(Debug, Clone, Default)]
pub struct UrlOptions {
    /// Force a download disposition; the value is the suggested filename
    /// (empty string keeps the object's own name)
    pub download: Option<String>,
    pub transform: Option<TransformOptions>,
}

/// Options for a download call.
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    pub transform: Option<TransformOptions>,
}

/// Options for signed-URL issuance.
#[derive(Debug, Clone, Default)]
pub struct SignedUrlOptions {
    /// Validity window in seconds, defaults to 3600
    pub expires_in: Option<u64>,
    pub download: Option<String>,
    pub transform: Option<TransformOptions>,
}

/// A time-limited capability URL for a (possibly private) object.
///
/// `expires_at` is computed client-side from the request time and the
/// requested TTL; it is approximate, since clock skew and the latency between
/// request and remote grant are not accounted for.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedUrl {
    pub url: String,
    pub path: String,
    pub expires_at: DateTime<Utc>,
}

impl SignedUrl {
    /// Whether the locally tracked validity window is still open.
    pub fn is_valid(&self) -> bool {
        self.expires_at > Utc::now()
    }
}

/// A time-limited URL authorizing one direct client-to-storage upload,
/// plus the token required to perform it.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedUploadUrl {
    pub url: String,
    pub path: String,
    pub token: String,
}
