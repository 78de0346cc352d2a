use crate::domain::models::{ImageFormat, ResizeMode, TransformOptions, UrlOptions};
use crate::domain::value_objects::BucketName;
use crate::services::url_service::UrlService;

/// Default widths for responsive image sets.
pub const DEFAULT_RESPONSIVE_WIDTHS: &[u32] = &[320, 640, 768, 1024, 1280, 1920];

const OPTIMIZED_QUALITY: u8 = 80;
const THUMBNAIL_QUALITY: u8 = 70;

/// Options for responsive image derivation.
#[derive(Debug, Clone)]
pub struct ResponsiveImageOptions {
    pub format: ImageFormat,
    pub quality: u8,
}

impl Default for ResponsiveImageOptions {
    fn default() -> Self {
        Self {
            format: ImageFormat::Webp,
            quality: OPTIMIZED_QUALITY,
        }
    }
}

/// One width variant of a responsive image set.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageVariant {
    pub width: u32,
    pub url: String,
}

/// A srcset-style set of transformed URLs for one stored image.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponsiveImageSet {
    /// Untransformed public URL
    pub original: String,
    /// One entry per requested width, input order preserved
    pub variants: Vec<ImageVariant>,
    /// `"<url> <width>w"` pairs joined by `", "`, in input order
    pub srcset: String,
}

/// Pure URL derivations for remote-side image transforms. No pixels are
/// read or processed locally; the remote service interprets the encoded
/// parameters on request.
#[derive(Clone)]
pub struct ImageUrlService {
    urls: UrlService,
}

impl ImageUrlService {
    pub fn new(urls: UrlService) -> Self {
        Self { urls }
    }

    /// Public URL with a transform spec forwarded.
    pub fn get_transformed_url(
        &self,
        bucket: &BucketName,
        path: &str,
        transform: TransformOptions,
    ) -> String {
        self.urls.get_public_url(
            bucket,
            path,
            &UrlOptions {
                download: None,
                transform: Some(transform),
            },
        )
    }

    /// Derive the original URL, one transformed URL per requested width, and
    /// the srcset string. The `widths` order is preserved verbatim; pass it
    /// pre-sorted if ascending order matters downstream.
    pub fn generate_responsive_images(
        &self,
        bucket: &BucketName,
        path: &str,
        widths: &[u32],
        options: ResponsiveImageOptions,
    ) -> ResponsiveImageSet {
        let original = self
            .urls
            .get_public_url(bucket, path, &UrlOptions::default());

        let variants: Vec<ImageVariant> = widths
            .iter()
            .map(|&width| ImageVariant {
                width,
                url: self.get_transformed_url(
                    bucket,
                    path,
                    TransformOptions {
                        width: Some(width),
                        format: Some(options.format),
                        quality: Some(options.quality),
                        ..Default::default()
                    },
                ),
            })
            .collect();

        let srcset = variants
            .iter()
            .map(|v| format!("{} {}w", v.url, v.width))
            .collect::<Vec<_>>()
            .join(", ");

        ResponsiveImageSet {
            original,
            variants,
            srcset,
        }
    }

    /// Convenience wrapper fixing webp output at quality 80.
    pub fn get_optimized_image_url(
        &self,
        bucket: &BucketName,
        path: &str,
        width: Option<u32>,
        height: Option<u32>,
    ) -> String {
        self.get_transformed_url(
            bucket,
            path,
            TransformOptions {
                width,
                height,
                format: Some(ImageFormat::Webp),
                quality: Some(OPTIMIZED_QUALITY),
                ..Default::default()
            },
        )
    }

    /// Fixed-size square thumbnail: webp, quality 70, cover resize.
    pub fn get_thumbnail_url(&self, bucket: &BucketName, path: &str, size: u32) -> String {
        self.get_transformed_url(
            bucket,
            path,
            TransformOptions {
                width: Some(size),
                height: Some(size),
                resize: Some(ResizeMode::Cover),
                format: Some(ImageFormat::Webp),
                quality: Some(THUMBNAIL_QUALITY),
            },
        )
    }
}
