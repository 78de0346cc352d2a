mod bucket_service;
mod error_mapper;
mod file_service;
mod image_service;
mod url_service;

pub use bucket_service::BucketService;
pub use error_mapper::map_remote_error;
pub use file_service::FileService;
pub use image_service::{
    DEFAULT_RESPONSIVE_WIDTHS, ImageUrlService, ImageVariant, ResponsiveImageOptions,
    ResponsiveImageSet,
};
pub use url_service::UrlService;
