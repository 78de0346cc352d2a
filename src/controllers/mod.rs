mod delete;
mod download;
mod list;
mod signed_url;
mod upload;

pub use delete::{DeleteController, DeleteReport, DeleteState};
pub use download::{DownloadCallbacks, DownloadController, DownloadSuccessCallback};
pub use list::{ListController, ListState};
pub use signed_url::{SignedUrlController, SignedUrlState};
pub use upload::{
    ErrorCallback, ProgressCallback, UploadCallbacks, UploadController, UploadSuccessCallback,
};
