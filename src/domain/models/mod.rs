mod bucket;
mod file_object;
mod signed_url;
mod transfer;

pub use bucket::*;
pub use file_object::*;
pub use signed_url::*;
pub use transfer::*;
