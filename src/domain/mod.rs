pub mod errors;
pub mod media;
pub mod models;
pub mod paths;
pub mod value_objects;

pub use errors::*;
pub use models::*;
pub use value_objects::*;
