//! Image data model and encoding.

mod encode;
mod types;

pub use encode::{data_uri, EncodedImage};
pub use types::{download_name, EditResult, ImageAsset, ImageFormat, DEFAULT_FILE_NAME};
