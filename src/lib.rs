#![warn(missing_docs)]
//! NanoEdit - edit images with natural-language instructions.
//!
//! Select an image, describe the change, and a Gemini image model returns
//! the edited picture. All image processing happens remotely; this crate
//! encodes the input, makes one request and hands back the first image in
//! the response.
//!
//! # Quick Start
//!
//! ```no_run
//! use nanoedit::{Config, EditSession, EditState, GeminiEditor, ImageAsset};
//!
//! #[tokio::main]
//! async fn main() -> nanoedit::Result<()> {
//!     let config = Config::from_env();
//!     let editor = GeminiEditor::from_config(&config)?;
//!
//!     let mut session = EditSession::new();
//!     session.select_image(ImageAsset::load("photo.png").await?);
//!     session.set_prompt("Make the sky look like a vibrant sunset");
//!
//!     let succeeded = matches!(session.submit(&editor).await, EditState::Success);
//!     if let (true, Some(result)) = (succeeded, session.edited()) {
//!         result.save(session.download_name()).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `cli` (default): the `nanoedit` command-line editor

mod error;

pub mod client;
pub mod config;
pub mod image;
pub mod session;

// Re-export error types at crate root
pub use error::{EditError, RemoteError, Result, MISSING_API_KEY_MESSAGE, MISSING_INPUT_MESSAGE};

pub use client::{GeminiEditor, GeminiEditorBuilder, GeminiModel, ImageEditor};
pub use config::Config;
pub use image::{EditResult, EncodedImage, ImageAsset, ImageFormat};
pub use session::{EditRequest, EditSession, EditState, Submission};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::client::{GeminiEditor, ImageEditor};
    pub use crate::config::Config;
    pub use crate::error::{EditError, Result};
    pub use crate::image::{EditResult, ImageAsset};
    pub use crate::session::{EditSession, EditState, Submission};
}
