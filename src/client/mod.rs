//! Remote edit clients.

mod gemini;

pub use gemini::{GeminiEditor, GeminiEditorBuilder, GeminiModel};

use crate::error::Result;
use crate::image::{EditResult, EncodedImage};
use async_trait::async_trait;

/// A service that edits an image according to a text instruction.
#[async_trait]
pub trait ImageEditor: Send + Sync {
    /// Sends one edit request and returns the first image in the response.
    ///
    /// Transient failures are returned as-is; there is no retry.
    async fn edit(&self, image: &EncodedImage, prompt: &str) -> Result<EditResult>;

    /// Returns the name of this editor for display.
    fn name(&self) -> &str;

    /// Checks if the service is reachable and the credentials are accepted.
    async fn health_check(&self) -> Result<()>;
}
