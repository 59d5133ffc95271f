//! Error types for image editing.

/// Message shown when the API key is not configured.
pub const MISSING_API_KEY_MESSAGE: &str = "Missing API Key. Please configure your environment.";

/// Message shown when a submission lacks an image or a prompt.
pub const MISSING_INPUT_MESSAGE: &str = "Please upload an image and provide an editing prompt.";

/// Errors that can occur while preparing or performing an edit.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// No API key was found in the environment.
    #[error("Missing API Key. Please configure your environment.")]
    MissingApiKey,

    /// The encoded image could not be split into MIME type and payload.
    #[error("Invalid data URI format")]
    InvalidDataUri,

    /// The selected file is not a PNG, JPEG or WebP image.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(#[from] base64::DecodeError),

    /// I/O error (reading the input or saving the result).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The remote edit call failed.
    #[error("Failed to edit image: {0}")]
    Remote(#[from] RemoteError),
}

/// Failures raised after a request to the generative service was attempted.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// Network or HTTP transport error.
    #[error("{0}")]
    Network(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message reported by the service.
        message: String,
    },

    /// The API key was rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The response carried no inline image data.
    #[error("No image found in the Gemini API response.")]
    NoImage,

    /// The response body was not valid JSON for the expected schema.
    #[error("invalid response: {0}")]
    Json(#[from] serde_json::Error),
}

impl EditError {
    /// Returns the string displayed to the user for this error.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Result type alias for editing operations.
pub type Result<T> = std::result::Result<T, EditError>;

/// Pulls `error.message` out of a Gemini error body, falling back to the raw text.
pub(crate) fn api_error_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct Envelope {
        error: Detail,
    }

    #[derive(serde::Deserialize)]
    struct Detail {
        message: String,
    }

    match serde_json::from_str::<Envelope>(body) {
        Ok(env) => env.error.message,
        Err(_) => {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "empty response body".to_string()
            } else {
                trimmed.chars().take(500).collect()
            }
        }
    }
}
