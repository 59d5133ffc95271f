//! Gemini (Google) image editing client.

use crate::client::ImageEditor;
use crate::config::{Config, DEFAULT_BASE_URL};
use crate::error::{api_error_message, EditError, RemoteError, Result};
use crate::image::{EditResult, EncodedImage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Instant;

/// Gemini image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeminiModel {
    /// Nano Banana - Gemini 2.5 Flash Image (fast, economical).
    #[default]
    NanoBanana,
    /// Nano Banana Pro - Gemini 3 Pro Image (highest quality).
    NanoBananaPro,
}

impl GeminiModel {
    /// All known variants.
    pub const ALL: [Self; 2] = [Self::NanoBanana, Self::NanoBananaPro];

    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NanoBanana => "gemini-2.5-flash-image",
            Self::NanoBananaPro => "nano-banana-pro-preview",
        }
    }

    /// Returns the short alias accepted on the command line.
    pub fn alias(&self) -> &'static str {
        match self {
            Self::NanoBanana => "nano-banana",
            Self::NanoBananaPro => "nano-banana-pro",
        }
    }
}

impl std::fmt::Display for GeminiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeminiModel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s) || m.alias().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown Gemini image model: {s}"))
    }
}

/// Builder for [`GeminiEditor`].
#[derive(Debug, Clone, Default)]
pub struct GeminiEditorBuilder {
    api_key: Option<String>,
    model: GeminiModel,
    base_url: Option<String>,
}

impl GeminiEditorBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Without one, every edit fails with
    /// [`EditError::MissingApiKey`].
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the Gemini model variant.
    pub fn model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    /// Overrides the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the editor.
    ///
    /// # Errors
    ///
    /// Fails only if the HTTP client cannot be initialized.
    pub fn build(self) -> Result<GeminiEditor> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("nanoedit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(RemoteError::from)?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(GeminiEditor {
            client,
            api_key: self.api_key.filter(|k| !k.trim().is_empty()),
            model: self.model,
            base_url,
        })
    }
}

/// Gemini image editing client.
pub struct GeminiEditor {
    client: reqwest::Client,
    api_key: Option<String>,
    model: GeminiModel,
    base_url: String,
}

impl std::fmt::Debug for GeminiEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiEditor")
            .field("has_api_key", &self.api_key.is_some())
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeminiEditor {
    /// Creates a new `GeminiEditorBuilder`.
    pub fn builder() -> GeminiEditorBuilder {
        GeminiEditorBuilder::new()
    }

    /// Creates an editor from startup configuration.
    ///
    /// # Errors
    ///
    /// Fails only if the HTTP client cannot be initialized.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut builder = Self::builder()
            .model(config.model)
            .base_url(config.base_url.clone());
        if let Some(key) = config.api_key() {
            builder = builder.api_key(key);
        }
        builder.build()
    }

    /// Returns the model this editor targets.
    pub fn model(&self) -> GeminiModel {
        self.model
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or(EditError::MissingApiKey)
    }

    async fn edit_impl(
        &self,
        api_key: &str,
        image: &EncodedImage,
        prompt: &str,
    ) -> std::result::Result<EditResult, RemoteError> {
        let start = Instant::now();

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url,
            self.model.as_str(),
        );

        let body = GeminiRequest::edit(image, prompt);

        tracing::debug!(
            model = self.model.as_str(),
            mime_type = %image.mime_type,
            payload_len = image.base64.len(),
            "sending Gemini edit request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(parse_error(status.as_u16(), &text));
        }

        let gemini_response: GeminiResponse = serde_json::from_str(&text)?;
        let result = extract_image(gemini_response)?;

        tracing::debug!(
            mime_type = %result.mime_type,
            payload_len = result.data.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "received edited image"
        );

        Ok(result)
    }
}

#[async_trait]
impl ImageEditor for GeminiEditor {
    async fn edit(&self, image: &EncodedImage, prompt: &str) -> Result<EditResult> {
        let api_key = self.api_key()?;

        self.edit_impl(api_key, image, prompt).await.map_err(|e| {
            tracing::error!(error = %e, "error calling Gemini API");
            EditError::Remote(e)
        })
    }

    fn name(&self) -> &str {
        "Gemini (Google)"
    }

    async fn health_check(&self) -> Result<()> {
        let api_key = self.api_key()?;
        let url = format!("{}/v1beta/models/{}", self.base_url, self.model.as_str());

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", api_key)
            .send()
            .await
            .map_err(RemoteError::from)?;

        match response.status().as_u16() {
            401 | 403 => Err(RemoteError::Auth("Invalid API key".into()).into()),
            404 => Err(RemoteError::Api {
                status: 404,
                message: "Model not found. Verify the model name is correct.".into(),
            }
            .into()),
            s if !(200..300).contains(&s) => Err(RemoteError::Api {
                status: s,
                message: "Health check failed".into(),
            }
            .into()),
            _ => Ok(()),
        }
    }
}

fn parse_error(status: u16, text: &str) -> RemoteError {
    let message = api_error_message(text);
    match status {
        401 | 403 => RemoteError::Auth(message),
        _ => RemoteError::Api { status, message },
    }
}

/// Takes the first inline-data part of the first candidate.
///
/// Every imageless response is reported as [`RemoteError::NoImage`]; block
/// and finish reasons are only logged.
fn extract_image(response: GeminiResponse) -> std::result::Result<EditResult, RemoteError> {
    let candidate = response.candidates.into_iter().next();

    let finish_reason = candidate.as_ref().and_then(|c| c.finish_reason.clone());

    let inline = candidate
        .and_then(|c| c.content)
        .and_then(|content| content.parts.into_iter().find_map(|p| p.inline_data));

    if let Some(inline) = inline {
        return Ok(EditResult::new(inline.mime_type, inline.data));
    }

    let feedback = response.prompt_feedback.unwrap_or_default();
    tracing::warn!(
        finish_reason = finish_reason.as_deref().unwrap_or("none"),
        block_reason = feedback.block_reason.as_deref().unwrap_or("none"),
        block_message = feedback.block_reason_message.as_deref().unwrap_or(""),
        "Gemini response contained no image"
    );

    Err(RemoteError::NoImage)
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    generation_config: GeminiConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiRequestPart<'a>>,
}

/// A part in a Gemini request - inline image data or text.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart<'a> {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData<'a>,
    },
    Text {
        text: &'a str,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    response_modalities: Vec<&'static str>,
}

impl<'a> GeminiRequest<'a> {
    fn edit(image: &'a EncodedImage, prompt: &'a str) -> Self {
        let parts = vec![
            GeminiRequestPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: &image.mime_type,
                    data: &image.base64,
                },
            },
            GeminiRequestPart::Text { text: prompt },
        ];

        Self {
            contents: vec![GeminiContent { parts }],
            generation_config: GeminiConfig {
                response_modalities: vec!["IMAGE"],
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}
