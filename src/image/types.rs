//! Core image types: accepted formats, the selected asset and the edit result.

use crate::error::{EditError, Result};
use crate::image::encode::{self, EncodedImage};
use std::path::Path;

/// File name used for downloads when the original name is unknown.
pub const DEFAULT_FILE_NAME: &str = "image.png";

/// Image formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format.
    WebP,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Maps a MIME type back to a format.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime.trim().to_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// An image selected for editing.
///
/// Lives until the next selection; nothing is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    /// Raw file bytes.
    pub data: Vec<u8>,
    /// MIME type of the file.
    pub mime_type: String,
    /// Original file name, if the asset came from a file.
    pub file_name: Option<String>,
}

impl ImageAsset {
    /// Reads an image file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Io`] if the read fails and
    /// [`EditError::UnsupportedFormat`] if the file is not PNG, JPEG or WebP.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string);

        let format = ImageFormat::from_magic_bytes(&data)
            .or_else(|| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .and_then(ImageFormat::from_extension)
            })
            .ok_or_else(|| EditError::UnsupportedFormat(path.display().to_string()))?;

        tracing::debug!(
            path = %path.display(),
            bytes = data.len(),
            mime_type = format.mime_type(),
            "loaded image"
        );

        Ok(Self {
            data,
            mime_type: format.mime_type().to_string(),
            file_name,
        })
    }

    /// Wraps in-memory bytes, detecting the format from magic bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::UnsupportedFormat`] if the bytes are not a known image.
    pub fn from_bytes(data: Vec<u8>, file_name: Option<String>) -> Result<Self> {
        let format = ImageFormat::from_magic_bytes(&data).ok_or_else(|| {
            EditError::UnsupportedFormat(
                file_name
                    .clone()
                    .unwrap_or_else(|| "unrecognized image data".into()),
            )
        })?;
        Ok(Self {
            data,
            mime_type: format.mime_type().to_string(),
            file_name,
        })
    }

    /// Returns the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Returns the image as a data URI, suitable as a preview.
    pub fn to_data_uri(&self) -> String {
        encode::data_uri(&self.mime_type, &self.data)
    }

    /// Produces the base64 payload and MIME type sent to the service.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidDataUri`] if the encoded form does not
    /// split into a MIME header and a payload.
    pub fn encode(&self) -> Result<EncodedImage> {
        EncodedImage::parse_data_uri(&self.to_data_uri())
    }

    /// Name offered when downloading the edited version of this image.
    pub fn download_name(&self) -> String {
        download_name(self.file_name.as_deref())
    }
}

/// Builds `edited-<name>`, defaulting to `edited-image.png`.
pub fn download_name(original: Option<&str>) -> String {
    let name = original.filter(|n| !n.is_empty()).unwrap_or(DEFAULT_FILE_NAME);
    format!("edited-{name}")
}

/// An edited image returned by the service.
///
/// The payload is kept exactly as received.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "edited image should be displayed or saved"]
pub struct EditResult {
    /// MIME type reported by the service.
    pub mime_type: String,
    /// Base64 image payload.
    pub data: String,
}

impl EditResult {
    /// Creates a new result.
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Returns the displayable data URI for this result.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Returns the format matching the reported MIME type, if known.
    pub fn format(&self) -> Option<ImageFormat> {
        ImageFormat::from_mime_type(&self.mime_type)
    }

    /// Decodes the payload to raw image bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Decode`] if the payload is not valid base64.
    pub fn decode(&self) -> Result<Vec<u8>> {
        encode::decode_base64(&self.data)
    }

    /// Writes the decoded image to `path`.
    ///
    /// # Errors
    ///
    /// Returns a decode error or an I/O error.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<usize> {
        let bytes = self.decode()?;
        tokio::fs::write(path, &bytes).await?;
        Ok(bytes.len())
    }
}
