//! Base64 and data URI conversion.

use crate::error::{EditError, Result};
use base64::Engine;

/// An image ready to be sent: base64 payload plus MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Base64 payload (standard alphabet, padded).
    pub base64: String,
    /// MIME type taken from the data URI header.
    pub mime_type: String,
}

impl EncodedImage {
    /// Splits a `data:<mime>;base64,<payload>` string into its two parts.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidDataUri`] unless the string has exactly one
    /// `,` separating a header that names a MIME type from the payload.
    pub fn parse_data_uri(uri: &str) -> Result<Self> {
        let mut parts = uri.split(',');
        let (Some(header), Some(payload), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(EditError::InvalidDataUri);
        };

        let mime_type = header
            .split(':')
            .nth(1)
            .and_then(|rest| rest.split(';').next())
            .filter(|mime| !mime.is_empty())
            .ok_or(EditError::InvalidDataUri)?;

        Ok(Self {
            base64: payload.to_string(),
            mime_type: mime_type.to_string(),
        })
    }

    /// Decodes the payload back to raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Decode`] if the payload is not valid base64.
    pub fn decode(&self) -> Result<Vec<u8>> {
        decode_base64(&self.base64)
    }

    /// Reassembles the data URI.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }
}

/// Encodes bytes as a base64 data URI.
pub fn data_uri(mime_type: &str, data: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        base64::engine::general_purpose::STANDARD.encode(data)
    )
}

pub(crate) fn decode_base64(payload: &str) -> Result<Vec<u8>> {
    Ok(base64::engine::general_purpose::STANDARD.decode(payload.trim())?)
}
