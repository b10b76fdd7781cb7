//! Error type shared by the payload, rendering and bulk modules.

use thiserror::Error;

/// Errors produced while building a payload or rendering a QR code.
///
/// All variants are recoverable: the web layer turns them into an inline
/// message on the form page.
#[derive(Debug, Error)]
pub enum QrError {
    /// A required field is empty or a value is out of range.
    #[error("{0}")]
    Validation(String),

    /// An uploaded overlay (logo, icon, background) could not be decoded.
    #[error("Could not read uploaded image: {0}")]
    ImageDecode(#[source] image::ImageError),

    /// The payload does not fit in a QR symbol at the chosen error correction level.
    #[error("Payload cannot be encoded: {0}")]
    Encoding(#[from] qrcode::types::QrError),

    /// The finished bitmap could not be written out as PNG.
    #[error("Could not encode PNG output: {0}")]
    Render(#[source] image::ImageError),
}

impl QrError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Flattens derive-level field errors into one user-facing message.
impl From<validator::ValidationErrors> for QrError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();
        messages.sort();
        Self::Validation(messages.join("; "))
    }
}

pub type Result<T> = std::result::Result<T, QrError>;
