//! The generation pipeline: validate, encode, rasterise, post-process.

use image::RgbaImage;
use validator::Validate;

use crate::effects;
use crate::encoder::{QrcodeEncoder, SymbolEncoder};
use crate::error::{QrError, Result};
use crate::helper::render_grid;
use crate::options::{RenderMode, RenderOptions};
use crate::payload::{build_payload, ContentRequest};

/// Name under which a finished code is offered for download.
pub const DOWNLOAD_FILE_NAME: &str = "qr_code.png";
pub const DOWNLOAD_MIME: &str = "image/png";

/// Runs payloads through an encoder and the effects pipeline.
///
/// # Example
///
/// ```rust
/// use qrstudio::generator::Generator;
/// use qrstudio::options::RenderOptions;
///
/// let img = Generator::new()
///     .generate("https://example.com", &RenderOptions::default())
///     .unwrap();
/// assert_eq!(img.width(), img.height());
/// ```
#[derive(Clone, Debug)]
pub struct Generator<E = QrcodeEncoder> {
    encoder: E,
}

impl Generator {
    /// A generator backed by the `qrcode` crate.
    pub fn new() -> Self {
        Self {
            encoder: QrcodeEncoder,
        }
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: SymbolEncoder> Generator<E> {
    pub fn with_encoder(encoder: E) -> Self {
        Self { encoder }
    }

    /// Renders `payload` with `options`.
    ///
    /// # Errors
    ///
    /// - [`QrError::Validation`] if the payload is empty (the encoder is not
    ///   called) or an option is out of range.
    /// - [`QrError::Encoding`] if the payload exceeds the symbol capacity.
    pub fn generate(&self, payload: &str, options: &RenderOptions) -> Result<RgbaImage> {
        if payload.is_empty() {
            return Err(QrError::validation("Nothing to encode: the payload is empty"));
        }
        options.validate()?;

        let grid = self.encoder.encode(payload, options.error_correction)?;
        let base = render_grid(
            &grid,
            options.module_size,
            options.border_modules,
            options.fill_color,
            options.background_color,
        );

        let img = match options.mode {
            RenderMode::Flat => effects::apply(base, options),
            RenderMode::ThreeD => effects::render_3d(&base),
        };
        tracing::info!(
            mode = ?options.mode,
            modules = grid.size(),
            width = img.width(),
            height = img.height(),
            "qr code generated"
        );
        Ok(img)
    }

    /// Builds the payload for `request`, then renders it.
    pub fn generate_content(
        &self,
        request: &ContentRequest,
        options: &RenderOptions,
    ) -> Result<RgbaImage> {
        let payload = build_payload(request)?;
        self.generate(&payload, options)
    }
}
