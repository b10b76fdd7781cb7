//! Multipart form decoding for the generate and bulk endpoints.

use std::collections::BTreeMap;
use std::str::FromStr;

use axum::extract::Multipart;
use validator::Validate;

use crate::bulk::{BulkInput, BulkKind};
use crate::error::QrError;
use crate::helper::decode_overlay;
use crate::options::{RenderMode, RenderOptions};
use crate::payload::{Category, ContentRequest};
use crate::web::error::AppError;

/// What to do with a generated code.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Action {
    /// Show it on a result page.
    #[default]
    Preview,
    /// Send the PNG as a file download.
    Download,
}

/// A decoded `/generate` submission.
#[derive(Debug)]
pub struct GenerateForm {
    pub request: ContentRequest,
    pub options: RenderOptions,
    pub action: Action,
}

/// A decoded `/bulk` submission.
#[derive(Debug)]
pub struct BulkForm {
    pub input: BulkInput,
    pub options: RenderOptions,
}

// Raw parts before interpretation; uploads with no bytes are dropped.
#[derive(Default)]
struct RawForm {
    text: BTreeMap<String, String>,
    files: BTreeMap<String, Upload>,
}

struct Upload {
    bytes: Vec<u8>,
    content_type: Option<String>,
    file_name: Option<String>,
}

const FILE_FIELDS: [&str; 4] = ["logo", "icon", "background_image", "file"];

impl RawForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = RawForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read multipart field: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            if FILE_FIELDS.contains(&name.as_str()) {
                let content_type = field.content_type().map(str::to_string);
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read upload '{}': {}", name, e))
                })?;
                if !bytes.is_empty() {
                    form.files.insert(
                        name,
                        Upload {
                            bytes: bytes.to_vec(),
                            content_type,
                            file_name,
                        },
                    );
                }
            } else {
                let value = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read field '{}': {}", name, e))
                })?;
                form.text.insert(name, value);
            }
        }
        Ok(form)
    }

    fn take_text(&mut self, name: &str) -> Option<String> {
        self.text.remove(name).filter(|v| !v.trim().is_empty())
    }

    fn parse<T>(&mut self, name: &str, label: &str) -> Result<Option<T>, QrError>
    where
        T: FromStr,
    {
        match self.take_text(name) {
            None => Ok(None),
            Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
                QrError::validation(format!("{} has an invalid value '{}'", label, raw))
            }),
        }
    }

    fn flag(&mut self, name: &str) -> bool {
        matches!(
            self.take_text(name).as_deref().map(str::trim),
            Some("on" | "true" | "1" | "yes")
        )
    }

    fn overlay(&mut self, name: &str) -> Result<Option<image::RgbaImage>, QrError> {
        self.files
            .remove(name)
            .map(|upload| decode_overlay(&upload.bytes))
            .transpose()
    }

    // Consumes every option field, leaving only content fields behind.
    fn render_options(&mut self) -> Result<RenderOptions, QrError> {
        let defaults = RenderOptions::default();
        let mode = match self.take_text("mode").as_deref().map(str::trim) {
            None | Some("flat") => RenderMode::Flat,
            Some("3d") => RenderMode::ThreeD,
            Some(other) => {
                return Err(QrError::validation(format!("Unknown render mode '{}'", other)))
            }
        };
        let options = RenderOptions {
            error_correction: match self.take_text("error_correction") {
                Some(raw) => raw.parse()?,
                None => defaults.error_correction,
            },
            module_size: self.parse("module_size", "Module size")?.unwrap_or(defaults.module_size),
            border_modules: self.parse("border", "Border")?.unwrap_or(defaults.border_modules),
            fill_color: match self.take_text("fill_color") {
                Some(raw) => raw.parse()?,
                None => defaults.fill_color,
            },
            background_color: match self.take_text("background_color") {
                Some(raw) => raw.parse()?,
                None => defaults.background_color,
            },
            rotation_degrees: self
                .parse("rotation", "Rotation")?
                .unwrap_or(defaults.rotation_degrees),
            rounded: self.flag("rounded"),
            shadow: self.flag("shadow"),
            mode,
            logo: self.overlay("logo")?,
            icon: self.overlay("icon")?,
            background: self.overlay("background_image")?,
        };
        options.validate()?;
        Ok(options)
    }
}

impl GenerateForm {
    pub async fn from_multipart(
        multipart: Multipart,
        dynamic_base_url: &str,
    ) -> Result<Self, AppError> {
        let mut raw = RawForm::read(multipart).await?;

        let category: Category = raw
            .take_text("category")
            .ok_or_else(|| QrError::validation("Select a content type"))?
            .parse()?;
        let action = match raw.take_text("action").as_deref() {
            Some("download") => Action::Download,
            _ => Action::Preview,
        };
        let options = raw.render_options()?;

        let mut request = ContentRequest::new(category).with_dynamic_base_url(dynamic_base_url);
        // Inputs for every category share one form; keep the values the
        // browser actually sent, blank ones included.
        request.fields.extend(raw.text);

        Ok(Self {
            request,
            options,
            action,
        })
    }
}

impl BulkForm {
    /// Rejects files with more than `max_lines` payload lines before any rendering.
    pub async fn from_multipart(multipart: Multipart, max_lines: usize) -> Result<Self, AppError> {
        let mut raw = RawForm::read(multipart).await?;
        let upload = raw
            .files
            .remove("file")
            .ok_or_else(|| QrError::validation("Upload a CSV or text file"))?;
        let kind = BulkKind::detect(upload.content_type.as_deref(), upload.file_name.as_deref());
        let input = BulkInput::parse(&upload.bytes, kind)?;
        input.check_limit(max_lines)?;
        let options = raw.render_options()?;
        Ok(Self { input, options })
    }
}
