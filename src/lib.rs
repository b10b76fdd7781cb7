//! # qrstudio
//!
//! A QR code studio: turn contact cards, Wi-Fi credentials, events and links
//! into styled QR codes, one at a time or in bulk, from a small web form.
//!
//! The symbol itself comes from the `qrcode` crate. `qrstudio` builds the
//! payload text, rasterises the module grid with the `image` crate, and runs
//! an ordered set of cosmetic effects over the bitmap.
//!
//! ## Features
//!
//! - Payload templates for URL, text, payment link, vCard, email, geo location,
//!   calendar event, Wi-Fi, SMS and generated dynamic links.
//! - Four error correction levels, module size, border and colours.
//! - Logo and icon overlays, rounded corners, shadow tint, rotation, background
//!   image blending, and a 45 degree "3D" mode.
//! - Bulk generation from CSV or newline-delimited text.
//! - An axum web UI with a session login, PNG preview and `qr_code.png` download.
//!
//! ## Example
//!
//! Build a Wi-Fi payload and render it with a shadow:
//!
//! ```rust,no_run
//! use qrstudio::generator::Generator;
//! use qrstudio::options::RenderOptions;
//! use qrstudio::payload::{Category, ContentRequest};
//!
//! let request = ContentRequest::new(Category::Wifi)
//!     .with_field("ssid", "Home")
//!     .with_field("password", "secret");
//! let options = RenderOptions {
//!     shadow: true,
//!     ..RenderOptions::default()
//! };
//! let img = Generator::new().generate_content(&request, &options).unwrap();
//! img.save("wifi.png").expect("Failed to save image");
//! ```
//!
//! ## Modules
//!
//! - [`payload`]: Category templates.
//! - [`options`]: Render options.
//! - [`encoder`]: The QR encoder seam.
//! - [`helper`]: Rasterising, PNG output and overlay decoding.
//! - [`effects`]: Ordered post-processing.
//! - [`generator`]: The end-to-end pipeline.
//! - [`bulk`]: Batch input and processing.
//! - [`web`]: The HTTP form surface.

pub mod bulk;
pub mod config;
pub mod effects;
pub mod encoder;
pub mod error;
pub mod generator;
pub mod helper;
pub mod options;
pub mod payload;
pub mod telemetry;
pub mod web;

pub use error::{QrError, Result};
