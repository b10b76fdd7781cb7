//! Rendering options collected alongside the payload.

use std::fmt;
use std::str::FromStr;

use image::RgbaImage;
use validator::Validate;

use crate::error::{QrError, Result};

/// Error correction level of the QR symbol.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ErrorCorrection {
    /// Recovers about 7% of damaged codewords.
    #[default]
    Low,
    /// About 15%.
    Medium,
    /// About 25%.
    Quartile,
    /// About 30%.
    High,
}

impl ErrorCorrection {
    pub const ALL: [ErrorCorrection; 4] = [
        ErrorCorrection::Low,
        ErrorCorrection::Medium,
        ErrorCorrection::Quartile,
        ErrorCorrection::High,
    ];

    pub fn letter(self) -> &'static str {
        match self {
            Self::Low => "L",
            Self::Medium => "M",
            Self::Quartile => "Q",
            Self::High => "H",
        }
    }
}

impl From<ErrorCorrection> for qrcode::EcLevel {
    fn from(ecl: ErrorCorrection) -> Self {
        match ecl {
            ErrorCorrection::Low => qrcode::EcLevel::L,
            ErrorCorrection::Medium => qrcode::EcLevel::M,
            ErrorCorrection::Quartile => qrcode::EcLevel::Q,
            ErrorCorrection::High => qrcode::EcLevel::H,
        }
    }
}

impl FromStr for ErrorCorrection {
    type Err = QrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" | "LOW" => Ok(Self::Low),
            "M" | "MEDIUM" => Ok(Self::Medium),
            "Q" | "QUARTILE" => Ok(Self::Quartile),
            "H" | "HIGH" => Ok(Self::High),
            _ => Err(QrError::validation(format!(
                "Unknown error correction level '{}'",
                s
            ))),
        }
    }
}

/// An opaque colour.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0, 0, 0]);
    pub const WHITE: Rgb = Rgb([255, 255, 255]);

    pub fn to_rgba(self) -> image::Rgba<u8> {
        let [r, g, b] = self.0;
        image::Rgba([r, g, b, 255])
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{:02X}{:02X}{:02X}", r, g, b)
    }
}

/// Parses `#RRGGBB` or `RRGGBB`.
impl FromStr for Rgb {
    type Err = QrError;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || QrError::validation(format!("Invalid colour '{}', expected #RRGGBB", s));
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
    }
}

/// Which render path the generator takes.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum RenderMode {
    /// Base render followed by the ordered cosmetic transforms.
    #[default]
    Flat,
    /// Base render turned 45 degrees; every other transform is ignored.
    ThreeD,
}

/// Everything that controls how a payload becomes a bitmap.
///
/// Numeric options are checked with [`Validate::validate`] before rendering.
#[derive(Clone, Debug, Validate)]
pub struct RenderOptions {
    pub error_correction: ErrorCorrection,
    /// Pixels per module.
    #[validate(range(min = 1, max = 10, message = "Module size must be between 1 and 10"))]
    pub module_size: u32,
    /// Quiet zone width in modules.
    #[validate(range(min = 1, max = 10, message = "Border must be between 1 and 10"))]
    pub border_modules: u32,
    pub fill_color: Rgb,
    pub background_color: Rgb,
    /// Counter-clockwise rotation.
    #[validate(range(max = 360, message = "Rotation must be between 0 and 360"))]
    pub rotation_degrees: u32,
    pub rounded: bool,
    pub shadow: bool,
    pub mode: RenderMode,
    pub logo: Option<RgbaImage>,
    pub icon: Option<RgbaImage>,
    pub background: Option<RgbaImage>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            error_correction: ErrorCorrection::Low,
            module_size: 5,
            border_modules: 4,
            fill_color: Rgb::BLACK,
            background_color: Rgb::WHITE,
            rotation_degrees: 0,
            rounded: false,
            shadow: false,
            mode: RenderMode::Flat,
            logo: None,
            icon: None,
            background: None,
        }
    }
}

impl RenderOptions {
    /// True when no cosmetic transform would change the base render.
    pub fn is_plain(&self) -> bool {
        self.logo.is_none()
            && self.icon.is_none()
            && self.background.is_none()
            && !self.rounded
            && !self.shadow
            && self.rotation_degrees % 360 == 0
    }
}
