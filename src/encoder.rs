//! Symbol encoding.
//!
//! The matrix itself comes from the `qrcode` crate. This module only adapts it
//! into a [`ModuleGrid`] the rasteriser can read, behind the [`SymbolEncoder`]
//! trait so the pipeline does not depend on a concrete encoder.

use qrcode::{Color, QrCode};

use crate::error::Result;
use crate::options::ErrorCorrection;

/// A square grid of dark and light modules, without quiet zone.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ModuleGrid {
    size: i32,
    modules: Vec<bool>,
}

impl ModuleGrid {
    /// Builds a grid from row-major modules (`true` = dark).
    ///
    /// # Panics
    ///
    /// Panics if `modules.len()` is not `size * size`.
    pub fn new(size: usize, modules: Vec<bool>) -> Self {
        assert_eq!(modules.len(), size * size, "Module count must be size squared");
        Self {
            size: size as i32,
            modules,
        }
    }

    /// Width and height in modules.
    pub fn size(&self) -> i32 {
        self.size
    }

    /// Returns the color of the module at the given coordinates, which is
    /// false for light or true for dark. Coordinates outside the grid are
    /// light, so callers can read the quiet zone without bounds checks.
    pub fn get_module(&self, x: i32, y: i32) -> bool {
        (0..self.size).contains(&x)
            && (0..self.size).contains(&y)
            && self.modules[(y * self.size + x) as usize]
    }
}

/// Turns a payload into a module grid.
pub trait SymbolEncoder {
    fn encode(&self, payload: &str, ecl: ErrorCorrection) -> Result<ModuleGrid>;
}

/// [`SymbolEncoder`] backed by the `qrcode` crate.
///
/// Picks the smallest version that fits the payload at the requested level.
#[derive(Clone, Copy, Debug, Default)]
pub struct QrcodeEncoder;

impl SymbolEncoder for QrcodeEncoder {
    fn encode(&self, payload: &str, ecl: ErrorCorrection) -> Result<ModuleGrid> {
        let code = QrCode::with_error_correction_level(payload.as_bytes(), ecl.into())?;
        let size = code.width();
        let modules = code
            .to_colors()
            .into_iter()
            .map(|c| c == Color::Dark)
            .collect();
        tracing::debug!(
            version = ?code.version(),
            size,
            ecl = ecl.letter(),
            "payload encoded"
        );
        Ok(ModuleGrid::new(size, modules))
    }
}
