use crate::encoder::ModuleGrid;
use crate::error::{QrError, Result};
use crate::options::Rgb;

use image::{ImageBuffer, ImageFormat, RgbaImage};
use std::io::Cursor;

/*---- Utilities ----*/

/// Rasterises a module grid into an RGBA bitmap.
///
/// # Arguments
///
/// * `grid` - The encoded symbol.
/// * `module_size` - Pixels per module edge.
/// * `border` - Quiet zone width in modules, drawn in the background colour.
/// * `fill` - Colour of dark modules.
/// * `background` - Colour of light modules and the quiet zone.
///
/// # Example
///
/// ```rust
/// use qrstudio::encoder::{QrcodeEncoder, SymbolEncoder};
/// use qrstudio::helper::render_grid;
/// use qrstudio::options::{ErrorCorrection, Rgb};
///
/// let grid = QrcodeEncoder.encode("Hello, world!", ErrorCorrection::Low).unwrap();
/// let img = render_grid(&grid, 1, 4, Rgb::BLACK, Rgb::WHITE);
/// assert_eq!(img.dimensions(), (29, 29));
/// ```
pub fn render_grid(
    grid: &ModuleGrid,
    module_size: u32,
    border: u32,
    fill: Rgb,
    background: Rgb,
) -> RgbaImage {
    let module_size = module_size.max(1);
    let border = border as i32;
    let side = (grid.size() as u32 + 2 * border as u32) * module_size;
    let (dark, light) = (fill.to_rgba(), background.to_rgba());

    ImageBuffer::from_fn(side, side, |x, y| {
        let qr_x = (x / module_size) as i32 - border;
        let qr_y = (y / module_size) as i32 - border;
        if grid.get_module(qr_x, qr_y) {
            dark
        } else {
            light
        }
    })
}

/// Encodes a bitmap as PNG bytes.
///
/// # Errors
///
/// Returns [`QrError::Render`] if the PNG encoder fails.
pub fn to_png_bytes(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png)
        .map_err(QrError::Render)?;
    Ok(buffer.into_inner())
}

/// Decodes an uploaded overlay (PNG, JPEG, ...) into RGBA.
///
/// # Errors
///
/// Returns [`QrError::ImageDecode`] when the bytes are not a readable image.
pub fn decode_overlay(bytes: &[u8]) -> Result<RgbaImage> {
    let img = image::load_from_memory(bytes).map_err(QrError::ImageDecode)?;
    Ok(img.to_rgba8())
}
