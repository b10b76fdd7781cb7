//! Cosmetic post-processing of a rendered QR bitmap.
//!
//! [`apply`] runs the enabled transforms in a fixed order. Compositing steps do
//! not commute, so the order is part of the output contract:
//!
//! 1. logo, 50x50, centred, through its own alpha
//! 2. rounded corners (radius 20)
//! 3. flat shadow tint
//! 4. rotation with canvas expansion
//! 5. background image blended by the QR luminance
//! 6. icon, 40x40, centred, through its own alpha
//!
//! [`render_3d`] is the alternate path: a 45 degree turn and nothing else.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgba, RgbaImage};

use crate::options::RenderOptions;

pub const LOGO_SIZE: u32 = 50;
pub const ICON_SIZE: u32 = 40;
pub const CORNER_RADIUS: u32 = 20;
pub const SHADOW_ALPHA: u8 = 100;
pub const THREE_D_ANGLE: u32 = 45;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Applies every enabled transform from `options` to `base`.
///
/// With all toggles off `base` is returned untouched.
pub fn apply(base: RgbaImage, options: &RenderOptions) -> RgbaImage {
    if options.is_plain() {
        return base;
    }
    let mut img = base;

    if let Some(logo) = &options.logo {
        paste_centered(&mut img, logo, LOGO_SIZE);
    }
    if options.rounded {
        round_corners(&mut img, CORNER_RADIUS);
    }
    if options.shadow {
        img = apply_shadow(&img);
    }
    img = rotate(&img, options.rotation_degrees);
    if let Some(background) = &options.background {
        img = composite_background(&img, background);
    }
    if let Some(icon) = &options.icon {
        paste_centered(&mut img, icon, ICON_SIZE);
    }

    tracing::debug!(
        width = img.width(),
        height = img.height(),
        logo = options.logo.is_some(),
        icon = options.icon.is_some(),
        background = options.background.is_some(),
        rounded = options.rounded,
        shadow = options.shadow,
        rotation = options.rotation_degrees,
        "effects applied"
    );
    img
}

/// The 3D render path: the base image turned 45 degrees with expansion.
pub fn render_3d(base: &RgbaImage) -> RgbaImage {
    rotate(base, THREE_D_ANGLE)
}

/// Resizes `overlay` to `size` x `size` and pastes it at the centre of `img`,
/// blending every channel through the overlay's alpha.
pub fn paste_centered(img: &mut RgbaImage, overlay: &RgbaImage, size: u32) {
    let overlay = imageops::resize(overlay, size, size, FilterType::CatmullRom);
    let left = i64::from(img.width() / 2) - i64::from(size / 2);
    let top = i64::from(img.height() / 2) - i64::from(size / 2);
    paste_with_alpha(img, &overlay, left, top);
}

/// Pastes `over` with its top-left corner at (`left`, `top`), clipping to the canvas.
pub fn paste_with_alpha(img: &mut RgbaImage, over: &RgbaImage, left: i64, top: i64) {
    for (ox, oy, src) in over.enumerate_pixels() {
        let (x, y) = (left + i64::from(ox), top + i64::from(oy));
        if x < 0 || y < 0 || x >= i64::from(img.width()) || y >= i64::from(img.height()) {
            continue;
        }
        let a = src[3];
        let dst = img.get_pixel_mut(x as u32, y as u32);
        for c in 0..4 {
            dst[c] = mix(dst[c], src[c], a);
        }
    }
}

/// Makes the four corners transparent outside a quarter circle of `radius`.
///
/// Only the alpha channel changes, so applying it twice equals applying it once.
pub fn round_corners(img: &mut RgbaImage, radius: u32) {
    let (w, h) = img.dimensions();
    let r = radius.min(w / 2).min(h / 2);
    if r == 0 {
        return;
    }
    let rf = r as f32;
    for y in 0..h {
        for x in 0..w {
            // Distance from the nearest inner corner, only inside a corner square.
            let dx = if x < r {
                rf - (x as f32 + 0.5)
            } else if x >= w - r {
                (x as f32 + 0.5) - (w - r) as f32
            } else {
                continue;
            };
            let dy = if y < r {
                rf - (y as f32 + 0.5)
            } else if y >= h - r {
                (y as f32 + 0.5) - (h - r) as f32
            } else {
                continue;
            };
            if dx * dx + dy * dy > rf * rf {
                img.get_pixel_mut(x, y)[3] = 0;
            }
        }
    }
}

/// Composites `img` over a full-canvas layer of translucent black.
pub fn apply_shadow(img: &RgbaImage) -> RgbaImage {
    let shade = Rgba([0, 0, 0, SHADOW_ALPHA]);
    ImageBuffer::from_fn(img.width(), img.height(), |x, y| alpha_over(shade, *img.get_pixel(x, y)))
}

/// Rotates counter-clockwise by `degrees`, growing the canvas so nothing is
/// cropped. Uncovered area is transparent. Whole turns return a copy.
pub fn rotate(img: &RgbaImage, degrees: u32) -> RgbaImage {
    match degrees % 360 {
        0 => img.clone(),
        90 => imageops::rotate270(img),
        180 => imageops::rotate180(img),
        270 => imageops::rotate90(img),
        d => rotate_expand(img, f64::from(d).to_radians()),
    }
}

// Nearest-neighbour inverse mapping around the canvas centre.
fn rotate_expand(img: &RgbaImage, theta: f64) -> RgbaImage {
    let (w, h) = (f64::from(img.width()), f64::from(img.height()));
    let (sin, cos) = theta.sin_cos();
    let new_w = (w * cos.abs() + h * sin.abs() - 1e-6).ceil().max(1.0);
    let new_h = (w * sin.abs() + h * cos.abs() - 1e-6).ceil().max(1.0);

    ImageBuffer::from_fn(new_w as u32, new_h as u32, |x, y| {
        let ox = f64::from(x) + 0.5 - new_w / 2.0;
        let oy = f64::from(y) + 0.5 - new_h / 2.0;
        let sx = ox * cos - oy * sin + w / 2.0;
        let sy = ox * sin + oy * cos + h / 2.0;
        if sx < 0.0 || sy < 0.0 || sx >= w || sy >= h {
            TRANSPARENT
        } else {
            *img.get_pixel(sx as u32, sy as u32)
        }
    })
}

/// Blends `img` with `background` using the luminance of `img` as mask:
/// dark QR pixels stay, light ones let the background through.
///
/// The background is stretched to the QR canvas first.
pub fn composite_background(img: &RgbaImage, background: &RgbaImage) -> RgbaImage {
    let bg = imageops::resize(background, img.width(), img.height(), FilterType::CatmullRom);
    ImageBuffer::from_fn(img.width(), img.height(), |x, y| {
        let qr = img.get_pixel(x, y);
        let back = bg.get_pixel(x, y);
        let mask = luminance(qr);
        let mut out = *qr;
        for c in 0..4 {
            out[c] = mix(qr[c], back[c], mask);
        }
        out
    })
}

/// ITU-R 601-2 luma, as used for greyscale conversion.
pub fn luminance(px: &Rgba<u8>) -> u8 {
    let [r, g, b, _] = px.0;
    ((u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114 + 500) / 1000) as u8
}

// `dst` towards `src` by `a`/255.
fn mix(dst: u8, src: u8, a: u8) -> u8 {
    let a = u32::from(a);
    ((u32::from(src) * a + u32::from(dst) * (255 - a) + 127) / 255) as u8
}

// Porter-Duff "source over destination".
fn alpha_over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let sa = f32::from(src[3]) / 255.0;
    let da = f32::from(dst[3]) / 255.0;
    let oa = sa + da * (1.0 - sa);
    if oa <= 0.0 {
        return TRANSPARENT;
    }
    let channel = |c: usize| {
        let v = (f32::from(src[c]) * sa + f32::from(dst[c]) * da * (1.0 - sa)) / oa;
        v.round().clamp(0.0, 255.0) as u8
    };
    Rgba([channel(0), channel(1), channel(2), (oa * 255.0).round() as u8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{QrcodeEncoder, SymbolEncoder};
    use crate::helper::render_grid;
    use crate::options::{ErrorCorrection, Rgb};

    fn base() -> RgbaImage {
        let grid = QrcodeEncoder.encode("https://example.com", ErrorCorrection::Medium).unwrap();
        render_grid(&grid, 5, 4, Rgb::BLACK, Rgb::WHITE)
    }

    fn solid(w: u32, h: u32, px: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(px))
    }

    #[test]
    fn test_all_toggles_off_is_identity() {
        let img = base();
        assert_eq!(apply(img.clone(), &RenderOptions::default()), img);
    }

    #[test]
    fn test_full_turn_keeps_bounds() {
        let img = base();
        let zero = apply(img.clone(), &RenderOptions::default());
        let full = apply(
            img,
            &RenderOptions {
                rotation_degrees: 360,
                ..RenderOptions::default()
            },
        );
        assert_eq!(full.dimensions(), zero.dimensions());
    }

    #[test]
    fn test_round_corners_is_idempotent() {
        let mut once = base();
        round_corners(&mut once, CORNER_RADIUS);
        let mut twice = once.clone();
        round_corners(&mut twice, CORNER_RADIUS);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_round_corners_masks_only_corners() {
        let mut img = solid(100, 80, [10, 20, 30, 255]);
        round_corners(&mut img, CORNER_RADIUS);
        for (x, y) in [(0, 0), (99, 0), (0, 79), (99, 79)] {
            assert_eq!(img.get_pixel(x, y)[3], 0, "corner ({}, {}) still opaque", x, y);
        }
        // Edge midpoints and the inner corner of each square stay.
        for (x, y) in [(50, 0), (0, 40), (19, 19), (80, 60), (50, 40)] {
            assert_eq!(img.get_pixel(x, y)[3], 255);
        }
        assert_eq!(img.get_pixel(0, 0).0[..3], [10, 20, 30]);
    }

    #[test]
    fn test_shadow_tints_transparent_pixels_only() {
        let mut img = solid(4, 4, [255, 255, 255, 255]);
        img.put_pixel(0, 0, TRANSPARENT);
        let shaded = apply_shadow(&img);
        assert_eq!(*shaded.get_pixel(0, 0), Rgba([0, 0, 0, SHADOW_ALPHA]));
        assert_eq!(*shaded.get_pixel(2, 2), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_quarter_turns_are_exact() {
        let mut img = solid(30, 10, [0, 0, 0, 255]);
        img.put_pixel(29, 0, Rgba([255, 0, 0, 255]));

        let ccw = rotate(&img, 90);
        assert_eq!(ccw.dimensions(), (10, 30));
        // Counter-clockwise: the top-right corner moves to the top-left.
        assert_eq!(*ccw.get_pixel(0, 0), Rgba([255, 0, 0, 255]));

        assert_eq!(rotate(&img, 180).dimensions(), (30, 10));
        assert_eq!(rotate(&img, 270).dimensions(), (10, 30));
    }

    #[test]
    fn test_oblique_rotation_expands_canvas() {
        let img = solid(100, 100, [0, 0, 0, 255]);
        let turned = rotate(&img, 45);
        assert_eq!(turned.dimensions(), (142, 142));
        assert_eq!(*turned.get_pixel(0, 0), TRANSPARENT);
        assert_eq!(*turned.get_pixel(71, 71), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_logo_is_pasted_at_centre() {
        let img = base();
        let logo = solid(10, 10, [255, 0, 0, 255]);
        let out = apply(
            img.clone(),
            &RenderOptions {
                logo: Some(logo),
                ..RenderOptions::default()
            },
        );
        let (w, h) = out.dimensions();
        assert_eq!(*out.get_pixel(w / 2, h / 2), Rgba([255, 0, 0, 255]));
        assert_eq!(*out.get_pixel(0, 0), *img.get_pixel(0, 0));
    }

    #[test]
    fn test_transparent_logo_leaves_image_untouched() {
        let img = base();
        let mut out = img.clone();
        paste_centered(&mut out, &solid(8, 8, [255, 0, 0, 0]), LOGO_SIZE);
        assert_eq!(out, img);
    }

    #[test]
    fn test_logo_larger_than_canvas_is_clipped() {
        let mut img = solid(20, 20, [255, 255, 255, 255]);
        paste_centered(&mut img, &solid(5, 5, [0, 255, 0, 255]), LOGO_SIZE);
        assert!(img.pixels().all(|p| *p == Rgba([0, 255, 0, 255])));
    }

    #[test]
    fn test_background_shows_through_light_pixels() {
        let mut img = solid(2, 1, [255, 255, 255, 255]);
        img.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
        let bg = solid(7, 7, [0, 0, 255, 255]);
        let out = composite_background(&img, &bg);
        assert_eq!(*out.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
        assert_eq!(*out.get_pixel(1, 0), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_icon_stays_on_top_of_other_effects() {
        let img = base();
        let icon = solid(3, 3, [0, 200, 0, 255]);
        let out = apply(
            img.clone(),
            &RenderOptions {
                rotation_degrees: 30,
                shadow: true,
                rounded: true,
                background: Some(solid(5, 5, [40, 40, 40, 255])),
                icon: Some(icon),
                ..RenderOptions::default()
            },
        );
        let (w, h) = out.dimensions();
        assert!(w > img.width());
        assert_eq!(*out.get_pixel(w / 2, h / 2), Rgba([0, 200, 0, 255]));
    }

    #[test]
    fn test_render_3d_turns_45_degrees() {
        let img = base();
        let out = render_3d(&img);
        assert!(out.width() > img.width());
        assert_eq!(out.width(), out.height());
        assert_eq!(out, rotate(&img, 45));
    }

    #[test]
    fn test_luminance_weights() {
        assert_eq!(luminance(&Rgba([255, 255, 255, 0])), 255);
        assert_eq!(luminance(&Rgba([0, 0, 0, 255])), 0);
        assert_eq!(luminance(&Rgba([255, 0, 0, 255])), 76);
    }
}
