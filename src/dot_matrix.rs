//! # Dot-Matrix Sprite Rendering
//!
//! Turns a sprite into a grid of round "LED" dots on a dark background, the
//! look of the widget's image page.
//!
//! ## Pipeline
//! 1. **Downsample**: bilinear resize of the sprite to exactly `grid_width × grid_height`.
//!    This is lossy on purpose; the silhouette survives, pixel detail does not.
//! 2. **Threshold**: each grid cell is lit when its alpha is at least
//!    `alpha_threshold` and its unweighted brightness `(r + g + b) / 3` is
//!    strictly greater than `brightness_threshold`.
//! 3. **Draw**: a canvas of `grid * cell_size` pixels is filled with the
//!    background, and every lit cell gets an anti-aliased dot of radius
//!    `0.4 * cell_size` at its centre.
//!
//! Output size depends only on the parameters. Identical inputs always give
//! byte-identical images.

use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use std::path::Path;
use thiserror::Error;

/// Widget background, `#1B1B1D`.
pub const DEFAULT_BACKGROUND: Rgba<u8> = Rgba([0x1B, 0x1B, 0x1D, 0xFF]);

/// Dot colour, opaque white.
pub const DEFAULT_DOT: Rgba<u8> = Rgba([0xFF, 0xFF, 0xFF, 0xFF]);

/// Dot radius as a fraction of the cell size.
const DOT_RADIUS_RATIO: f32 = 0.4;

/// Largest side of a scaled render.
pub const MAX_SCALED_SIDE: u32 = 16_384;

/// Errors from dot-matrix rendering and sprite encoding.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Grid and cell dimensions must be positive and the canvas must fit in `u32`
    #[error("invalid dot-matrix dimensions: grid {grid_width}x{grid_height}, cell {cell_size}")]
    InvalidDimensions {
        grid_width: u32,
        grid_height: u32,
        cell_size: u32,
    },

    /// Output scale must be finite, positive, and keep each side within [`MAX_SCALED_SIDE`]
    #[error("invalid output scale: {0}")]
    InvalidScale(f32),

    /// Sprite decode or PNG encode failed
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Writing the PNG file failed
    #[error("image IO: {0}")]
    Io(#[from] std::io::Error),
}

/// Parameters of the dot-matrix transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DotMatrixParams {
    /// Columns of the downsampled grid
    pub grid_width: u32,
    /// Rows of the downsampled grid
    pub grid_height: u32,
    /// Output pixels per grid cell, in both directions
    pub cell_size: u32,
    /// Canvas fill colour
    pub background: Rgba<u8>,
    /// Dot colour
    pub dot_color: Rgba<u8>,
    /// Cells at or below this brightness stay dark
    pub brightness_threshold: u8,
    /// Cells below this alpha are treated as transparent
    pub alpha_threshold: u8,
}

impl Default for DotMatrixParams {
    fn default() -> Self {
        Self {
            grid_width: 32,
            grid_height: 32,
            cell_size: 20,
            background: DEFAULT_BACKGROUND,
            dot_color: DEFAULT_DOT,
            brightness_threshold: 50,
            alpha_threshold: 64,
        }
    }
}

impl DotMatrixParams {
    /// The 50×50 grid with 5 px cells used for the home-screen widget (250×250 output).
    pub fn widget() -> Self {
        Self {
            grid_width: 50,
            grid_height: 50,
            cell_size: 5,
            ..Self::default()
        }
    }

    /// Output canvas size, or `InvalidDimensions` for zero or overflowing sizes.
    pub fn canvas_size(&self) -> Result<(u32, u32), RenderError> {
        let invalid = || RenderError::InvalidDimensions {
            grid_width: self.grid_width,
            grid_height: self.grid_height,
            cell_size: self.cell_size,
        };

        if self.grid_width == 0 || self.grid_height == 0 || self.cell_size == 0 {
            return Err(invalid());
        }

        let width = self.grid_width.checked_mul(self.cell_size).ok_or_else(invalid)?;
        let height = self.grid_height.checked_mul(self.cell_size).ok_or_else(invalid)?;
        Ok((width, height))
    }

    /// Whether a downsampled pixel becomes a dot.
    pub fn is_lit(&self, pixel: &Rgba<u8>) -> bool {
        let [r, g, b, a] = pixel.0;
        if a < self.alpha_threshold {
            return false;
        }
        let brightness = (u16::from(r) + u16::from(g) + u16::from(b)) / 3;
        brightness > u16::from(self.brightness_threshold)
    }
}

/// Render `src` as a dot-matrix image of `grid * cell_size` pixels.
///
/// # Example
/// ```
/// use image::{DynamicImage, Rgba, RgbaImage};
/// use pokemon_matrix_lib::dot_matrix::{render, DotMatrixParams};
///
/// let sprite = DynamicImage::ImageRgba8(RgbaImage::from_pixel(96, 96, Rgba([255, 255, 255, 255])));
/// let out = render(&sprite, &DotMatrixParams::widget()).unwrap();
/// assert_eq!(out.dimensions(), (250, 250));
/// ```
pub fn render(src: &DynamicImage, params: &DotMatrixParams) -> Result<RgbaImage, RenderError> {
    let (width, height) = params.canvas_size()?;

    let grid = src
        .resize_exact(params.grid_width, params.grid_height, FilterType::Triangle)
        .to_rgba8();

    let mut canvas = RgbaImage::from_pixel(width, height, params.background);
    let radius = params.cell_size as f32 * DOT_RADIUS_RATIO;
    let half_cell = params.cell_size as f32 / 2.0;

    for (x, y, pixel) in grid.enumerate_pixels() {
        if !params.is_lit(pixel) {
            continue;
        }
        let cx = (x * params.cell_size) as f32 + half_cell;
        let cy = (y * params.cell_size) as f32 + half_cell;
        draw_dot(&mut canvas, cx, cy, radius, params.dot_color);
    }

    Ok(canvas)
}

/// [`render`] followed by a nearest-neighbour resize by `output_scale`.
///
/// A scale of exactly 1.0 returns the unscaled render. Nearest-neighbour keeps
/// the dot edges crisp at larger sizes; each side is at least one pixel.
pub fn render_scaled(
    src: &DynamicImage,
    params: &DotMatrixParams,
    output_scale: f32,
) -> Result<RgbaImage, RenderError> {
    if !output_scale.is_finite() || output_scale <= 0.0 {
        return Err(RenderError::InvalidScale(output_scale));
    }

    let (new_width, new_height) = scaled_size(params.canvas_size()?, output_scale)?;
    let base = render(src, params)?;
    if output_scale == 1.0 {
        return Ok(base);
    }

    Ok(imageops::resize(
        &base,
        new_width,
        new_height,
        FilterType::Nearest,
    ))
}

/// Size of a `(width, height)` canvas after scaling by `output_scale`.
pub fn scaled_size((width, height): (u32, u32), output_scale: f32) -> Result<(u32, u32), RenderError> {
    if !output_scale.is_finite() || output_scale <= 0.0 {
        return Err(RenderError::InvalidScale(output_scale));
    }
    if output_scale == 1.0 {
        return Ok((width, height));
    }

    let side = |len: u32| {
        let scaled = (len as f32 * output_scale).floor();
        if scaled > MAX_SCALED_SIDE as f32 {
            Err(RenderError::InvalidScale(output_scale))
        } else {
            Ok((scaled as u32).max(1))
        }
    };
    Ok((side(width)?, side(height)?))
}

/// Decode downloaded sprite bytes (PNG in practice, any supported format accepted).
pub fn decode_sprite(bytes: &[u8]) -> Result<DynamicImage, RenderError> {
    Ok(image::load_from_memory(bytes)?)
}

/// Encode an RGBA image as PNG bytes.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer).write_image(
        img.as_raw(),
        img.width(),
        img.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(buffer)
}

/// Write an RGBA image to `path` as PNG.
pub fn save_png<P: AsRef<Path>>(img: &RgbaImage, path: P) -> Result<(), RenderError> {
    let bytes = encode_png(img)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Composite a filled, anti-aliased circle onto the canvas.
///
/// Coverage is the signed distance from each pixel centre to the circle edge,
/// clamped to `[0, 1]`, giving a one-pixel soft rim.
fn draw_dot(canvas: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: Rgba<u8>) {
    let reach = radius + 0.5;
    let x0 = (cx - reach).floor().max(0.0) as u32;
    let y0 = (cy - reach).floor().max(0.0) as u32;
    let x1 = ((cx + reach).ceil() as u32).min(canvas.width());
    let y1 = ((cy + reach).ceil() as u32).min(canvas.height());

    for py in y0..y1 {
        for px in x0..x1 {
            let dx = px as f32 + 0.5 - cx;
            let dy = py as f32 + 0.5 - cy;
            let coverage = (reach - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0);
            if coverage > 0.0 {
                let dst = canvas.get_pixel_mut(px, py);
                *dst = blend(*dst, color, coverage);
            }
        }
    }
}

/// Source-over blend of `src` onto `dst` with extra `coverage`.
fn blend(dst: Rgba<u8>, src: Rgba<u8>, coverage: f32) -> Rgba<u8> {
    let alpha = coverage * f32::from(src.0[3]) / 255.0;
    if alpha >= 1.0 {
        return src;
    }

    let mix = |s: u8, d: u8| (f32::from(s) * alpha + f32::from(d) * (1.0 - alpha)).round() as u8;
    Rgba([
        mix(src.0[0], dst.0[0]),
        mix(src.0[1], dst.0[1]),
        mix(src.0[2], dst.0[2]),
        (255.0 * alpha + f32::from(dst.0[3]) * (1.0 - alpha)).round() as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(rgba)))
    }

    fn is_background(img: &RgbaImage, params: &DotMatrixParams) -> bool {
        img.pixels().all(|p| *p == params.background)
    }

    #[test]
    fn test_white_sprite_lights_every_cell() {
        let params = DotMatrixParams::widget();
        let out = render(&solid(50, 50, [255, 255, 255, 255]), &params).unwrap();

        assert_eq!(out.dimensions(), (250, 250));
        for gy in 0..50 {
            for gx in 0..50 {
                // Pixel (2, 2) of a 5 px cell sits on the dot centre
                let centre = out.get_pixel(gx * 5 + 2, gy * 5 + 2);
                assert_eq!(*centre, DEFAULT_DOT, "cell ({gx}, {gy}) has no dot");
                // Cell corners stay background
                let corner = out.get_pixel(gx * 5, gy * 5);
                assert_eq!(*corner, DEFAULT_BACKGROUND);
            }
        }
    }

    #[test]
    fn test_output_size_ignores_source_size() {
        let params = DotMatrixParams {
            grid_width: 18,
            grid_height: 12,
            cell_size: 7,
            ..DotMatrixParams::default()
        };
        for (w, h) in [(1, 1), (96, 96), (475, 20), (3, 900)] {
            let out = render(&solid(w, h, [200, 10, 10, 255]), &params).unwrap();
            assert_eq!(out.dimensions(), (126, 84));
        }
    }

    #[test]
    fn test_transparent_sprite_renders_blank() {
        let params = DotMatrixParams::default();
        let out = render(&solid(96, 96, [255, 255, 255, 0]), &params).unwrap();
        assert_eq!(out.dimensions(), (640, 640));
        assert!(is_background(&out, &params));
    }

    #[test]
    fn test_alpha_threshold() {
        let params = DotMatrixParams::default();
        assert!(!params.is_lit(&Rgba([255, 255, 255, 63])));
        assert!(params.is_lit(&Rgba([255, 255, 255, 64])));
    }

    #[test]
    fn test_brightness_threshold_is_strict() {
        let params = DotMatrixParams {
            grid_width: 2,
            grid_height: 1,
            cell_size: 10,
            ..DotMatrixParams::default()
        };

        // Grid-sized source: no resampling, thresholds see the exact values
        let mut src = RgbaImage::new(2, 1);
        src.put_pixel(0, 0, Rgba([50, 50, 50, 255]));
        src.put_pixel(1, 0, Rgba([51, 51, 51, 255]));
        let out = render(&DynamicImage::ImageRgba8(src), &params).unwrap();

        assert_eq!(*out.get_pixel(5, 5), params.background);
        assert_eq!(*out.get_pixel(15, 5), params.dot_color);
    }

    #[test]
    fn test_brightness_is_unweighted_average() {
        let params = DotMatrixParams::default();
        // Pure blue is dark under luma weighting but averages to 85 here
        assert!(params.is_lit(&Rgba([0, 0, 255, 255])));
        // (51 + 50 + 51) / 3 = 50 after integer division
        assert!(!params.is_lit(&Rgba([51, 50, 51, 255])));
    }

    #[test]
    fn test_render_is_deterministic() {
        let mut src = RgbaImage::new(40, 30);
        for (x, y, p) in src.enumerate_pixels_mut() {
            *p = Rgba([(x * 6) as u8, (y * 8) as u8, ((x + y) * 3) as u8, (x * y) as u8]);
        }
        let src = DynamicImage::ImageRgba8(src);
        let params = DotMatrixParams::default();

        let first = render(&src, &params).unwrap();
        let second = render(&src, &params).unwrap();
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn test_dot_edges_are_anti_aliased() {
        let params = DotMatrixParams {
            grid_width: 1,
            grid_height: 1,
            cell_size: 20,
            ..DotMatrixParams::default()
        };
        let out = render(&solid(1, 1, [255, 255, 255, 255]), &params).unwrap();

        let partial = out
            .pixels()
            .filter(|p| **p != params.background && **p != params.dot_color)
            .count();
        assert!(partial > 0, "expected blended rim pixels");
    }

    #[test]
    fn test_invalid_dimensions_rejected() {
        let src = solid(4, 4, [255, 255, 255, 255]);
        for (gw, gh, cs) in [(0, 10, 5), (10, 0, 5), (10, 10, 0), (u32::MAX, 1, 2)] {
            let params = DotMatrixParams {
                grid_width: gw,
                grid_height: gh,
                cell_size: cs,
                ..DotMatrixParams::default()
            };
            assert!(matches!(
                render(&src, &params),
                Err(RenderError::InvalidDimensions { .. })
            ));
        }
    }

    #[test]
    fn test_unit_scale_matches_render() {
        let src = solid(30, 30, [180, 180, 180, 255]);
        let params = DotMatrixParams::widget();
        let plain = render(&src, &params).unwrap();
        let scaled = render_scaled(&src, &params, 1.0).unwrap();
        assert_eq!(plain.as_raw(), scaled.as_raw());
    }

    #[test]
    fn test_scaled_output_uses_nearest_neighbour() {
        let src = solid(30, 30, [180, 180, 180, 255]);
        let params = DotMatrixParams::widget();
        let scaled = render_scaled(&src, &params, 2.0).unwrap();
        assert_eq!(scaled.dimensions(), (500, 500));

        // Only colours already present in the unscaled render appear
        let plain = render(&src, &params).unwrap();
        let palette: std::collections::HashSet<_> = plain.pixels().copied().collect();
        assert!(scaled.pixels().all(|p| palette.contains(p)));

        let tiny = render_scaled(&src, &params, 0.001).unwrap();
        assert_eq!(tiny.dimensions(), (1, 1));
    }

    #[test]
    fn test_invalid_scale_rejected() {
        let src = solid(4, 4, [255, 255, 255, 255]);
        let params = DotMatrixParams::default();
        for scale in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                render_scaled(&src, &params, scale),
                Err(RenderError::InvalidScale(_))
            ));
        }
    }

    #[test]
    fn test_huge_scale_rejected() {
        let src = solid(4, 4, [255, 255, 255, 255]);
        let params = DotMatrixParams::widget();
        for scale in [1.0e9, f32::MAX, 66.0] {
            assert!(matches!(
                render_scaled(&src, &params, scale),
                Err(RenderError::InvalidScale(_))
            ));
        }

        // 250 * 65.5 = 16375 stays within the limit
        assert_eq!(scaled_size((250, 250), 65.5).unwrap(), (16_375, 16_375));
        assert_eq!(scaled_size((250, 100), 0.5).unwrap(), (125, 50));
    }

    #[test]
    fn test_png_roundtrip_preserves_pixels() {
        let out = render(&solid(8, 8, [255, 255, 255, 255]), &DotMatrixParams::widget()).unwrap();
        let bytes = encode_png(&out).unwrap();
        let decoded = decode_sprite(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.as_raw(), out.as_raw());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_sprite(b"not a png"),
            Err(RenderError::Image(_))
        ));
    }
}
