//! Fire sprite atlas: a 4×4 grid of flame frames played back over a particle's life.

use std::path::Path;

use anyhow::{Context, Result};
use glam::Vec2;

/// Frames per atlas row/column.
pub const ATLAS_GRID: u32 = 4;
pub const ATLAS_FRAMES: u32 = ATLAS_GRID * ATLAS_GRID;

/// Edge length of the generated fallback atlas.
pub const PROCEDURAL_SIZE: u32 = 256;

/// Frame index for a life fraction in `[0, 1]`.
///
/// A fraction of exactly 1 would map past the last frame, so the result is clamped to 15.
#[inline]
pub fn atlas_frame(percent: f32) -> u32 {
    let p = if percent.is_finite() { percent.clamp(0.0, 1.0) } else { 0.0 };
    ((ATLAS_FRAMES as f32 * p).floor() as u32).min(ATLAS_FRAMES - 1)
}

/// UV of the bottom-left corner of `frame`'s cell.
///
/// Frame 0 is the top-left cell; frames advance left to right, then downwards.
#[inline]
pub fn frame_uv_offset(frame: u32) -> Vec2 {
    let g = ATLAS_GRID as f32;
    let col = (frame % ATLAS_GRID) as f32;
    let row = (frame / ATLAS_GRID) as f32;
    Vec2::new(col / g, 0.75 - row / g)
}

/// Maps a quad UV in `[0, 1]²` into the cell for `percent` of the particle's life.
#[inline]
pub fn atlas_uv(uv: Vec2, percent: f32) -> Vec2 {
    uv / ATLAS_GRID as f32 + frame_uv_offset(atlas_frame(percent))
}

/// Decoded RGBA8 atlas, rows stored bottom-up.
///
/// Storing the bottom row first lets the shader use `v = 0` for the bottom of
/// the image, matching the particle UV convention.
#[derive(Debug, Clone, PartialEq)]
pub struct AtlasImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl AtlasImage {
    /// Decodes a PNG or JPEG file.
    pub fn load(path: &Path) -> Result<Self> {
        let img = image::open(path)
            .with_context(|| format!("failed to decode atlas image {}", path.display()))?;

        let rgba = img.flipv().to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            anyhow::bail!("atlas image {} is empty", path.display());
        }

        log::info!("loaded fire atlas {} ({width}x{height})", path.display());
        Ok(Self {
            width,
            height,
            rgba: rgba.into_raw(),
        })
    }

    /// Generated atlas of soft blobs that shrink and drift upward frame by frame.
    pub fn procedural(size: u32) -> Self {
        let size = size.max(ATLAS_GRID);
        let mut rgba = Vec::with_capacity((size * size * 4) as usize);

        for y in 0..size {
            for x in 0..size {
                let v = (procedural_texel(x, y, size) * 255.0).round() as u8;
                rgba.extend_from_slice(&[v, v, v, 255]);
            }
        }

        Self {
            width: size,
            height: size,
            rgba,
        }
    }

    /// Loads `path` when given, falling back to the procedural atlas on any failure.
    pub fn load_or_procedural(path: Option<&Path>) -> Self {
        match path {
            Some(p) => match Self::load(p) {
                Ok(img) => img,
                Err(err) => {
                    log::warn!("{err:#}; using procedural atlas");
                    Self::procedural(PROCEDURAL_SIZE)
                }
            },
            None => {
                log::info!("no atlas configured; using procedural atlas");
                Self::procedural(PROCEDURAL_SIZE)
            }
        }
    }

    /// Bytes per row as uploaded.
    #[inline]
    pub fn bytes_per_row(&self) -> u32 {
        self.width * 4
    }
}

/// Brightness in `[0, 1]` of texel `(x, y)` (y counted from the bottom) in a `size`² atlas.
fn procedural_texel(x: u32, y: u32, size: u32) -> f32 {
    let cell = size as f32 / ATLAS_GRID as f32;
    let col = ((x as f32 / cell) as u32).min(ATLAS_GRID - 1);
    let row_from_bottom = ((y as f32 / cell) as u32).min(ATLAS_GRID - 1);
    let frame = col + (ATLAS_GRID - 1 - row_from_bottom) * ATLAS_GRID;

    // Cell-local coordinates in [-1, 1].
    let u = ((x as f32 + 0.5) - col as f32 * cell) / cell * 2.0 - 1.0;
    let v = ((y as f32 + 0.5) - row_from_bottom as f32 * cell) / cell * 2.0 - 1.0;

    let t = frame as f32 / (ATLAS_FRAMES - 1) as f32;
    let radius = 0.9 - 0.5 * t;
    let lift = 0.3 * t;

    // Flame-ish: narrower horizontally.
    let d = ((u * 1.4).powi(2) + (v - lift).powi(2)).sqrt() / radius;
    let falloff = (1.0 - d).clamp(0.0, 1.0);
    falloff * falloff * (1.0 - 0.4 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    // ── frame selection ───────────────────────────────────────────────────

    #[test]
    fn frame_advances_every_sixteenth() {
        assert_eq!(atlas_frame(0.0), 0);
        assert_eq!(atlas_frame(0.0624), 0);
        assert_eq!(atlas_frame(0.0626), 1);
        assert_eq!(atlas_frame(0.5), 8);
        assert_eq!(atlas_frame(0.99), 15);
    }

    #[test]
    fn frame_is_clamped() {
        assert_eq!(atlas_frame(1.0), 15);
        assert_eq!(atlas_frame(3.0), 15);
        assert_eq!(atlas_frame(-1.0), 0);
        assert_eq!(atlas_frame(f32::NAN), 0);
    }

    // ── uv mapping ────────────────────────────────────────────────────────

    #[test]
    fn first_frame_is_top_left_cell() {
        assert_eq!(frame_uv_offset(0), Vec2::new(0.0, 0.75));
        assert_eq!(frame_uv_offset(3), Vec2::new(0.75, 0.75));
        assert_eq!(frame_uv_offset(4), Vec2::new(0.0, 0.5));
        assert_eq!(frame_uv_offset(15), Vec2::new(0.75, 0.0));
    }

    #[test]
    fn atlas_uv_stays_inside_cell() {
        let lo = atlas_uv(Vec2::ZERO, 0.3);
        let hi = atlas_uv(Vec2::ONE, 0.3);
        // 0.3 -> frame 4: second row, first column.
        assert!(lo.abs_diff_eq(Vec2::new(0.0, 0.5), EPS));
        assert!(hi.abs_diff_eq(Vec2::new(0.25, 0.75), EPS));
    }

    // ── procedural atlas ──────────────────────────────────────────────────

    #[test]
    fn procedural_has_expected_shape() {
        let img = AtlasImage::procedural(64);
        assert_eq!((img.width, img.height), (64, 64));
        assert_eq!(img.rgba.len(), 64 * 64 * 4);
        assert_eq!(img.bytes_per_row(), 256);
        assert!(img.rgba.chunks_exact(4).all(|p| p[3] == 255));
    }

    #[test]
    fn procedural_size_is_at_least_one_texel_per_cell() {
        let img = AtlasImage::procedural(1);
        assert_eq!(img.width, ATLAS_GRID);
    }

    #[test]
    fn procedural_cells_are_bright_in_the_middle_and_dark_at_edges() {
        let size = 64;
        let cell = size / ATLAS_GRID;
        // Frame 0 lives in the top-left cell, i.e. the last rows bottom-up.
        let cx = cell / 2;
        let cy = size - cell / 2;
        assert!(procedural_texel(cx, cy, size) > 0.5);
        assert_eq!(procedural_texel(0, size - 1, size), 0.0);
    }

    #[test]
    fn procedural_frames_dim_over_life() {
        let size = 64;
        let cell = size / ATLAS_GRID;
        let center = |frame: u32| {
            let col = frame % ATLAS_GRID;
            let row_from_bottom = ATLAS_GRID - 1 - frame / ATLAS_GRID;
            let (x, y) = (col * cell + cell / 2, row_from_bottom * cell + cell / 2);
            (0..cell / 2).map(|dy| procedural_texel(x, y + dy, size)).sum::<f32>()
        };
        assert!(center(0) > center(15));
    }

    // ── loading ───────────────────────────────────────────────────────────

    #[test]
    fn missing_file_falls_back_to_procedural() {
        let img = AtlasImage::load_or_procedural(Some(Path::new("/nonexistent/fire.png")));
        assert_eq!(img, AtlasImage::procedural(PROCEDURAL_SIZE));
    }

    #[test]
    fn load_flips_rows() {
        let dir = std::env::temp_dir().join(format!("kindle-atlas-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("two_rows.png");

        // Top row red, bottom row blue.
        let mut src = image::RgbaImage::new(1, 2);
        src.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        src.put_pixel(0, 1, image::Rgba([0, 0, 255, 255]));
        src.save(&path).unwrap();

        let img = AtlasImage::load(&path).unwrap();
        assert_eq!(&img.rgba[0..4], &[0, 0, 255, 255]);
        assert_eq!(&img.rgba[4..8], &[255, 0, 0, 255]);

        std::fs::remove_dir_all(&dir).ok();
    }
}
