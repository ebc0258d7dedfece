//! Per-pixel rendering of a concrete tree into an RGBA8 buffer.

use std::thread;

use crate::error::{ArtError, Result};
use crate::generate::ConcreteTree;

use super::eval::evaluate_color;

/// A rendered RGBA8 image, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, `width * height * 4` long.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// RGBA at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let p = &self.pixels[i..i + 4];
        Some([p[0], p[1], p[2], p[3]])
    }
}

/// Map pixel index `i` of `size` to `[-1, 1)`.
pub fn normalize(i: u32, size: u32) -> f32 {
    i as f32 / size as f32 * 2.0 - 1.0
}

/// Map a channel value in `[-1, 1]` to a byte, rounding half up.
///
/// NaN maps to 0.
pub fn channel(v: f32) -> u8 {
    ((v + 1.0) / 2.0 * 255.0 + 0.5).floor().clamp(0.0, 255.0) as u8
}

/// Evaluate `tree` at every pixel.
///
/// With `threads > 1` rows are split into contiguous bands, one per thread.
/// The first evaluation error aborts the render.
pub fn render_raster(tree: &ConcreteTree, width: u32, height: u32, t: f32, threads: usize) -> Result<Raster> {
    if width == 0 || height == 0 {
        return Err(ArtError::Render {
            message: format!("image size must be non-zero, got {}x{}", width, height),
        });
    }

    let row_len = width as usize * 4;
    let mut pixels = vec![0u8; row_len * height as usize];
    let threads = threads.clamp(1, height as usize);

    if threads == 1 {
        render_rows(tree, &mut pixels, 0, width, height, t)?;
    } else {
        let rows_per_band = (height as usize).div_ceil(threads);
        thread::scope(|scope| {
            let handles: Vec<_> = pixels
                .chunks_mut(rows_per_band * row_len)
                .enumerate()
                .map(|(band, chunk)| {
                    let first_row = (band * rows_per_band) as u32;
                    scope.spawn(move || render_rows(tree, chunk, first_row, width, height, t))
                })
                .collect();

            handles.into_iter().try_for_each(|handle| {
                handle.join().unwrap_or_else(|_| {
                    Err(ArtError::Render {
                        message: "render thread panicked".to_string(),
                    })
                })
            })
        })?;
    }

    Ok(Raster {
        width,
        height,
        pixels,
    })
}

fn render_rows(tree: &ConcreteTree, band: &mut [u8], first_row: u32, width: u32, height: u32, t: f32) -> Result<()> {
    for (offset, row) in band.chunks_mut(width as usize * 4).enumerate() {
        let y = normalize(first_row + offset as u32, height);
        for (px, out) in row.chunks_mut(4).enumerate() {
            let x = normalize(px as u32, width);
            let [r, g, b] = evaluate_color(tree.nodes(), tree.root(), x, y, t)?;
            out.copy_from_slice(&[channel(r), channel(g), channel(b), 255]);
        }
    }
    Ok(())
}
