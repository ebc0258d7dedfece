//! PNG output for rendered rasters.

use std::path::Path;

use image::RgbaImage;

use crate::error::{ArtError, Result};

use super::Raster;

/// Destination for a finished RGBA8 image.
pub trait ImageSink {
    fn write(&self, width: u32, height: u32, pixels: &[u8], path: &Path) -> Result<()>;
}

/// Writes images as PNG files.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngSink;

impl ImageSink for PngSink {
    fn write(&self, width: u32, height: u32, pixels: &[u8], path: &Path) -> Result<()> {
        let img = RgbaImage::from_raw(width, height, pixels.to_vec()).ok_or_else(|| ArtError::Render {
            message: format!(
                "pixel buffer of {} bytes does not match {}x{} RGBA",
                pixels.len(),
                width,
                height
            ),
        })?;

        img.save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| ArtError::Io {
                path: path.to_path_buf(),
                message: format!("Failed to write PNG: {}", e),
            })?;

        Ok(())
    }
}

/// Write a raster to a PNG file.
pub fn write_png(raster: &Raster, path: &Path) -> Result<()> {
    PngSink.write(raster.width(), raster.height(), raster.pixels(), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_png_sink_round_trip() {
        let pixels = [
            0, 0, 0, 255, //
            255, 255, 255, 255, //
            255, 0, 0, 255, //
            0, 128, 0, 255,
        ];

        let dir = tempdir().unwrap();
        let path = dir.path().join("test.png");
        PngSink.write(2, 2, &pixels, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.width(), 2);
        assert_eq!(img.height(), 2);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(1, 1).0, [0, 128, 0, 255]);
    }

    #[test]
    fn test_png_sink_rejects_short_buffer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.png");
        let result = PngSink.write(2, 2, &[0; 8], &path);
        assert!(matches!(result, Err(ArtError::Render { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn test_png_sink_missing_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        let result = PngSink.write(1, 1, &[1, 2, 3, 255], &path);
        assert!(matches!(result, Err(ArtError::Io { .. })));
    }
}
