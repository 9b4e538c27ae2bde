//! PNG output of a rendered [`Raster`].
//!
//! Feature-gated behind `png` (default on) so hosts that only need the
//! rasterizer or OBJ export do not pull in the `image` crate.

use crate::raster::Raster;
use liquid_metal_core::error::EngineError;
use std::path::Path;

/// Writes a raster as an RGBA PNG.
///
/// Returns `EngineError::InvalidDimensions` if the raster dimensions overflow
/// `u32`, or `EngineError::Io` on write failure.
pub fn write_png(raster: &Raster, path: &Path) -> Result<(), EngineError> {
    let w = u32::try_from(raster.width()).map_err(|_| EngineError::InvalidDimensions)?;
    let h = u32::try_from(raster.height()).map_err(|_| EngineError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, raster.to_rgba8())
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| EngineError::Io(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use liquid_metal_core::Srgb;

    #[test]
    fn write_png_round_trip() {
        let raster = Raster::new(16, 12, Srgb::new(1.0, 0.0, 0.0)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");

        write_png(&raster, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.width(), 16);
        assert_eq!(img.height(), 12);
        assert_eq!(img.get_pixel(5, 5).0, [255, 0, 0, 255]);
    }

    #[test]
    fn write_png_to_missing_directory_is_io_error() {
        let raster = Raster::new(2, 2, Srgb::new(0.0, 0.0, 0.0)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("frame.png");
        assert!(matches!(write_png(&raster, &path), Err(EngineError::Io(_))));
    }
}
