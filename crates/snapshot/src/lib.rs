#![deny(unsafe_code)]
//! Headless presentation for liquid-metal meshes.
//!
//! [`SnapshotRenderer`] implements [`Renderer`] by rasterizing every
//! presented mesh in software, keeping the latest frame for inspection or
//! export. [`obj::write_obj`] dumps a mesh as Wavefront OBJ, and with the
//! `png` feature (default on) [`png::write_png`] saves a rendered frame.

pub mod obj;
pub mod raster;

#[cfg(feature = "png")]
pub mod png;

use liquid_metal_core::error::EngineError;
use liquid_metal_core::{Material, Mesh, Renderer, Viewport};
use raster::{draw_mesh, Raster, View};
use tracing::trace;

/// Vertical field of view of the reference camera, in degrees.
const CAMERA_FOV: f32 = 25.0;
/// Distance of the reference camera from the simulation plane.
const CAMERA_DISTANCE: f32 = 5.0;

/// Renderer that rasterizes each frame into an in-memory [`Raster`].
#[derive(Debug, Clone)]
pub struct SnapshotRenderer {
    width: usize,
    height: usize,
    view: View,
    last: Option<Raster>,
    frames: u64,
}

impl SnapshotRenderer {
    /// Creates a renderer framing the same plane area as the reference
    /// perspective camera.
    ///
    /// Returns `EngineError::InvalidDimensions` if either side is zero.
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        let aspect = width as f32 / height as f32;
        let viewport = Viewport::from_perspective(CAMERA_FOV, CAMERA_DISTANCE, aspect);
        Ok(Self {
            width,
            height,
            view: View::new(viewport.height * 0.5),
            last: None,
            frames: 0,
        })
    }

    /// Overrides the visible half-height of the plane.
    pub fn with_half_height(mut self, half_height: f32) -> Self {
        self.view = View::new(half_height);
        self
    }

    /// World-space size of the visible plane, for mapping pointer input.
    pub fn viewport(&self) -> Viewport {
        let h = self.view.half_height * 2.0;
        Viewport::new(h * self.width as f32 / self.height as f32, h)
    }

    /// The most recently rendered frame.
    pub fn last_frame(&self) -> Option<&Raster> {
        self.last.as_ref()
    }

    /// Frames presented so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for SnapshotRenderer {
    fn present(&mut self, mesh: &Mesh, material: &Material) -> Result<(), EngineError> {
        let mut raster = Raster::new(self.width, self.height, material.background)?;
        draw_mesh(&mut raster, mesh, material, &self.view);
        self.frames += 1;
        trace!(
            frame = self.frames,
            covered = raster.covered_pixels(),
            "snapshot rendered"
        );
        self.last = Some(raster);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liquid_metal_metaballs::{extract, sample, Falloff, FieldSource};
    use liquid_metal_core::glam::Vec3;
    use liquid_metal_core::Lattice;

    fn sphere_mesh() -> Mesh {
        let field = sample(
            &[FieldSource::dynamic(Vec3::ZERO, 1.0, 0.8)],
            Lattice::new(24, 1.0).unwrap(),
            Falloff::WyvillCubic,
            false,
        );
        extract(&field, 0.5, 20_000)
    }

    #[test]
    fn new_rejects_zero_size() {
        assert!(matches!(
            SnapshotRenderer::new(0, 10),
            Err(EngineError::InvalidDimensions)
        ));
    }

    #[test]
    fn viewport_matches_reference_camera() {
        let renderer = SnapshotRenderer::new(200, 100).unwrap();
        let v = renderer.viewport();
        let expected = Viewport::from_perspective(25.0, 5.0, 2.0);
        assert!((v.height - expected.height).abs() < 1e-5);
        assert!((v.width - expected.width).abs() < 1e-5);
    }

    #[test]
    fn sphere_renders_centered_blob() {
        let mut renderer = SnapshotRenderer::new(64, 64).unwrap();
        renderer
            .present(&sphere_mesh(), &Material::default())
            .unwrap();
        let frame = renderer.last_frame().unwrap();
        assert!(frame.is_covered(32, 32));
        assert!(!frame.is_covered(0, 0));
        assert!(!frame.is_covered(63, 63));
        assert_eq!(renderer.frames(), 1);
    }

    #[test]
    fn each_present_replaces_the_frame() {
        let mut renderer = SnapshotRenderer::new(32, 32).unwrap();
        renderer
            .present(&sphere_mesh(), &Material::default())
            .unwrap();
        renderer
            .present(&Mesh::default(), &Material::default())
            .unwrap();
        assert_eq!(renderer.last_frame().unwrap().covered_pixels(), 0);
        assert_eq!(renderer.frames(), 2);
    }
}
