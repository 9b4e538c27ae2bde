//! Renderer boundary: the material description and the `Renderer` trait.
//!
//! The simulation never shades anything itself. Each frame it hands a
//! [`Mesh`] plus a [`Material`] to whatever implements [`Renderer`]; the
//! renderer only reads them.

use crate::color::Srgb;
use crate::error::EngineError;
use crate::mesh::Mesh;
use serde::{Deserialize, Serialize};

/// Transmission-style material settings for the liquid surface.
///
/// Defaults reproduce the reference look: a thin, highly transmissive,
/// metallic, iridescent skin over vertex colors on a light background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub transmission: f32,
    pub thickness: f32,
    pub roughness: f32,
    pub metalness: f32,
    pub chromatic_aberration: f32,
    pub anisotropy: f32,
    pub env_map_intensity: f32,
    pub distortion: f32,
    pub distortion_scale: f32,
    pub temporal_distortion: f32,
    pub iridescence: f32,
    pub iridescence_ior: f32,
    pub iridescence_thickness_range: [f32; 2],
    /// Whether the renderer should use the mesh's vertex colors.
    pub vertex_colors: bool,
    pub background: Srgb,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            transmission: 0.925,
            thickness: 0.05,
            roughness: 0.04,
            metalness: 0.85,
            chromatic_aberration: 1.0,
            anisotropy: 0.05,
            env_map_intensity: 0.65,
            distortion: 1.0,
            distortion_scale: 0.95,
            temporal_distortion: 0.05,
            iridescence: 0.94,
            iridescence_ior: 1.0,
            iridescence_thickness_range: [0.0, 1400.0],
            vertex_colors: true,
            background: Srgb::new(240.0 / 255.0, 240.0 / 255.0, 240.0 / 255.0),
        }
    }
}

/// Consumer of one mesh per frame.
pub trait Renderer {
    /// Draw (or otherwise consume) the frame's mesh. Must not retain borrows.
    fn present(&mut self, mesh: &Mesh, material: &Material) -> Result<(), EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_material_matches_reference_look() {
        let m = Material::default();
        assert!((m.transmission - 0.925).abs() < f32::EPSILON);
        assert!((m.metalness - 0.85).abs() < f32::EPSILON);
        assert_eq!(m.iridescence_thickness_range, [0.0, 1400.0]);
        assert_eq!(m.background.to_hex(), "#f0f0f0");
        assert!(m.vertex_colors);
    }

    #[test]
    fn material_deserializes_partial_json_with_defaults() {
        let m: Material = serde_json::from_str(r#"{"roughness": 0.5, "background": "black"}"#)
            .unwrap();
        assert!((m.roughness - 0.5).abs() < f32::EPSILON);
        assert_eq!(m.background.to_hex(), "#000000");
        assert!((m.iridescence - 0.94).abs() < f32::EPSILON);
    }

    #[test]
    fn renderer_trait_is_object_safe() {
        struct Counter(usize);
        impl Renderer for Counter {
            fn present(&mut self, _mesh: &Mesh, _material: &Material) -> Result<(), EngineError> {
                self.0 += 1;
                Ok(())
            }
        }
        let mut counter = Counter(0);
        let renderer: &mut dyn Renderer = &mut counter;
        renderer
            .present(&Mesh::default(), &Material::default())
            .unwrap();
        assert_eq!(counter.0, 1);
    }
}
