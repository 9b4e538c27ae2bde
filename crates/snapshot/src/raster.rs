//! Software rasterizer for headless previews.
//!
//! Meshes are projected orthographically onto the `z = 0` plane as seen from
//! +z, depth-tested, and lit with a single directional light. Shading only
//! looks at the material's metalness and roughness; transmission effects are
//! left to real renderers.

use glam::{Vec2, Vec3};
use liquid_metal_core::error::EngineError;
use liquid_metal_core::{Material, Mesh, Srgb};

/// Key light direction (toward the light), upper left in front of the scene.
const LIGHT_DIR: Vec3 = Vec3::new(-0.4, 0.6, 1.0);
const AMBIENT: f32 = 0.25;
/// Base color used when the mesh has no colors or the material ignores them.
const UNCOLORED: Vec3 = Vec3::splat(0.75);

/// Color and depth buffers of one rendered frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    /// Linear RGB, row-major from the top-left pixel.
    pixels: Vec<Vec3>,
    depth: Vec<f32>,
}

impl Raster {
    /// Creates a raster filled with `background`.
    ///
    /// Returns `EngineError::InvalidDimensions` if either side is zero or the
    /// pixel count overflows.
    pub fn new(width: usize, height: usize, background: Srgb) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        let n = width
            .checked_mul(height)
            .ok_or(EngineError::InvalidDimensions)?;
        Ok(Self {
            width,
            height,
            pixels: vec![background.to_linear(); n],
            depth: vec![f32::NEG_INFINITY; n],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// sRGB color at pixel `(x, y)`.
    pub fn pixel(&self, x: usize, y: usize) -> Srgb {
        Srgb::from_linear(self.pixels[y * self.width + x])
    }

    /// Whether any triangle landed on pixel `(x, y)`.
    pub fn is_covered(&self, x: usize, y: usize) -> bool {
        self.depth[y * self.width + x].is_finite()
    }

    /// Number of pixels covered by geometry.
    pub fn covered_pixels(&self) -> usize {
        self.depth.iter().filter(|d| d.is_finite()).count()
    }

    /// RGBA8 buffer, four bytes per pixel with opaque alpha.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&c| {
                let [r, g, b] = Srgb::from_linear(c).to_rgb8();
                [r, g, b, 255u8]
            })
            .collect()
    }
}

/// Orthographic view: world `y` in `[-half_height, half_height]` fills the
/// raster height; `x` is scaled by the raster aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    pub half_height: f32,
}

impl View {
    pub fn new(half_height: f32) -> Self {
        Self { half_height }
    }

    fn half_width(&self, raster: &Raster) -> f32 {
        self.half_height * raster.width as f32 / raster.height as f32
    }

    /// World-space `(x, y)` at the center of pixel `(px, py)`.
    fn pixel_center(&self, raster: &Raster, px: usize, py: usize) -> Vec2 {
        let u = (px as f32 + 0.5) / raster.width as f32;
        let v = (py as f32 + 0.5) / raster.height as f32;
        Vec2::new(
            (u * 2.0 - 1.0) * self.half_width(raster),
            (1.0 - v * 2.0) * self.half_height,
        )
    }

    /// Continuous pixel coordinates of a world point.
    fn to_pixel(&self, raster: &Raster, p: Vec3) -> Vec2 {
        Vec2::new(
            (p.x / self.half_width(raster) * 0.5 + 0.5) * raster.width as f32,
            (0.5 - p.y / self.half_height * 0.5) * raster.height as f32,
        )
    }
}

fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b - a).perp_dot(p - a)
}

/// Draws the front-facing triangles of `mesh` into `raster`.
pub fn draw_mesh(raster: &mut Raster, mesh: &Mesh, material: &Material, view: &View) {
    let colors = mesh.colors().filter(|_| material.vertex_colors);
    let light = LIGHT_DIR.normalize();
    let half = (light + Vec3::Z).normalize();
    let roughness = material.roughness.clamp(0.02, 1.0);
    let shininess = (2.0 / (roughness * roughness) - 2.0).clamp(1.0, 512.0);
    let metalness = material.metalness.clamp(0.0, 1.0);

    for (t, &[ia, ib, ic]) in mesh.triangles().iter().enumerate() {
        let [a, b, c] = mesh.triangle_positions(t);
        let (a2, b2, c2) = (a.truncate(), b.truncate(), c.truncate());
        let area = edge(a2, b2, c2);
        // Back-facing or edge-on.
        if !(area > 0.0) {
            continue;
        }
        let face_normal = (b - a).cross(c - a).normalize_or_zero();

        let lo = view
            .to_pixel(raster, a)
            .min(view.to_pixel(raster, b))
            .min(view.to_pixel(raster, c));
        let hi = view
            .to_pixel(raster, a)
            .max(view.to_pixel(raster, b))
            .max(view.to_pixel(raster, c));
        let x0 = lo.x.floor().max(0.0) as usize;
        let y0 = lo.y.floor().max(0.0) as usize;
        let x1 = (hi.x.ceil().max(0.0) as usize).min(raster.width);
        let y1 = (hi.y.ceil().max(0.0) as usize).min(raster.height);

        for py in y0..y1 {
            for px in x0..x1 {
                let p = view.pixel_center(raster, px, py);
                let wa = edge(b2, c2, p) / area;
                let wb = edge(c2, a2, p) / area;
                let wc = edge(a2, b2, p) / area;
                if wa < 0.0 || wb < 0.0 || wc < 0.0 {
                    continue;
                }
                let z = wa * a.z + wb * b.z + wc * c.z;
                let idx = py * raster.width + px;
                if z <= raster.depth[idx] {
                    continue;
                }

                let normals = mesh.normals();
                let n = (normals[ia as usize] * wa
                    + normals[ib as usize] * wb
                    + normals[ic as usize] * wc)
                    .try_normalize()
                    .unwrap_or(face_normal);
                let base = match colors {
                    Some(cs) => cs[ia as usize] * wa + cs[ib as usize] * wb + cs[ic as usize] * wc,
                    None => UNCOLORED,
                };

                let diffuse = n.dot(light).max(0.0);
                let specular = n.dot(half).max(0.0).powf(shininess);
                let tint = Vec3::ONE.lerp(base, metalness);
                raster.pixels[idx] = base * (AMBIENT + (1.0 - AMBIENT) * diffuse)
                    * (1.0 - 0.5 * metalness)
                    + tint * specular;
                raster.depth[idx] = z;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_facing(z_sign: f32, z: f32, color: Vec3) -> Mesh {
        let mut mesh = Mesh::new(true, false);
        let n = Vec3::Z * z_sign;
        for p in [
            Vec3::new(-0.5, -0.5, z),
            Vec3::new(0.5, -0.5, z),
            Vec3::new(0.5, 0.5, z),
            Vec3::new(-0.5, 0.5, z),
        ] {
            mesh.push_vertex(p, n, Some(color), None);
        }
        if z_sign > 0.0 {
            mesh.push_triangle([0, 1, 2]);
            mesh.push_triangle([0, 2, 3]);
        } else {
            mesh.push_triangle([0, 2, 1]);
            mesh.push_triangle([0, 3, 2]);
        }
        mesh
    }

    fn background() -> Srgb {
        Material::default().background
    }

    #[test]
    fn new_rejects_zero_dimensions() {
        assert!(matches!(
            Raster::new(0, 4, background()),
            Err(EngineError::InvalidDimensions)
        ));
        assert!(Raster::new(4, 0, background()).is_err());
    }

    #[test]
    fn empty_mesh_leaves_background() {
        let mut raster = Raster::new(8, 6, background()).unwrap();
        draw_mesh(&mut raster, &Mesh::default(), &Material::default(), &View::new(1.0));
        assert_eq!(raster.covered_pixels(), 0);
        assert_eq!(raster.pixel(3, 3).to_hex(), "#f0f0f0");
    }

    #[test]
    fn front_facing_quad_covers_the_center() {
        let mut raster = Raster::new(16, 16, background()).unwrap();
        let mesh = quad_facing(1.0, 0.0, Vec3::X);
        draw_mesh(&mut raster, &mesh, &Material::default(), &View::new(1.0));
        assert!(raster.is_covered(8, 8));
        assert!(!raster.is_covered(0, 0));
        // Half the view width squared.
        assert_eq!(raster.covered_pixels(), 64);
    }

    #[test]
    fn back_facing_quad_is_culled() {
        let mut raster = Raster::new(16, 16, background()).unwrap();
        let mesh = quad_facing(-1.0, 0.0, Vec3::X);
        draw_mesh(&mut raster, &mesh, &Material::default(), &View::new(1.0));
        assert_eq!(raster.covered_pixels(), 0);
    }

    #[test]
    fn nearer_surface_wins() {
        let mut raster = Raster::new(8, 8, background()).unwrap();
        let material = Material {
            metalness: 0.0,
            ..Material::default()
        };
        let view = View::new(1.0);
        draw_mesh(&mut raster, &quad_facing(1.0, 0.5, Vec3::X), &material, &view);
        draw_mesh(&mut raster, &quad_facing(1.0, -0.5, Vec3::Z), &material, &view);
        let [r, _, b] = raster.pixel(4, 4).to_rgb8();
        assert!(r > b);
    }

    #[test]
    fn vertex_colors_can_be_disabled() {
        let material = Material {
            vertex_colors: false,
            metalness: 0.0,
            ..Material::default()
        };
        let mut raster = Raster::new(8, 8, background()).unwrap();
        draw_mesh(&mut raster, &quad_facing(1.0, 0.0, Vec3::X), &material, &View::new(1.0));
        let [r, g, b] = raster.pixel(4, 4).to_rgb8();
        assert_eq!(r, g);
        assert_eq!(g, b);
    }

    #[test]
    fn rgba_buffer_is_opaque() {
        let raster = Raster::new(3, 2, background()).unwrap();
        let rgba = raster.to_rgba8();
        assert_eq!(rgba.len(), 3 * 2 * 4);
        assert!(rgba.chunks(4).all(|px| px[3] == 255));
    }
}
