//! Pointer input boundary.
//!
//! Hosts report the pointer in normalized device coordinates (`[-1, 1]` on
//! both axes, +y up) together with the world-space size of the visible
//! simulation plane. [`PointerInput::plane_target`] maps that to the 3D
//! position a kinematic body should move to.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// World-space size of the visible simulation plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Visible plane size for a perspective camera looking at a plane
    /// `distance` units away.
    ///
    /// `fov_degrees` is the vertical field of view; `aspect` is width / height.
    pub fn from_perspective(fov_degrees: f32, distance: f32, aspect: f32) -> Self {
        let height = 2.0 * distance * (fov_degrees.to_radians() * 0.5).tan();
        Self {
            width: height * aspect,
            height,
        }
    }
}

/// One pointer sample: normalized coordinates plus the viewport used to scale them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    pub x: f32,
    pub y: f32,
    pub viewport: Viewport,
}

impl PointerInput {
    pub fn new(x: f32, y: f32, viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            x,
            y,
            viewport: Viewport::new(viewport_width, viewport_height),
        }
    }

    /// Target position on the plane `z = depth`.
    ///
    /// Coordinates outside `[-1, 1]` are clamped and NaN maps to 0, so a
    /// pointer that briefly leaves the window never produces a wild target.
    pub fn plane_target(&self, depth: f32) -> Vec3 {
        let norm = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(-1.0, 1.0) };
        let half_w = finite_or_zero(self.viewport.width) * 0.5;
        let half_h = finite_or_zero(self.viewport.height) * 0.5;
        Vec3::new(norm(self.x) * half_w, norm(self.y) * half_h, depth)
    }
}

fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() {
        v.abs()
    } else {
        0.0
    }
}
