//! Field sources and the contribution kernel they share.
//!
//! A [`FieldSource`] is both a rigid sphere in the motion integrator and a
//! radial scalar contributor in the field sampler. Its contribution is
//! `strength * shape((d / r)^2)` where `r` is the falloff radius; every
//! [`Falloff`] shape is 1 at the center, non-increasing, and exactly 0 at and
//! beyond `r`, so a source only touches the samples inside its sphere.

use crate::config::{SourceConfig, SourceKind};
use glam::Vec3;
use liquid_metal_core::Srgb;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Softening term of the inverse-square kernel, in units of `r^2`.
const INVERSE_SQUARE_SOFTENING: f32 = 0.01;

/// Radial kernel shape shared by all sources of a scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Falloff {
    /// `(1 - t^2)^3`: smooth at both ends, cheap, no square root.
    #[default]
    WyvillCubic,
    /// `1 - smoothstep(0, 1, t)`.
    SmoothStep,
    /// `1 - t`.
    Linear,
    /// Softened `1/d^2`, rescaled to reach exactly 0 at the radius.
    InverseSquare,
}

impl Falloff {
    pub const ALL: [Falloff; 4] = [
        Falloff::WyvillCubic,
        Falloff::SmoothStep,
        Falloff::Linear,
        Falloff::InverseSquare,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Falloff::WyvillCubic => "wyvill_cubic",
            Falloff::SmoothStep => "smooth_step",
            Falloff::Linear => "linear",
            Falloff::InverseSquare => "inverse_square",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Kernel value for the squared normalized distance `t2 = (d / r)^2`.
    ///
    /// Returns 1 at `t2 = 0` and 0 for `t2 >= 1` or NaN.
    #[inline]
    pub fn shape(self, t2: f32) -> f32 {
        if !(t2 < 1.0) {
            return 0.0;
        }
        let t2 = t2.max(0.0);
        match self {
            Falloff::WyvillCubic => {
                let u = 1.0 - t2;
                u * u * u
            }
            Falloff::SmoothStep => {
                let t = t2.sqrt();
                1.0 - t * t * (3.0 - 2.0 * t)
            }
            Falloff::Linear => 1.0 - t2.sqrt(),
            Falloff::InverseSquare => {
                let eps = INVERSE_SQUARE_SOFTENING;
                ((1.0 / (t2 + eps) - 1.0) / (1.0 / eps - 1.0)).max(0.0)
            }
        }
    }
}

/// One metaball: a rigid sphere that also shapes the scalar field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSource {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Tracked and damped only; rotation has no effect on the field.
    pub angular_velocity: Vec3,
    /// Peak contribution at the center.
    pub strength: f32,
    /// Falloff radius: the contribution is 0 at and beyond this distance.
    pub subtract_radius: f32,
    /// Radius of the rigid collision sphere.
    pub collision_radius: f32,
    pub kind: SourceKind,
    pub color: Srgb,
    spawn: Vec3,
    density: f32,
    mass: f32,
}

impl FieldSource {
    /// Creates a source at rest. Mass is that of a sphere of
    /// `collision_radius` with unit density.
    pub fn new(
        kind: SourceKind,
        position: Vec3,
        strength: f32,
        subtract_radius: f32,
        collision_radius: f32,
        color: Srgb,
    ) -> Self {
        let mut source = Self {
            position,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            strength,
            subtract_radius,
            collision_radius,
            kind,
            color,
            spawn: position,
            density: 1.0,
            mass: 0.0,
        };
        source.set_density(1.0);
        source
    }

    pub fn dynamic(position: Vec3, strength: f32, subtract_radius: f32) -> Self {
        Self::new(
            SourceKind::Dynamic,
            position,
            strength,
            subtract_radius,
            0.1,
            Srgb::new(1.0, 1.0, 1.0),
        )
    }

    pub fn kinematic(position: Vec3, strength: f32, subtract_radius: f32) -> Self {
        Self::new(
            SourceKind::Kinematic,
            position,
            strength,
            subtract_radius,
            0.1,
            Srgb::new(1.0, 1.0, 1.0),
        )
    }

    /// Builds the runtime source described by a scene entry.
    pub fn from_config(config: &SourceConfig, density: f32) -> Self {
        let mut source = Self::new(
            config.kind,
            config.position,
            config.strength,
            config.subtract_radius,
            config.collision_radius,
            config.color,
        );
        source.set_density(density);
        source
    }

    pub fn with_color(mut self, color: Srgb) -> Self {
        self.color = color;
        self
    }

    /// Resizes the collision sphere, keeping the source's density.
    pub fn with_collision_radius(mut self, radius: f32) -> Self {
        self.collision_radius = radius;
        self.set_density(self.density);
        self
    }

    fn set_density(&mut self, density: f32) {
        let r = self.collision_radius;
        self.density = density;
        self.mass = density * 4.0 / 3.0 * PI * r * r * r;
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Inverse mass seen by impulses and contacts; 0 for kinematic sources.
    pub fn inverse_mass(&self) -> f32 {
        match self.kind {
            SourceKind::Kinematic => 0.0,
            SourceKind::Dynamic if self.mass > 0.0 => 1.0 / self.mass,
            SourceKind::Dynamic => 0.0,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind == SourceKind::Dynamic
    }

    pub fn is_kinematic(&self) -> bool {
        self.kind == SourceKind::Kinematic
    }

    /// Position the source was created at.
    pub fn spawn(&self) -> Vec3 {
        self.spawn
    }

    /// Puts the source back at its spawn point, at rest.
    pub fn reset_to_spawn(&mut self) {
        self.position = self.spawn;
        self.velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
    }

    /// Whether position and both velocities are finite.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite() && self.angular_velocity.is_finite()
    }

    /// Contribution of this source at `point`.
    #[inline]
    pub fn contribution(&self, point: Vec3, falloff: Falloff) -> f32 {
        self.contribution_sq(point.distance_squared(self.position), falloff)
    }

    /// Contribution at squared distance `d2` from the center.
    #[inline]
    pub fn contribution_sq(&self, d2: f32, falloff: Falloff) -> f32 {
        let r = self.subtract_radius;
        if !(r > 0.0) {
            return 0.0;
        }
        self.strength * falloff.shape(d2 / (r * r))
    }
}

/// Sum of all source contributions at `point`.
pub fn field_at(sources: &[FieldSource], point: Vec3, falloff: Falloff) -> f32 {
    sources
        .iter()
        .map(|s| s.contribution(point, falloff))
        .sum()
}
