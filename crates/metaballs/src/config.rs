//! Scene description: lattice, extraction, motion and source settings.
//!
//! [`SceneConfig::default`] is the reference scene: six colored metaballs
//! plus one pointer-driven kinematic ball, sampled on a 100^3 lattice over
//! `[-1, 1]^3`. Configs deserialize from partial JSON (missing keys take the
//! reference values) and can be patched from a flat parameter object with
//! [`SceneConfig::apply_overrides`].

use crate::source::Falloff;
use glam::Vec3;
use liquid_metal_core::error::EngineError;
use liquid_metal_core::params::{
    check_params, param_bool, param_f32, param_string, param_usize, param_vec3, ParamKind,
};
use liquid_metal_core::{Lattice, Material, Srgb};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_RESOLUTION: usize = 100;
pub const DEFAULT_BOUNDS: f32 = 1.0;
pub const DEFAULT_MAX_POLY_COUNT: usize = 20_000;
/// Surface threshold. Sits below the peak of a lone reference metaball
/// (0.1) so every ball shows as its own blob.
pub const DEFAULT_ISOLATION: f32 = 0.05;

const METABALL_STRENGTH: f32 = 0.1;
const METABALL_SUBTRACT: f32 = 7.0;
const POINTER_STRENGTH: f32 = 0.75;
const POINTER_SUBTRACT: f32 = 10.0;
const COLLIDER_RADIUS: f32 = 0.1;

/// How a source moves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Driven by the center pull, gravity, damping and contacts.
    #[default]
    Dynamic,
    /// Placed directly each frame (the pointer ball); never pushed by contacts.
    Kinematic,
}

/// One source entry of a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub position: Vec3,
    pub color: Srgb,
    pub strength: f32,
    pub subtract_radius: f32,
    pub collision_radius: f32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::metaball(Vec3::ZERO, Srgb::new(1.0, 1.0, 1.0))
    }
}

impl SourceConfig {
    /// A reference dynamic metaball.
    pub fn metaball(position: Vec3, color: Srgb) -> Self {
        Self::from_strength_subtract(
            SourceKind::Dynamic,
            position,
            color,
            METABALL_STRENGTH,
            METABALL_SUBTRACT,
            DEFAULT_BOUNDS,
        )
    }

    /// The reference pointer ball.
    pub fn pointer() -> Self {
        Self::from_strength_subtract(
            SourceKind::Kinematic,
            Vec3::ZERO,
            Srgb::parse("gold").unwrap_or(Srgb::new(1.0, 0.843, 0.0)),
            POINTER_STRENGTH,
            POINTER_SUBTRACT,
            DEFAULT_BOUNDS,
        )
    }

    /// Builds an entry from the classic `(strength, subtract)` ball
    /// parameters, whose influence reaches `sqrt(strength / subtract)` of the
    /// full lattice width `2 * bounds`.
    pub fn from_strength_subtract(
        kind: SourceKind,
        position: Vec3,
        color: Srgb,
        strength: f32,
        subtract: f32,
        bounds: f32,
    ) -> Self {
        Self {
            kind,
            position,
            color,
            strength,
            subtract_radius: 2.0 * bounds * (strength / subtract).sqrt(),
            collision_radius: COLLIDER_RADIUS,
        }
    }
}

/// Motion integrator constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Uniform acceleration on dynamic sources.
    pub gravity: Vec3,
    /// Center pull impulse per second of frame time.
    pub center_pull: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Upper clamp on a single frame's delta, in seconds.
    pub max_delta: f32,
    pub density: f32,
    /// 0 for perfectly inelastic contacts, 1 for elastic.
    pub restitution: f32,
    pub solver_iterations: usize,
    /// `z` of the plane the pointer ball moves on.
    pub plane_depth: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, 2.0, 0.0),
            center_pull: 0.025,
            linear_damping: 12.0,
            angular_damping: 0.5,
            max_delta: 0.1,
            density: 1.0,
            restitution: 0.0,
            solver_iterations: 4,
            plane_depth: 0.0,
        }
    }
}

/// Everything needed to build a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub resolution: usize,
    pub bounds: f32,
    pub max_poly_count: usize,
    pub isolation: f32,
    pub enable_colors: bool,
    pub enable_uvs: bool,
    pub falloff: Falloff,
    pub physics: PhysicsConfig,
    pub sources: Vec<SourceConfig>,
    pub material: Material,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let named = |name: &str| Srgb::parse(name).unwrap_or(Srgb::new(1.0, 1.0, 1.0));
        let sources = vec![
            SourceConfig::metaball(Vec3::new(1.0, 1.0, 0.5), named("black")),
            SourceConfig::metaball(Vec3::new(-1.0, -1.0, -0.5), named("violet")),
            SourceConfig::metaball(Vec3::new(2.0, 2.0, 0.5), named("blue")),
            SourceConfig::metaball(Vec3::new(-2.0, -2.0, -0.5), named("silver")),
            SourceConfig::metaball(Vec3::new(3.0, 3.0, 0.5), named("cyan")),
            SourceConfig::metaball(Vec3::ZERO, named("gold")),
            SourceConfig::pointer(),
        ];
        Self {
            resolution: DEFAULT_RESOLUTION,
            bounds: DEFAULT_BOUNDS,
            max_poly_count: DEFAULT_MAX_POLY_COUNT,
            isolation: DEFAULT_ISOLATION,
            enable_colors: true,
            enable_uvs: false,
            falloff: Falloff::default(),
            physics: PhysicsConfig::default(),
            sources,
            material: Material::default(),
        }
    }
}

fn positive(name: &str, v: f32) -> Result<(), EngineError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidConfig(format!(
            "{name} must be positive and finite, got {v}"
        )))
    }
}

fn non_negative(name: &str, v: f32) -> Result<(), EngineError> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidConfig(format!(
            "{name} must be non-negative and finite, got {v}"
        )))
    }
}

impl SceneConfig {
    /// Parses a full or partial JSON scene.
    pub fn from_json(value: &Value) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_value(value.clone())
            .map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Sampling lattice described by `resolution` and `bounds`.
    pub fn lattice(&self) -> Result<Lattice, EngineError> {
        Lattice::new(self.resolution, self.bounds)
    }

    /// Checks every field a scene depends on.
    ///
    /// Returns `EngineError::InvalidDimensions` for a resolution below 2 and
    /// `EngineError::InvalidConfig` naming the first offending field otherwise.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.lattice()?;
        if self.max_poly_count == 0 {
            return Err(EngineError::InvalidConfig(
                "max_poly_count must be at least 1".into(),
            ));
        }
        positive("isolation", self.isolation)?;

        let p = &self.physics;
        if !p.gravity.is_finite() {
            return Err(EngineError::InvalidConfig(format!(
                "gravity must be finite, got {}",
                p.gravity
            )));
        }
        non_negative("center_pull", p.center_pull)?;
        non_negative("linear_damping", p.linear_damping)?;
        non_negative("angular_damping", p.angular_damping)?;
        positive("max_delta", p.max_delta)?;
        positive("density", p.density)?;
        if !(0.0..=1.0).contains(&p.restitution) {
            return Err(EngineError::InvalidConfig(format!(
                "restitution must be in [0, 1], got {}",
                p.restitution
            )));
        }
        if !p.plane_depth.is_finite() {
            return Err(EngineError::InvalidConfig(format!(
                "plane_depth must be finite, got {}",
                p.plane_depth
            )));
        }

        for (i, s) in self.sources.iter().enumerate() {
            positive(&format!("sources[{i}].strength"), s.strength)?;
            positive(&format!("sources[{i}].subtract_radius"), s.subtract_radius)?;
            positive(&format!("sources[{i}].collision_radius"), s.collision_radius)?;
            if !s.position.is_finite() {
                return Err(EngineError::InvalidConfig(format!(
                    "sources[{i}].position must be finite, got {}",
                    s.position
                )));
            }
        }
        Ok(())
    }

    /// Flat keys understood by [`SceneConfig::apply_overrides`].
    pub const OVERRIDE_KEYS: &'static [(&'static str, ParamKind)] = &[
        ("resolution", ParamKind::Integer),
        ("bounds", ParamKind::Number),
        ("max_poly_count", ParamKind::Integer),
        ("isolation", ParamKind::Number),
        ("enable_colors", ParamKind::Bool),
        ("enable_uvs", ParamKind::Bool),
        ("falloff", ParamKind::String),
        ("gravity", ParamKind::Vec3),
        ("center_pull", ParamKind::Number),
        ("linear_damping", ParamKind::Number),
        ("angular_damping", ParamKind::Number),
        ("max_delta", ParamKind::Number),
        ("density", ParamKind::Number),
        ("restitution", ParamKind::Number),
        ("solver_iterations", ParamKind::Integer),
        ("plane_depth", ParamKind::Number),
    ];

    /// Rejects override objects with unknown keys or mistyped values.
    ///
    /// [`SceneConfig::apply_overrides`] skips both silently; hosts taking
    /// user input call this first.
    pub fn check_overrides(params: &Value) -> Result<(), EngineError> {
        check_params(params, Self::OVERRIDE_KEYS)
    }

    /// Patches scalar settings from a flat JSON object.
    ///
    /// Missing or mistyped keys leave the current value in place. An unknown
    /// `falloff` name is an error.
    pub fn apply_overrides(&mut self, params: &Value) -> Result<(), EngineError> {
        self.resolution = param_usize(params, "resolution", self.resolution);
        self.bounds = param_f32(params, "bounds", self.bounds);
        self.max_poly_count = param_usize(params, "max_poly_count", self.max_poly_count);
        self.isolation = param_f32(params, "isolation", self.isolation);
        self.enable_colors = param_bool(params, "enable_colors", self.enable_colors);
        self.enable_uvs = param_bool(params, "enable_uvs", self.enable_uvs);

        let falloff = param_string(params, "falloff", self.falloff.name());
        self.falloff = Falloff::from_name(&falloff)
            .ok_or_else(|| EngineError::InvalidConfig(format!("unknown falloff '{falloff}'")))?;

        let p = &mut self.physics;
        p.gravity = param_vec3(params, "gravity", p.gravity);
        p.center_pull = param_f32(params, "center_pull", p.center_pull);
        p.linear_damping = param_f32(params, "linear_damping", p.linear_damping);
        p.angular_damping = param_f32(params, "angular_damping", p.angular_damping);
        p.max_delta = param_f32(params, "max_delta", p.max_delta);
        p.density = param_f32(params, "density", p.density);
        p.restitution = param_f32(params, "restitution", p.restitution);
        p.solver_iterations = param_usize(params, "solver_iterations", p.solver_iterations);
        p.plane_depth = param_f32(params, "plane_depth", p.plane_depth);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_scene_is_valid() {
        let config = SceneConfig::default();
        config.validate().unwrap();
        assert_eq!(config.resolution, 100);
        assert_eq!(config.max_poly_count, 20_000);
        assert_eq!(config.sources.len(), 7);
    }

    #[test]
    fn default_scene_has_one_kinematic_pointer() {
        let config = SceneConfig::default();
        let kinematic: Vec<_> = config
            .sources
            .iter()
            .filter(|s| s.kind == SourceKind::Kinematic)
            .collect();
        assert_eq!(kinematic.len(), 1);
        assert!(kinematic[0].strength > METABALL_STRENGTH);
    }

    #[test]
    fn default_palette_uses_named_colors() {
        let config = SceneConfig::default();
        assert_eq!(config.sources[1].color.to_hex(), "#ee82ee");
        assert_eq!(config.sources[5].color.to_hex(), "#ffd700");
        assert_eq!(config.sources[6].kind, SourceKind::Kinematic);
        assert_eq!(config.sources[6].color.to_hex(), "#ffd700");
    }

    #[test]
    fn check_overrides_accepts_every_override_key() {
        let params = json!({
            "resolution": 32,
            "bounds": 1.5,
            "max_poly_count": 5000,
            "isolation": 0.1,
            "enable_colors": false,
            "enable_uvs": true,
            "falloff": "smooth_step",
            "gravity": [0, 1, 0],
            "center_pull": 0.05,
            "linear_damping": 4,
            "angular_damping": 1,
            "max_delta": 0.05,
            "density": 2,
            "restitution": 0.5,
            "solver_iterations": 8,
            "plane_depth": 0.25
        });
        SceneConfig::check_overrides(&params).unwrap();
    }

    #[test]
    fn check_overrides_reports_typos_and_bad_types() {
        assert!(matches!(
            SceneConfig::check_overrides(&json!({"isolaton": 0.1})),
            Err(EngineError::ParamNotFound(_))
        ));
        assert!(matches!(
            SceneConfig::check_overrides(&json!({"gravity": 2.0})),
            Err(EngineError::ParamTypeMismatch { .. })
        ));
    }

    #[test]
    fn reference_radius_follows_strength_over_subtract() {
        let s = SourceConfig::metaball(Vec3::ZERO, Srgb::new(0.0, 0.0, 0.0));
        let expected = 2.0 * (0.1f32 / 7.0).sqrt();
        assert!((s.subtract_radius - expected).abs() < 1e-6);
        assert!((s.collision_radius - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn default_physics_matches_reference_constants() {
        let p = PhysicsConfig::default();
        assert_eq!(p.gravity, Vec3::new(0.0, 2.0, 0.0));
        assert!((p.linear_damping - 12.0).abs() < f32::EPSILON);
        assert!((p.max_delta - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn validate_rejects_low_resolution() {
        let config = SceneConfig {
            resolution: 1,
            ..SceneConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidDimensions)
        ));
    }

    #[test]
    fn validate_rejects_zero_poly_budget() {
        let config = SceneConfig {
            max_poly_count: 0,
            ..SceneConfig::default()
        };
        assert!(matches!(config.validate(), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn validate_names_the_offending_source() {
        let mut config = SceneConfig::default();
        config.sources[3].strength = 0.0;
        match config.validate() {
            Err(EngineError::InvalidConfig(msg)) => assert!(msg.contains("sources[3].strength")),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_non_finite_physics() {
        let mut config = SceneConfig::default();
        config.physics.gravity = Vec3::new(0.0, f32::NAN, 0.0);
        assert!(config.validate().is_err());

        let mut config = SceneConfig::default();
        config.physics.restitution = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_source_list_is_valid() {
        let config = SceneConfig {
            sources: Vec::new(),
            ..SceneConfig::default()
        };
        config.validate().unwrap();
    }

    #[test]
    fn from_json_fills_missing_keys_with_defaults() {
        let config = SceneConfig::from_json(&json!({
            "resolution": 24,
            "physics": {"gravity": [0.0, 0.0, 0.0]},
            "sources": [{"kind": "kinematic", "strength": 0.5}]
        }))
        .unwrap();
        assert_eq!(config.resolution, 24);
        assert_eq!(config.physics.gravity, Vec3::ZERO);
        assert!((config.physics.linear_damping - 12.0).abs() < f32::EPSILON);
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].kind, SourceKind::Kinematic);
        assert!((config.sources[0].collision_radius - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn from_json_rejects_invalid_values() {
        assert!(SceneConfig::from_json(&json!({"isolation": -1.0})).is_err());
        assert!(SceneConfig::from_json(&json!({"falloff": "gaussian"})).is_err());
    }

    #[test]
    fn serde_round_trip_preserves_scene() {
        let config = SceneConfig::default();
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(SceneConfig::from_json(&value).unwrap(), config);
    }

    #[test]
    fn overrides_patch_known_keys() {
        let mut config = SceneConfig::default();
        config
            .apply_overrides(&json!({
                "resolution": 32,
                "isolation": 0.2,
                "falloff": "linear",
                "gravity": [0.0, -9.8, 0.0],
                "solver_iterations": 8,
            }))
            .unwrap();
        assert_eq!(config.resolution, 32);
        assert!((config.isolation - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.falloff, Falloff::Linear);
        assert_eq!(config.physics.gravity, Vec3::new(0.0, -9.8, 0.0));
        assert_eq!(config.physics.solver_iterations, 8);
        assert_eq!(config.max_poly_count, DEFAULT_MAX_POLY_COUNT);
    }

    #[test]
    fn overrides_reject_unknown_falloff() {
        let mut config = SceneConfig::default();
        assert!(config
            .apply_overrides(&json!({"falloff": "gaussian"}))
            .is_err());
    }

    #[test]
    fn overrides_ignore_mistyped_values() {
        let mut config = SceneConfig::default();
        config
            .apply_overrides(&json!({"resolution": "big", "enable_uvs": 1}))
            .unwrap();
        assert_eq!(config.resolution, DEFAULT_RESOLUTION);
        assert!(!config.enable_uvs);
    }
}
