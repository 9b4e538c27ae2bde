//! The liquid-metal scene: one frame is integrate, sample, extract, present.

use crate::config::SceneConfig;
use crate::contact::{ContactSolver, SphereContactSolver};
use crate::extractor::{extract_with, ExtractOptions};
use crate::integrator;
use crate::sampler::sample_into;
use crate::source::FieldSource;
use glam::Vec3;
use liquid_metal_core::error::EngineError;
use liquid_metal_core::{Engine, Lattice, Material, Mesh, PointerInput, ScalarField};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

/// Where the scene is within the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    Idle,
    Integrate,
    Sample,
    Extract,
    /// The mesh is ready and waiting for the renderer.
    Present,
}

/// Metaball scene driven one frame at a time.
///
/// Owns the sources, the contact solver, the reusable scalar field and the
/// mesh of the latest frame.
pub struct LiquidMetal {
    config: SceneConfig,
    sources: Vec<FieldSource>,
    solver: Box<dyn ContactSolver>,
    field: ScalarField,
    mesh: Mesh,
    phase: FramePhase,
    pointer_target: Option<Vec3>,
    frame: u64,
    resets: u64,
}

impl LiquidMetal {
    /// Builds a scene with the bundled sphere contact solver.
    ///
    /// Returns the validation error of `config` if it is not usable.
    pub fn new(config: SceneConfig) -> Result<Self, EngineError> {
        let solver = SphereContactSolver::from_physics(&config.physics);
        Self::with_solver(config, Box::new(solver))
    }

    /// Builds a scene with a caller-supplied contact solver.
    pub fn with_solver(
        config: SceneConfig,
        solver: Box<dyn ContactSolver>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let lattice = config.lattice()?;
        let sources: Vec<FieldSource> = config
            .sources
            .iter()
            .map(|s| FieldSource::from_config(s, config.physics.density))
            .collect();
        info!(
            sources = sources.len(),
            resolution = config.resolution,
            bounds = config.bounds,
            falloff = config.falloff.name(),
            "liquid metal scene ready"
        );
        Ok(Self {
            field: ScalarField::new(lattice, config.enable_colors),
            mesh: Mesh::new(config.enable_colors, config.enable_uvs),
            config,
            sources,
            solver,
            phase: FramePhase::Idle,
            pointer_target: None,
            frame: 0,
            resets: 0,
        })
    }

    /// Reference scene patched with the flat overrides in `params`.
    pub fn from_json(params: &Value) -> Result<Self, EngineError> {
        let mut config = SceneConfig::default();
        config.apply_overrides(params)?;
        Self::new(config)
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn lattice(&self) -> &Lattice {
        self.field.lattice()
    }

    pub fn sources(&self) -> &[FieldSource] {
        &self.sources
    }

    /// The field sampled in the latest frame.
    pub fn field(&self) -> &ScalarField {
        &self.field
    }

    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    /// Frames completed so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Sources reset to spawn after going non-finite.
    pub fn reset_count(&self) -> u64 {
        self.resets
    }

    /// Moves kinematic sources to the plane point under the pointer from the
    /// next frame on.
    pub fn set_pointer(&mut self, input: PointerInput) {
        self.pointer_target = Some(input.plane_target(self.config.physics.plane_depth));
    }

    /// Places kinematic sources at `target` from the next frame on.
    /// Non-finite targets are ignored.
    pub fn set_pointer_target(&mut self, target: Vec3) {
        if target.is_finite() {
            self.pointer_target = Some(target);
        }
    }

    /// Runs one full frame and returns its mesh.
    pub fn tick(&mut self, delta: f32) -> &Mesh {
        self.phase = FramePhase::Integrate;
        let dt = integrator::tick(
            &mut self.sources,
            delta,
            self.pointer_target,
            &self.config.physics,
            self.solver.as_mut(),
        );
        self.reset_non_finite();

        self.phase = FramePhase::Sample;
        sample_into(&mut self.field, &self.sources, self.config.falloff);

        self.phase = FramePhase::Extract;
        let options = ExtractOptions::new(self.config.isolation, self.config.max_poly_count)
            .with_uvs(self.config.enable_uvs);
        self.mesh = extract_with(&self.field, &options);
        if self.mesh.is_truncated() {
            debug!(
                frame = self.frame,
                max_poly_count = self.config.max_poly_count,
                "mesh truncated at triangle budget"
            );
        }

        self.phase = FramePhase::Present;
        self.frame += 1;
        debug!(
            frame = self.frame,
            dt,
            vertices = self.mesh.vertex_count(),
            triangles = self.mesh.triangle_count(),
            "frame ready"
        );
        &self.mesh
    }

    fn reset_non_finite(&mut self) {
        for (index, source) in self.sources.iter_mut().enumerate() {
            if !source.is_finite() {
                warn!(
                    index,
                    frame = self.frame,
                    "source state went non-finite, resetting to spawn"
                );
                source.reset_to_spawn();
                self.resets += 1;
            }
        }
    }
}

impl Engine for LiquidMetal {
    fn step(&mut self, delta: f32) -> Result<(), EngineError> {
        self.tick(delta);
        Ok(())
    }

    fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    fn material(&self) -> &Material {
        &self.config.material
    }

    fn pointer_moved(&mut self, input: PointerInput) {
        self.set_pointer(input);
    }

    fn frame_presented(&mut self) {
        self.phase = FramePhase::Idle;
    }

    fn params(&self) -> Value {
        let c = &self.config;
        let p = &c.physics;
        json!({
            "resolution": c.resolution,
            "bounds": c.bounds,
            "max_poly_count": c.max_poly_count,
            "isolation": c.isolation,
            "enable_colors": c.enable_colors,
            "enable_uvs": c.enable_uvs,
            "falloff": c.falloff.name(),
            "gravity": [p.gravity.x, p.gravity.y, p.gravity.z],
            "center_pull": p.center_pull,
            "linear_damping": p.linear_damping,
            "angular_damping": p.angular_damping,
            "max_delta": p.max_delta,
            "density": p.density,
            "restitution": p.restitution,
            "solver_iterations": p.solver_iterations,
            "plane_depth": p.plane_depth,
            "source_count": self.sources.len(),
        })
    }

    fn param_schema(&self) -> Value {
        let d = SceneConfig::default();
        let p = &d.physics;
        json!({
            "resolution": {
                "type": "integer",
                "default": d.resolution,
                "min": 2,
                "max": 256,
                "description": "Lattice samples per axis"
            },
            "bounds": {
                "type": "number",
                "default": d.bounds,
                "min": 0.1,
                "max": 10.0,
                "description": "Half-extent of the sampled cube"
            },
            "max_poly_count": {
                "type": "integer",
                "default": d.max_poly_count,
                "min": 1,
                "max": 1_000_000,
                "description": "Triangle budget per frame"
            },
            "isolation": {
                "type": "number",
                "default": d.isolation,
                "min": 0.001,
                "max": 2.0,
                "description": "Field level of the rendered surface"
            },
            "enable_colors": {
                "type": "boolean",
                "default": d.enable_colors,
                "description": "Blend source colors onto the surface"
            },
            "enable_uvs": {
                "type": "boolean",
                "default": d.enable_uvs,
                "description": "Emit planar texture coordinates"
            },
            "falloff": {
                "type": "string",
                "default": d.falloff.name(),
                "options": crate::Falloff::ALL.map(crate::Falloff::name),
                "description": "Radial contribution kernel"
            },
            "gravity": {
                "type": "vec3",
                "default": [p.gravity.x, p.gravity.y, p.gravity.z],
                "description": "Uniform acceleration on dynamic sources"
            },
            "center_pull": {
                "type": "number",
                "default": p.center_pull,
                "min": 0.0,
                "max": 1.0,
                "description": "Impulse toward the origin per second of frame time"
            },
            "linear_damping": {
                "type": "number",
                "default": p.linear_damping,
                "min": 0.0,
                "max": 50.0,
                "description": "Linear velocity damping"
            },
            "angular_damping": {
                "type": "number",
                "default": p.angular_damping,
                "min": 0.0,
                "max": 50.0,
                "description": "Angular velocity damping"
            },
            "max_delta": {
                "type": "number",
                "default": p.max_delta,
                "min": 0.001,
                "max": 1.0,
                "description": "Largest frame delta applied in one step, in seconds"
            },
            "density": {
                "type": "number",
                "default": p.density,
                "min": 0.01,
                "max": 100.0,
                "description": "Density of the collision spheres"
            },
            "restitution": {
                "type": "number",
                "default": p.restitution,
                "min": 0.0,
                "max": 1.0,
                "description": "Bounciness of source contacts"
            },
            "solver_iterations": {
                "type": "integer",
                "default": p.solver_iterations,
                "min": 0,
                "max": 32,
                "description": "Contact passes per frame"
            },
            "plane_depth": {
                "type": "number",
                "default": p.plane_depth,
                "min": -1.0,
                "max": 1.0,
                "description": "Depth of the plane the pointer ball moves on"
            }
        })
    }
}
