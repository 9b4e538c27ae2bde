//! The core `Engine` trait implemented by frame-driven simulations.
//!
//! The trait is object-safe so a host can drive any engine as `dyn Engine`
//! without knowing how it builds its mesh.

use crate::error::EngineError;
use crate::input::PointerInput;
use crate::mesh::Mesh;
use crate::present::Material;
use serde_json::Value;

/// Core trait for frame-driven mesh engines.
///
/// Each call to [`Engine::step`] advances the simulation by one frame and
/// rebuilds the [`Mesh`] the host hands to its renderer. The host reports
/// back with [`Engine::frame_presented`] once the mesh has been consumed.
///
/// This trait is **object-safe**: you can use `Box<dyn Engine>` or `&dyn Engine`
/// for runtime polymorphism.
pub trait Engine {
    /// Advance the simulation by one frame of `delta` seconds and rebuild the mesh.
    ///
    /// Engines must tolerate any `delta`, including zero, tiny and very large
    /// values.
    fn step(&mut self, delta: f32) -> Result<(), EngineError>;

    /// The mesh produced by the most recent step.
    fn mesh(&self) -> &Mesh;

    /// Material settings handed to the renderer alongside the mesh.
    fn material(&self) -> &Material;

    /// Pointer input for the next step. Ignored by default.
    fn pointer_moved(&mut self, _input: PointerInput) {}

    /// Called by the host after the current mesh has been presented.
    fn frame_presented(&mut self) {}

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing all available parameters, their types, ranges, and defaults.
    fn param_schema(&self) -> Value;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Minimal engine implementation used to verify trait object safety.
    struct MockEngine {
        mesh: Mesh,
        material: Material,
        step_count: usize,
        presented: usize,
    }

    impl MockEngine {
        fn new() -> Self {
            Self {
                mesh: Mesh::new(false, false),
                material: Material::default(),
                step_count: 0,
                presented: 0,
            }
        }
    }

    impl Engine for MockEngine {
        fn step(&mut self, _delta: f32) -> Result<(), EngineError> {
            self.step_count += 1;
            Ok(())
        }

        fn mesh(&self) -> &Mesh {
            &self.mesh
        }

        fn material(&self) -> &Material {
            &self.material
        }

        fn frame_presented(&mut self) {
            self.presented += 1;
        }

        fn params(&self) -> Value {
            json!({"step_count": self.step_count})
        }

        fn param_schema(&self) -> Value {
            json!({
                "step_count": {
                    "type": "integer",
                    "default": 0,
                    "description": "Number of steps executed"
                }
            })
        }
    }

    #[test]
    fn engine_trait_is_object_safe() {
        // This test verifies that Engine can be used as a trait object.
        // If the trait were not object-safe, this would fail to compile.
        let engine: Box<dyn Engine> = Box::new(MockEngine::new());
        assert!(engine.mesh().is_empty());
    }

    #[test]
    fn mock_engine_step_advances_state() {
        let mut engine = MockEngine::new();
        engine.step(0.016).unwrap();
        engine.step(0.016).unwrap();
        assert_eq!(engine.step_count, 2);
    }

    #[test]
    fn default_pointer_handler_is_a_no_op() {
        let mut engine = MockEngine::new();
        engine.pointer_moved(PointerInput::new(0.5, 0.5, 2.0, 2.0));
        assert_eq!(engine.step_count, 0);
    }

    #[test]
    fn mock_engine_params_reflects_state() {
        let mut engine = MockEngine::new();
        engine.step(0.016).unwrap();
        assert_eq!(engine.params()["step_count"], 1);
    }

    #[test]
    fn mock_engine_param_schema_has_expected_structure() {
        let engine = MockEngine::new();
        let schema = engine.param_schema();
        assert_eq!(schema["step_count"]["type"], "integer");
    }

    #[test]
    fn dyn_engine_mut_reference_works() {
        let mut engine = MockEngine::new();
        let engine_ref: &mut dyn Engine = &mut engine;
        engine_ref.step(0.0).unwrap();
        engine_ref.frame_presented();
        assert_eq!(engine_ref.params()["step_count"], 1);
        assert_eq!(engine.presented, 1);
    }
}
