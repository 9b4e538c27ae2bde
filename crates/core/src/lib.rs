#![deny(unsafe_code)]
//! Core types and traits for the liquid-metal metaball system.
//!
//! Provides the `Engine` trait, the 3D sampling `Lattice` and `ScalarField`,
//! the indexed `Mesh` handed to renderers, the `Renderer`/`Material` boundary,
//! pointer input types, `Srgb` colors, `EngineError`, and JSON parameter helpers.

pub mod color;
pub mod engine;
pub mod error;
pub mod input;
pub mod lattice;
pub mod mesh;
pub mod params;
pub mod present;

pub use color::Srgb;
pub use engine::Engine;
pub use error::EngineError;
pub use input::{PointerInput, Viewport};
pub use lattice::{Lattice, ScalarField};
pub use mesh::Mesh;
pub use present::{Material, Renderer};

pub use glam;
