#![deny(unsafe_code)]
//! Liquid-metal metaball engine.
//!
//! A handful of spheres drift toward the origin under damped motion, collide
//! with each other and with a pointer-driven ball, and together define a
//! scalar field. Every frame the field is sampled on a cubic lattice and its
//! level set is extracted by marching cubes into an indexed mesh with blended
//! vertex colors, ready for any [`liquid_metal_core::Renderer`].
//!
//! The pipeline stages live in their own modules: [`integrator`] and
//! [`contact`] move the [`FieldSource`]s, [`sampler`] builds the
//! [`liquid_metal_core::ScalarField`], [`extractor`] turns it into a
//! [`liquid_metal_core::Mesh`], and [`LiquidMetal`] runs them in order.

pub mod cases;
pub mod config;
pub mod contact;
pub mod extractor;
pub mod frame_loop;
pub mod integrator;
pub mod sampler;
pub mod scene;
pub mod source;

pub use config::{PhysicsConfig, SceneConfig, SourceConfig, SourceKind};
pub use contact::{ContactSolver, SphereContactSolver};
pub use extractor::{extract, extract_with, ExtractOptions};
pub use frame_loop::{fixed_ticks, FrameLoop, FrameStats, Tick};
pub use sampler::{sample, sample_into};
pub use scene::{FramePhase, LiquidMetal};
pub use source::{field_at, Falloff, FieldSource};
