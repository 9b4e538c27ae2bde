//! Per-frame motion of field sources.
//!
//! Dynamic sources receive a constant-magnitude impulse toward the origin,
//! uniform gravity and exponential-style damping, then move by semi-implicit
//! Euler. Kinematic sources jump to the pointer target. Contacts run last.

use crate::config::PhysicsConfig;
use crate::contact::ContactSolver;
use crate::source::FieldSource;
use glam::Vec3;

/// Clamps a host frame delta to `[0, max_delta]`; NaN becomes 0.
pub fn clamp_delta(delta: f32, max_delta: f32) -> f32 {
    if delta.is_nan() {
        0.0
    } else {
        delta.clamp(0.0, max_delta)
    }
}

/// Impulse pulling a body at `position` toward the origin.
///
/// Magnitude is `dt * pull` regardless of distance; zero at the origin.
pub fn center_impulse(position: Vec3, dt: f32, pull: f32) -> Vec3 {
    -position.normalize_or_zero() * (dt * pull)
}

/// Advances all sources by one frame and resolves contacts.
///
/// `pointer_target`, when present, is where every kinematic source is placed;
/// without it kinematic sources stay put. Returns the clamped delta used.
pub fn tick(
    sources: &mut [FieldSource],
    delta: f32,
    pointer_target: Option<Vec3>,
    physics: &PhysicsConfig,
    solver: &mut dyn ContactSolver,
) -> f32 {
    let dt = clamp_delta(delta, physics.max_delta);
    for source in sources.iter_mut() {
        if source.is_kinematic() {
            if let Some(target) = pointer_target.filter(|t| t.is_finite()) {
                source.position = target;
            }
            source.velocity = Vec3::ZERO;
            source.angular_velocity = Vec3::ZERO;
        } else {
            integrate_dynamic(source, dt, physics);
        }
    }
    solver.resolve(sources, dt);
    dt
}

fn integrate_dynamic(source: &mut FieldSource, dt: f32, physics: &PhysicsConfig) {
    let impulse = center_impulse(source.position, dt, physics.center_pull);
    source.velocity += impulse * source.inverse_mass() + physics.gravity * dt;
    source.velocity *= 1.0 / (1.0 + dt * physics.linear_damping);
    source.angular_velocity *= 1.0 / (1.0 + dt * physics.angular_damping);
    source.position += source.velocity * dt;
}
