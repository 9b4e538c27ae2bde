//! Sphere-sphere contact resolution.
//!
//! The integrator calls a [`ContactSolver`] once per frame, after velocities
//! and positions have been advanced. The bundled [`SphereContactSolver`]
//! pushes overlapping collision spheres apart by inverse mass and removes
//! their approaching normal velocity. Kinematic sources have zero inverse
//! mass, so they push dynamic ones without being pushed back.

use crate::config::PhysicsConfig;
use crate::source::FieldSource;
use glam::Vec3;

/// Below this center distance the contact normal falls back to +X.
const COINCIDENT_EPSILON: f32 = 1e-6;

/// Resolves overlaps between source collision spheres.
///
/// Object-safe so a scene can carry a `Box<dyn ContactSolver>`.
pub trait ContactSolver {
    /// Separates overlapping sources in place. `dt` is the clamped frame delta.
    fn resolve(&mut self, sources: &mut [FieldSource], dt: f32);
}

/// Iterative position-and-velocity projection over all source pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereContactSolver {
    iterations: usize,
    restitution: f32,
    last_contacts: usize,
}

impl Default for SphereContactSolver {
    fn default() -> Self {
        Self::from_physics(&PhysicsConfig::default())
    }
}

impl SphereContactSolver {
    pub fn new(iterations: usize, restitution: f32) -> Self {
        Self {
            iterations,
            restitution: restitution.clamp(0.0, 1.0),
            last_contacts: 0,
        }
    }

    pub fn from_physics(physics: &PhysicsConfig) -> Self {
        Self::new(physics.solver_iterations, physics.restitution)
    }

    /// Overlapping pairs found on the first pass of the last `resolve`.
    pub fn last_contact_count(&self) -> usize {
        self.last_contacts
    }
}

impl ContactSolver for SphereContactSolver {
    fn resolve(&mut self, sources: &mut [FieldSource], _dt: f32) {
        self.last_contacts = 0;
        for pass in 0..self.iterations {
            let mut touched = 0;
            for i in 0..sources.len() {
                let (head, tail) = sources.split_at_mut(i + 1);
                let a = &mut head[i];
                for b in tail.iter_mut() {
                    if resolve_pair(a, b, self.restitution) {
                        touched += 1;
                    }
                }
            }
            if pass == 0 {
                self.last_contacts = touched;
            }
            if touched == 0 {
                break;
            }
        }
    }
}

/// Resolves one pair. Returns whether the spheres overlapped.
fn resolve_pair(a: &mut FieldSource, b: &mut FieldSource, restitution: f32) -> bool {
    let wa = a.inverse_mass();
    let wb = b.inverse_mass();
    let w = wa + wb;
    if w <= 0.0 {
        return false;
    }

    let delta = b.position - a.position;
    let dist = delta.length();
    let overlap = a.collision_radius + b.collision_radius - dist;
    // NaN positions fall through here too.
    if !(overlap > 0.0) {
        return false;
    }
    let normal = if dist > COINCIDENT_EPSILON {
        delta / dist
    } else {
        Vec3::X
    };

    a.position -= normal * (overlap * wa / w);
    b.position += normal * (overlap * wb / w);

    let approach = (b.velocity - a.velocity).dot(normal);
    if approach < 0.0 {
        let impulse = -(1.0 + restitution) * approach / w;
        a.velocity -= normal * (impulse * wa);
        b.velocity += normal * (impulse * wb);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball(x: f32) -> FieldSource {
        FieldSource::dynamic(Vec3::new(x, 0.0, 0.0), 1.0, 0.3)
    }

    #[test]
    fn separated_spheres_are_untouched() {
        let mut sources = vec![ball(0.0), ball(0.5)];
        let before = sources.clone();
        let mut solver = SphereContactSolver::default();
        solver.resolve(&mut sources, 0.016);
        assert_eq!(sources, before);
        assert_eq!(solver.last_contact_count(), 0);
    }

    #[test]
    fn overlapping_equal_spheres_split_evenly() {
        let mut sources = vec![ball(0.0), ball(0.1)];
        let mut solver = SphereContactSolver::default();
        solver.resolve(&mut sources, 0.016);
        assert_eq!(solver.last_contact_count(), 1);
        let gap = sources[1].position.x - sources[0].position.x;
        assert!((gap - 0.2).abs() < 1e-5);
        assert!((sources[0].position.x + 0.05).abs() < 1e-5);
        assert!((sources[1].position.x - 0.15).abs() < 1e-5);
    }

    #[test]
    fn approaching_velocity_is_removed() {
        let mut sources = vec![ball(0.0), ball(0.15)];
        sources[0].velocity = Vec3::new(1.0, 0.0, 0.0);
        sources[1].velocity = Vec3::new(-1.0, 0.0, 0.0);
        SphereContactSolver::default().resolve(&mut sources, 0.016);
        let relative = (sources[1].velocity - sources[0].velocity).x;
        assert!(relative.abs() < 1e-5);
    }

    #[test]
    fn elastic_contact_reverses_approach() {
        let mut sources = vec![ball(0.0), ball(0.15)];
        sources[0].velocity = Vec3::new(1.0, 0.0, 0.0);
        SphereContactSolver::new(1, 1.0).resolve(&mut sources, 0.016);
        assert!((sources[0].velocity.x).abs() < 1e-5);
        assert!((sources[1].velocity.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn kinematic_source_is_never_moved() {
        let pointer = FieldSource::kinematic(Vec3::ZERO, 1.0, 0.3);
        let mut sources = vec![pointer, ball(0.05)];
        SphereContactSolver::default().resolve(&mut sources, 0.016);
        assert_eq!(sources[0].position, Vec3::ZERO);
        assert!((sources[1].position.x - 0.2).abs() < 1e-5);
    }

    #[test]
    fn kinematic_pairs_are_skipped() {
        let mut sources = vec![
            FieldSource::kinematic(Vec3::ZERO, 1.0, 0.3),
            FieldSource::kinematic(Vec3::ZERO, 1.0, 0.3),
        ];
        let mut solver = SphereContactSolver::default();
        solver.resolve(&mut sources, 0.016);
        assert_eq!(sources[0].position, Vec3::ZERO);
        assert_eq!(sources[1].position, Vec3::ZERO);
        assert_eq!(solver.last_contact_count(), 0);
    }

    #[test]
    fn coincident_centers_separate_along_x() {
        let mut sources = vec![ball(0.0), ball(0.0)];
        SphereContactSolver::default().resolve(&mut sources, 0.016);
        assert!((sources[0].position.x + 0.1).abs() < 1e-5);
        assert!((sources[1].position.x - 0.1).abs() < 1e-5);
        assert!(sources.iter().all(FieldSource::is_finite));
    }

    #[test]
    fn nan_positions_are_left_alone() {
        let mut sources = vec![ball(0.0), ball(0.05)];
        sources[0].position = Vec3::NAN;
        SphereContactSolver::default().resolve(&mut sources, 0.016);
        assert_eq!(sources[1].position.x, 0.05);
    }

    #[test]
    fn zero_iterations_disable_contacts() {
        let mut sources = vec![ball(0.0), ball(0.05)];
        SphereContactSolver::new(0, 0.0).resolve(&mut sources, 0.016);
        assert_eq!(sources[1].position.x, 0.05);
    }

    #[test]
    fn solver_is_object_safe() {
        let mut solver: Box<dyn ContactSolver> = Box::new(SphereContactSolver::default());
        let mut sources = vec![ball(0.0), ball(0.1)];
        solver.resolve(&mut sources, 0.0);
        assert!(sources[1].position.x - sources[0].position.x >= 0.2 - 1e-5);
    }
}
