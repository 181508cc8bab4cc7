//! XPBD constraints.
//!
//! Every constraint runs one Gauss-Seidel sweep per substep and writes
//! corrected positions straight back into the particle arena. Compliance is
//! the inverse stiffness (0 = rigid) and is divided by `dt^2` inside `solve`.

pub mod bending;
pub mod distance;
pub mod isometric;

use crate::particle::ParticleSet;

pub use bending::PerformantBendingConstraint;
pub use distance::DistanceConstraint;
pub use isometric::IsometricBendingConstraint;

/// A constraint registered on a cloth.
pub trait Constraint {
    /// Project positions once, in place.
    fn solve(&mut self, particles: &mut ParticleSet, dt: f32);

    /// Short label for logs.
    fn name(&self) -> &'static str;
}
