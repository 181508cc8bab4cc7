use glam::Vec3;

use crate::constraints::distance::solve_pair;
use crate::constraints::Constraint;
use crate::particle::ParticleSet;
use crate::topology::{bending_patches, Topology};

/// Length-based bending constraint.
///
/// For two triangles sharing edge (i, j), with opposite vertices k and l:
///
/// ```text
///     k
///    / \
///   i---j
///    \ /
///     l
/// ```
///
/// the distance k-l is held at its initial value. Folding the pair along
/// the shared edge shortens k-l, so this resists bending at the cost of a
/// plain distance projection.
///
/// Reference: "Ten Minute Physics 14: Cloth simulation", Müller.
pub struct PerformantBendingConstraint {
    /// Opposite vertex pairs `(k, l)`.
    pub pairs: Vec<[u32; 2]>,
    /// Rest distance per pair.
    pub rest_lengths: Vec<f32>,
    /// XPBD compliance (inverse stiffness). Higher values produce softer bending.
    pub compliance: f32,
}

impl PerformantBendingConstraint {
    pub fn from_topology(positions: &[Vec3], topology: &Topology, compliance: f32) -> Self {
        let pairs: Vec<[u32; 2]> = bending_patches(topology)
            .into_iter()
            .map(|[_, _, k, l]| [k, l])
            .collect();
        let rest_lengths = pairs
            .iter()
            .map(|&[k, l]| positions[k as usize].distance(positions[l as usize]))
            .collect();
        Self {
            pairs,
            rest_lengths,
            compliance,
        }
    }
}

impl Constraint for PerformantBendingConstraint {
    fn solve(&mut self, particles: &mut ParticleSet, dt: f32) {
        let alpha = self.compliance / (dt * dt);
        for (&[k, l], &rest) in self.pairs.iter().zip(&self.rest_lengths) {
            solve_pair(particles, k as usize, l as usize, rest, alpha);
        }
    }

    fn name(&self) -> &'static str {
        "performant_bending"
    }
}
