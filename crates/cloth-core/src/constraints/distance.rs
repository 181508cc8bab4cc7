use glam::Vec3;

use crate::constraints::Constraint;
use crate::math::{add_scaled, diff, EPSILON};
use crate::particle::ParticleSet;
use crate::topology::{unique_edges, Topology};

/// One edge held at a rest length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    /// Particle index A.
    pub i: u32,
    /// Particle index B.
    pub j: u32,
    /// Rest length (initial distance, or 0 for an attach pair).
    pub rest_length: f32,
}

/// XPBD distance constraint over every mesh edge.
///
/// Maintains a rest length between two particles using XPBD
/// (Extended Position-Based Dynamics) with compliance.
///
/// Reference: "XPBD: Position-Based Simulation of Compliant Constrained Dynamics",
/// Macklin et al., 2016
pub struct DistanceConstraint {
    pub edges: Vec<Edge>,
    /// Compliance (inverse stiffness). Higher values produce softer constraints.
    pub compliance: f32,
}

impl DistanceConstraint {
    /// One edge per mesh edge, plus one zero-length edge per attach pair.
    ///
    /// Rest lengths are the current distances. A mesh edge that matches an
    /// attach pair (in either order) gets rest length 0 as well.
    pub fn from_topology(
        positions: &[Vec3],
        topology: &Topology,
        attachments: &[[u32; 2]],
        compliance: f32,
    ) -> Self {
        let is_attached = |a: u32, b: u32| {
            attachments
                .iter()
                .any(|&[x, y]| (a == x && b == y) || (a == y && b == x))
        };

        let mut edges: Vec<Edge> = unique_edges(topology)
            .into_iter()
            .map(|[i, j]| Edge {
                i,
                j,
                rest_length: if is_attached(i, j) {
                    0.0
                } else {
                    positions[i as usize].distance(positions[j as usize])
                },
            })
            .collect();

        edges.extend(attachments.iter().map(|&[i, j]| Edge {
            i,
            j,
            rest_length: 0.0,
        }));

        Self { edges, compliance }
    }

    /// Build from explicit edges.
    pub fn new(edges: Vec<Edge>, compliance: f32) -> Self {
        Self { edges, compliance }
    }
}

impl Constraint for DistanceConstraint {
    /// For each edge:
    /// 1. C = |p_i - p_j| - rest_length
    /// 2. alpha = compliance / dt^2
    /// 3. s = -C / (w_i + w_j + alpha) / len
    /// 4. p_i += s * w_i * (p_i - p_j), p_j -= s * w_j * (p_i - p_j)
    fn solve(&mut self, particles: &mut ParticleSet, dt: f32) {
        let alpha = self.compliance / (dt * dt);
        for edge in &self.edges {
            solve_pair(particles, edge.i as usize, edge.j as usize, edge.rest_length, alpha);
        }
    }

    fn name(&self) -> &'static str {
        "distance"
    }
}

/// Project one pair of particles toward `rest_length`.
///
/// No-op when both particles are immovable or coincident.
#[inline]
pub(crate) fn solve_pair(
    particles: &mut ParticleSet,
    i: usize,
    j: usize,
    rest_length: f32,
    alpha: f32,
) {
    let w_i = particles.inv_mass[i];
    let w_j = particles.inv_mass[j];
    let w_sum = w_i + w_j;
    if w_sum == 0.0 {
        return;
    }

    let grad = diff(&particles.position, i, j);
    let len = grad.length();
    if len < EPSILON {
        return;
    }

    let c = len - rest_length;
    let s = -c / (w_sum + alpha) / len;

    if w_i != 0.0 {
        add_scaled(&mut particles.position, i, grad, s * w_i);
    }
    if w_j != 0.0 {
        add_scaled(&mut particles.position, j, grad, -s * w_j);
    }
}
