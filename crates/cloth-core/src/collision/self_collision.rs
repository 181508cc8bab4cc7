use glam::Vec3;

use crate::collision::Collision;
use crate::grid::SpatialHashGrid;
use crate::math::{diff, dist_squared};
use crate::particle::ParticleSet;

/// Particle-particle self collision for cloth.
///
/// Keeps unpinned particles at least `thickness` apart. Pairs that were
/// already closer than `thickness` in the rest snapshot (seams, dense
/// regions) are only kept from getting closer than their rest distance.
pub struct SelfCollision {
    thickness: f32,
    /// Positions at cloth construction.
    rest_positions: Vec<Vec3>,
    /// Velocity averaging strength; `None` or `<= 0` disables it.
    damping: Option<f32>,
}

impl SelfCollision {
    pub fn new(rest_positions: Vec<Vec3>, thickness: f32, damping: Option<f32>) -> Self {
        Self {
            thickness,
            rest_positions,
            damping,
        }
    }

    pub fn thickness(&self) -> f32 {
        self.thickness
    }

    /// Average the implicit velocities of a colliding pair.
    fn damp(&self, particles: &mut ParticleSet, id0: usize, id1: usize) {
        let Some(damping) = self.damping.filter(|&d| d > 0.0) else {
            return;
        };
        let v0 = particles.position[id0] - particles.prev_position[id0];
        let v1 = particles.position[id1] - particles.prev_position[id1];
        let avg = (v0 + v1) * 0.5;
        particles.position[id0] += (avg - v0) * damping;
        particles.position[id1] += (avg - v1) * damping;
    }
}

impl Collision for SelfCollision {
    fn solve(&mut self, particles: &mut ParticleSet, grid: &SpatialHashGrid, _dt: f32) {
        let thickness2 = self.thickness * self.thickness;

        for id0 in 0..particles.count {
            if particles.is_pinned(id0) {
                continue;
            }

            for &id1 in grid.adjacent(id0) {
                let id1 = id1 as usize;
                // The table lists each pair from both sides; handle it once.
                if id1 <= id0 || particles.is_pinned(id1) {
                    continue;
                }

                let sep = diff(&particles.position, id1, id0);
                let dist2 = sep.length_squared();
                if dist2 > thickness2 || dist2 == 0.0 {
                    continue;
                }

                let rest_dist2 = dist_squared(&self.rest_positions, id0, id1);
                if dist2 > rest_dist2 {
                    continue;
                }
                let min_dist = if rest_dist2 < thickness2 {
                    rest_dist2.sqrt()
                } else {
                    self.thickness
                };

                let dist = dist2.sqrt();
                let correction = min_dist - dist;
                if correction <= 0.0 {
                    continue;
                }

                let push = sep * (correction / dist);
                particles.position[id0] -= push * 0.5;
                particles.position[id1] += push * 0.5;

                self.damp(particles, id0, id1);
            }
        }
    }

    fn needs_grid(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "self_collision"
    }
}
