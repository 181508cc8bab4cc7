use glam::{Mat4, Vec3, Vec4};

use crate::constraints::Constraint;
use crate::math::{add_scaled, cot_theta, outer4, EPSILON};
use crate::particle::ParticleSet;
use crate::topology::{bending_patches, Topology};

/// Isometric bending constraint.
///
/// Each patch is two triangles sharing the edge p0-p1, with opposite vertices
/// p2 and p3. At construction a 4x4 curvature matrix
/// `Q = 3 / (A0 + A1) * K * K^T` is built from the cotangents of the angles
/// at the shared edge, giving the discrete bending energy
///
/// ```text
/// C = sum_jk Q_jk * (p_j . p_k)
/// ```
///
/// which is invariant to translation and zero for a flat rest state.
///
/// Q has rank one, so it is stored as the scaled weight vector
/// `k = sqrt(3 / (A0 + A1)) * K`. Then `v = sum_j k_j * p_j`, `C = |v|^2` and
/// `grad_j = k_j * v`. Evaluating C and its gradient from the same `v`
/// keeps the Lagrange step bounded when a patch is flat up to rounding.
///
/// Reference: "A Quadratic Bending Model for Inextensible Surfaces",
/// Bergou et al., 2006; Macklin, Müller, "Position Based Simulation Methods
/// in Computer Graphics", EG 2017 course notes.
pub struct IsometricBendingConstraint {
    /// Patches as `[p0, p1, p2, p3]`.
    pub patches: Vec<[u32; 4]>,
    /// Scaled cotangent weights per patch. Zero for degenerate patches.
    pub weights: Vec<Vec4>,
    /// XPBD compliance (inverse stiffness).
    pub compliance: f32,
}

impl IsometricBendingConstraint {
    pub fn from_topology(positions: &[Vec3], topology: &Topology, compliance: f32) -> Self {
        let patches = bending_patches(topology);
        let weights = patches
            .iter()
            .map(|&ids| curvature_weights(ids.map(|id| positions[id as usize])))
            .collect();
        Self {
            patches,
            weights,
            compliance,
        }
    }

    /// Curvature matrix Q of patch `p`.
    pub fn curvature_matrix(&self, p: usize) -> Mat4 {
        outer4(self.weights[p])
    }

    /// Bending energy `C` of patch `p` at the given positions.
    pub fn energy(&self, p: usize, positions: &[Vec3]) -> f32 {
        self.curvature_vector(p, positions).length_squared()
    }

    /// `v = sum_j k_j * p_j`
    #[inline]
    fn curvature_vector(&self, p: usize, positions: &[Vec3]) -> Vec3 {
        let k = self.weights[p].to_array();
        self.patches[p]
            .iter()
            .zip(k)
            .fold(Vec3::ZERO, |v, (&id, kj)| v + positions[id as usize] * kj)
    }
}

impl Constraint for IsometricBendingConstraint {
    fn solve(&mut self, particles: &mut ParticleSet, dt: f32) {
        let alpha = self.compliance / (dt * dt);

        for p in 0..self.patches.len() {
            let ids = self.patches[p].map(|id| id as usize);
            let k = self.weights[p].to_array();

            let v = self.curvature_vector(p, &particles.position);
            let c = v.length_squared();
            if c == 0.0 {
                continue;
            }

            // sum_j w_j * |grad_j|^2 with grad_j = k_j * v
            let mut sum = 0.0;
            for j in 0..4 {
                let w = particles.inv_mass[ids[j]];
                if w != 0.0 {
                    sum += w * k[j] * k[j] * c;
                }
            }
            let denom = sum + alpha;
            if denom < EPSILON {
                continue;
            }

            let delta_lambda = -0.5 * c / denom;
            for j in 0..4 {
                let w = particles.inv_mass[ids[j]];
                if w != 0.0 {
                    add_scaled(&mut particles.position, ids[j], v, k[j] * w * delta_lambda);
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "isometric_bending"
    }
}

/// Scaled cotangent weights `sqrt(3 / (A0 + A1)) * K` for one patch.
fn curvature_weights([p0, p1, p2, p3]: [Vec3; 4]) -> Vec4 {
    let e0 = p1 - p0;
    let e1 = p2 - p1;
    let e2 = p0 - p2;
    let e3 = p3 - p0;
    let e4 = p1 - p3;

    let cots = (
        cot_theta(e0, -e1),
        cot_theta(e0, -e2),
        cot_theta(e0, e3),
        cot_theta(e0, e4),
    );
    let (Some(cot01), Some(cot02), Some(cot03), Some(cot04)) = cots else {
        return Vec4::ZERO;
    };

    let area0 = 0.5 * e0.cross(e1).length();
    let area1 = 0.5 * e0.cross(e3).length();
    if area0 + area1 < EPSILON {
        return Vec4::ZERO;
    }

    let k = Vec4::new(
        cot01 + cot04,
        cot02 + cot03,
        -cot01 - cot02,
        -cot03 - cot04,
    );

    k * (3.0 / (area0 + area1)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curvature_weights_sum_to_zero() {
        let k = curvature_weights([
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.3, 1.0, 0.0),
            Vec3::new(0.6, -0.8, 0.2),
        ]);
        // Rows of Q sum to zero, which makes C translation invariant.
        assert!(k.element_sum().abs() < 1e-4, "weights sum to {}", k.element_sum());
    }

    #[test]
    fn test_degenerate_patch_has_zero_weights() {
        let k = curvature_weights([Vec3::ZERO, Vec3::X, Vec3::X * 2.0, Vec3::Y]);
        assert_eq!(k, Vec4::ZERO);
    }
}
