use glam::Vec3;

use crate::math::{as_flat, triangle_cross};

/// SoA particle storage.
///
/// This is the single arena every constraint and collision reads and
/// corrects in place; they only hold particle indices into it.
#[derive(Clone, Debug)]
pub struct ParticleSet {
    pub count: usize,
    pub position: Vec<Vec3>,
    /// Position before the current substep's integration, used to rebuild
    /// velocity in `post_solve`.
    pub prev_position: Vec<Vec3>,
    pub velocity: Vec<Vec3>,
    /// Inverse mass; 0.0 = pinned/immovable.
    pub inv_mass: Vec<f32>,
    /// Area-weighted vertex normals (unnormalized), derived not simulated.
    pub normal: Vec<Vec3>,
}

impl ParticleSet {
    /// Particles at rest at `positions`, all with inverse mass 1.0.
    pub fn new(positions: Vec<Vec3>) -> Self {
        let count = positions.len();
        Self {
            count,
            prev_position: positions.clone(),
            position: positions,
            velocity: vec![Vec3::ZERO; count],
            inv_mass: vec![1.0; count],
            normal: vec![Vec3::ZERO; count],
        }
    }

    #[inline]
    pub fn is_pinned(&self, i: usize) -> bool {
        self.inv_mass[i] == 0.0
    }

    /// Make particle `i` immovable.
    pub fn pin(&mut self, i: usize) {
        self.inv_mass[i] = 0.0;
        self.velocity[i] = Vec3::ZERO;
    }

    /// Accumulate face normals onto vertices.
    ///
    /// Each triangle adds a third of `e0 x e1` (length = twice its area) to
    /// its three vertices. The sum is left unnormalized.
    pub fn update_normals(&mut self, indices: &[u32]) {
        self.normal.fill(Vec3::ZERO);
        for tri in indices.chunks_exact(3) {
            let tri = [tri[0], tri[1], tri[2]];
            let c = triangle_cross(&self.position, tri) / 3.0;
            for &id in &tri {
                self.normal[id as usize] += c;
            }
        }
    }

    pub fn positions_flat(&self) -> &[f32] {
        as_flat(&self.position)
    }

    pub fn normals_flat(&self) -> &[f32] {
        as_flat(&self.normal)
    }
}
