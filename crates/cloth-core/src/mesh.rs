//! Validated triangle mesh input.

use glam::{Mat4, Vec3};

use crate::error::{ClothError, ClothResult};
use crate::math::from_flat;

/// Indexed triangle mesh a cloth is built from.
///
/// Positions are in world space. `attachments` lists vertex pairs that are
/// pulled onto each other by a zero-length distance constraint.
#[derive(Clone, Debug, Default)]
pub struct ClothMesh {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub attachments: Vec<[u32; 2]>,
}

impl ClothMesh {
    /// Build from arenas, validating topology.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> ClothResult<Self> {
        let mesh = Self {
            positions,
            indices,
            attachments: Vec::new(),
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Build from renderer-style flat buffers (3 floats per vertex, 16-bit
    /// triangle indices).
    pub fn from_buffers(positions: &[f32], indices: &[u16]) -> ClothResult<Self> {
        if positions.len() % 3 != 0 {
            return Err(ClothError::PositionsNotTriples(positions.len()));
        }
        Self::new(
            from_flat(positions),
            indices.iter().map(|&i| u32::from(i)).collect(),
        )
    }

    /// Attach vertex pairs.
    pub fn with_attachments(mut self, attachments: Vec<[u32; 2]>) -> ClothResult<Self> {
        self.attachments = attachments;
        self.validate()?;
        Ok(self)
    }

    /// Bake a world transform into the positions.
    pub fn transformed(mut self, world: Mat4) -> Self {
        for p in &mut self.positions {
            *p = world.transform_point3(*p);
        }
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Triangle `t` as a vertex triple.
    #[inline]
    pub fn triangle(&self, t: usize) -> [u32; 3] {
        [
            self.indices[3 * t],
            self.indices[3 * t + 1],
            self.indices[3 * t + 2],
        ]
    }

    pub(crate) fn validate(&self) -> ClothResult<()> {
        if self.indices.is_empty() {
            return Err(ClothError::EmptyIndices);
        }
        if self.indices.len() % 3 != 0 {
            return Err(ClothError::IndicesNotTriangles(self.indices.len()));
        }
        let count = self.positions.len();
        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= count) {
            return Err(ClothError::IndexOutOfRange { index, count });
        }
        if let Some(&[a, b]) = self
            .attachments
            .iter()
            .find(|[a, b]| *a as usize >= count || *b as usize >= count)
        {
            return Err(ClothError::AttachmentOutOfRange(a, b));
        }
        Ok(())
    }
}
