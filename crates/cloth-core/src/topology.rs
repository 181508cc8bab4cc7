//! Quantities derived purely from mesh topology: per-particle inverse mass,
//! the triangle-edge neighbour table, and the edge and bending-patch lists
//! constraints are built from.
//!
//! Edges are numbered globally: edge `3 * t + j` of triangle `t` runs from
//! local vertex `j` to local vertex `(j + 1) % 3`.

use glam::Vec3;
use tracing::warn;

use crate::math::triangle_area;

/// Marks an open (boundary) edge in the neighbour table.
pub const NO_NEIGHBOR: i32 = -1;

/// Topology of a cloth mesh.
#[derive(Clone, Debug, Default)]
pub struct Topology {
    /// Triangle list, 3 vertex ids per triangle.
    pub indices: Vec<u32>,
    /// Per global edge: the matching edge of the adjacent triangle, or
    /// [`NO_NEIGHBOR`].
    pub neighbors: Vec<i32>,
}

impl Topology {
    pub fn new(indices: Vec<u32>) -> Self {
        let neighbors = build_neighbors(&indices);
        Self { indices, neighbors }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex ids of global edge `e`.
    #[inline]
    pub fn edge(&self, e: usize) -> (u32, u32) {
        let t = e / 3;
        let j = e % 3;
        (self.indices[3 * t + j], self.indices[3 * t + (j + 1) % 3])
    }

    /// Vertex of triangle `t` that is not on its local edge `j`.
    #[inline]
    fn opposite(&self, t: usize, j: usize) -> u32 {
        self.indices[3 * t + (j + 2) % 3]
    }
}

/// Per-particle inverse mass from incident triangle areas.
///
/// Every triangle hands a third of its area to each of its vertices as mass;
/// masses from shared triangles add, and the inverse mass is the reciprocal
/// of the sum. Zero-area triangles contribute no mass, and a particle whose
/// mass stays zero gets inverse mass 0 (immovable).
pub fn build_inverse_mass(positions: &[Vec3], indices: &[u32]) -> Vec<f32> {
    let mut mass = vec![0.0_f32; positions.len()];

    for tri in indices.chunks_exact(3) {
        let tri = [tri[0], tri[1], tri[2]];
        let area = triangle_area(positions, tri);
        if area <= 0.0 {
            continue;
        }
        let share = area / 3.0;
        for &id in &tri {
            mass[id as usize] += share;
        }
    }

    mass.into_iter()
        .map(|m| if m > 0.0 { 1.0 / m } else { 0.0 })
        .collect()
}

/// Pair each triangle edge with the matching edge of its neighbour.
///
/// Edges are keyed by their sorted vertex pair and sorted so that shared
/// edges become adjacent. A key seen exactly twice links both edges; a key
/// seen once is a boundary. Keys shared by more than two triangles are
/// non-manifold and left open on every side, which keeps the table
/// symmetric.
pub fn build_neighbors(indices: &[u32]) -> Vec<i32> {
    let num_edges = indices.len() / 3 * 3;
    let mut edges: Vec<(u32, u32, usize)> = Vec::with_capacity(num_edges);

    for t in 0..indices.len() / 3 {
        for j in 0..3 {
            let id0 = indices[3 * t + j];
            let id1 = indices[3 * t + (j + 1) % 3];
            edges.push((id0.min(id1), id0.max(id1), 3 * t + j));
        }
    }
    edges.sort_unstable();

    let mut neighbors = vec![NO_NEIGHBOR; num_edges];
    let mut non_manifold = 0usize;

    let mut start = 0;
    while start < edges.len() {
        let key = (edges[start].0, edges[start].1);
        let mut end = start + 1;
        while end < edges.len() && (edges[end].0, edges[end].1) == key {
            end += 1;
        }
        match end - start {
            1 => {}
            2 => {
                let a = edges[start].2;
                let b = edges[start + 1].2;
                neighbors[a] = b as i32;
                neighbors[b] = a as i32;
            }
            _ => non_manifold += 1,
        }
        start = end;
    }

    if non_manifold > 0 {
        warn!(non_manifold, "non-manifold edges left open");
    }

    neighbors
}

/// Edges for distance constraints, each shared edge taken once.
///
/// An edge is kept if it is open or if its own `(id0, id1)` runs in
/// ascending order; the matching edge of a consistently wound neighbour runs
/// the other way and is dropped.
pub fn unique_edges(topology: &Topology) -> Vec<[u32; 2]> {
    let mut edges = Vec::new();
    for e in 0..topology.triangle_count() * 3 {
        let (id0, id1) = topology.edge(e);
        if topology.neighbors[e] < 0 || id0 < id1 {
            edges.push([id0, id1]);
        }
    }
    edges
}

/// Four-particle bending patches, one per interior edge.
///
/// ```text
///      id2
///     /   \
///   id0---id1
///     \   /
///      id3
/// ```
///
/// `id0`, `id1` are the shared edge as wound in the first triangle, `id2` is
/// the first triangle's opposite vertex and `id3` the neighbour's.
pub fn bending_patches(topology: &Topology) -> Vec<[u32; 4]> {
    let mut patches = Vec::new();
    for t in 0..topology.triangle_count() {
        for j in 0..3 {
            let e = 3 * t + j;
            let n = topology.neighbors[e];
            // Each interior edge is visited from both triangles; keep one.
            if n < 0 || (n as usize) < e {
                continue;
            }
            let n = n as usize;
            let (id0, id1) = topology.edge(e);
            let id2 = topology.opposite(t, j);
            let id3 = topology.opposite(n / 3, n % 3);
            patches.push([id0, id1, id2, id3]);
        }
    }
    patches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_triangle_all_edges_open() {
        let neighbors = build_neighbors(&[0, 1, 2]);
        assert_eq!(neighbors, vec![NO_NEIGHBOR; 3]);
    }

    #[test]
    fn test_three_triangles_on_one_edge_left_open() {
        // Edge 0-1 shared by three triangles.
        let neighbors = build_neighbors(&[0, 1, 2, 1, 0, 3, 0, 1, 4]);
        assert!(neighbors.iter().all(|&n| n == NO_NEIGHBOR));
    }

    #[test]
    fn test_degenerate_triangle_contributes_no_mass() {
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::X * 2.0];
        let inv_mass = build_inverse_mass(&positions, &[0, 1, 2]);
        assert_eq!(inv_mass, vec![0.0; 3]);
    }
}
