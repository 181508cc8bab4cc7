use approx::assert_relative_eq;
use cloth_core::topology::{
    bending_patches, build_inverse_mass, build_neighbors, unique_edges, Topology, NO_NEIGHBOR,
};
use glam::Vec3;

/// Unit cube, vertex `x + 2y + 4z`, two outward-wound triangles per face.
fn cube() -> (Vec<Vec3>, Vec<u32>) {
    let positions = (0..8)
        .map(|i| Vec3::new((i & 1) as f32, ((i >> 1) & 1) as f32, ((i >> 2) & 1) as f32))
        .collect();
    let indices = vec![
        0, 2, 3, 0, 3, 1, // z = 0
        4, 5, 7, 4, 7, 6, // z = 1
        0, 1, 5, 0, 5, 4, // y = 0
        2, 6, 7, 2, 7, 3, // y = 1
        0, 4, 6, 0, 6, 2, // x = 0
        1, 3, 7, 1, 7, 5, // x = 1
    ];
    (positions, indices)
}

/// `nx` x `ny` vertex grid, consistently wound.
fn grid(nx: u32, ny: u32, s: f32) -> (Vec<Vec3>, Vec<u32>) {
    let mut positions = Vec::new();
    for j in 0..ny {
        for i in 0..nx {
            positions.push(Vec3::new(i as f32 * s, -(j as f32) * s, 0.0));
        }
    }
    let mut indices = Vec::new();
    for j in 0..ny - 1 {
        for i in 0..nx - 1 {
            let a = j * nx + i;
            let b = a + 1;
            let c = a + nx;
            let d = c + 1;
            indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }
    (positions, indices)
}

#[test]
fn test_closed_mesh_has_no_open_edges() {
    let (_, indices) = cube();
    let neighbors = build_neighbors(&indices);

    assert_eq!(neighbors.len(), indices.len());
    for (e, &n) in neighbors.iter().enumerate() {
        assert!(n >= 0, "edge {e} of a closed cube left open");
        assert_eq!(neighbors[n as usize], e as i32, "edge {e} -> {n} is not symmetric");
    }
}

#[test]
fn test_neighbors_share_vertices() {
    let (_, indices) = cube();
    let topology = Topology::new(indices);

    for e in 0..topology.neighbors.len() {
        let n = topology.neighbors[e] as usize;
        let (a, b) = topology.edge(e);
        let (c, d) = topology.edge(n);
        assert_eq!((a.min(b), a.max(b)), (c.min(d), c.max(d)));
        assert_ne!(e / 3, n / 3, "edge {e} paired within its own triangle");
    }
}

#[test]
fn test_inverse_mass_sums_to_area() {
    let (positions, indices) = cube();
    let inv_mass = build_inverse_mass(&positions, &indices);
    let mass: f32 = inv_mass.iter().map(|w| 1.0 / w).sum();
    assert_relative_eq!(mass, 6.0, epsilon = 1e-4);

    let (positions, indices) = grid(5, 4, 0.25);
    let inv_mass = build_inverse_mass(&positions, &indices);
    let mass: f32 = inv_mass.iter().map(|w| 1.0 / w).sum();
    assert_relative_eq!(mass, 1.0 * 0.75, epsilon = 1e-5);
}

#[test]
fn test_boundary_edges_of_open_grid() {
    let (_, indices) = grid(3, 3, 1.0);
    let neighbors = build_neighbors(&indices);

    let open = neighbors.iter().filter(|&&n| n == NO_NEIGHBOR).count();
    // Perimeter of a 2x2-quad grid.
    assert_eq!(open, 8);
}

#[test]
fn test_unique_edge_count() {
    for (nx, ny) in [(2, 2), (3, 3), (4, 2), (5, 7)] {
        let (_, indices) = grid(nx, ny, 1.0);
        let topology = Topology::new(indices);
        let edges = unique_edges(&topology);

        let expected = (nx - 1) * ny + nx * (ny - 1) + (nx - 1) * (ny - 1);
        assert_eq!(edges.len(), expected as usize, "{nx}x{ny} grid");

        let mut keys: Vec<(u32, u32)> = edges.iter().map(|&[a, b]| (a.min(b), a.max(b))).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), edges.len(), "{nx}x{ny} grid has duplicate edges");
    }
}

#[test]
fn test_bending_patch_count() {
    for (nx, ny) in [(2, 2), (3, 3), (4, 2), (5, 7)] {
        let (_, indices) = grid(nx, ny, 1.0);
        let topology = Topology::new(indices);
        let edges = (nx - 1) * ny + nx * (ny - 1) + (nx - 1) * (ny - 1);
        let boundary = 2 * ((nx - 1) + (ny - 1));

        let patches = bending_patches(&topology);
        assert_eq!(patches.len(), (edges - boundary) as usize, "{nx}x{ny} grid");
    }

    let (_, indices) = grid(3, 3, 1.0);
    assert_eq!(bending_patches(&Topology::new(indices)).len(), 8);
}

#[test]
fn test_bending_patch_layout() {
    let (_, indices) = grid(2, 2, 1.0);
    let patches = bending_patches(&Topology::new(indices));

    // Diagonal 2-1 of the first triangle, opposite vertices 0 and 3.
    assert_eq!(patches, vec![[2, 1, 0, 3]]);
}

#[test]
fn test_bending_patches_are_unique() {
    let (_, indices) = cube();
    let patches = bending_patches(&Topology::new(indices));

    // A closed cube has 18 edges, all interior.
    assert_eq!(patches.len(), 18);
    let mut keys: Vec<(u32, u32)> = patches
        .iter()
        .map(|&[a, b, _, _]| (a.min(b), a.max(b)))
        .collect();
    keys.sort_unstable();
    keys.dedup();
    assert_eq!(keys.len(), 18);
}
