use cloth_core::grid::SpatialHashGrid;
use glam::Vec3;

/// Sorted copy of the adjacency list of `id`.
fn sorted_adjacent(grid: &SpatialHashGrid, id: usize) -> Vec<u32> {
    let mut ids = grid.adjacent(id).to_vec();
    ids.sort_unstable();
    ids
}

#[test]
fn test_query_all_finds_pairs_within_radius() {
    let mut grid = SpatialHashGrid::new(0.1, 64);
    let positions = vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(0.05, 0.0, 0.0),
        Vec3::new(0.0, 0.25, 0.0),
        Vec3::new(3.0, 3.0, 3.0),
    ];

    grid.build(&positions);
    grid.query_all(&positions, 0.1);

    assert_eq!(grid.adjacent(0), &[1]);
    assert_eq!(grid.adjacent(1), &[0]);
    assert!(grid.adjacent(2).is_empty(), "0.25 away is outside the radius");
    assert!(grid.adjacent(3).is_empty());
}

#[test]
fn test_query_all_radius_boundary() {
    let mut grid = SpatialHashGrid::new(0.5, 64);
    // 0.5 and 0.75 are exact in f32, so the squared distances are too.
    let positions = vec![
        Vec3::ZERO,
        Vec3::new(0.5, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -0.75),
    ];

    grid.build(&positions);
    grid.query_all(&positions, 0.5);

    assert_eq!(grid.adjacent(0), &[1], "a pair exactly at the radius is adjacent");
    assert!(
        !grid.adjacent(0).contains(&2),
        "a pair past the radius must not be adjacent"
    );
    assert!(grid.adjacent(2).is_empty());
}

#[test]
fn test_query_all_radius_larger_than_cell() {
    // Radius spans several cells: the query must scan all of them.
    let mut grid = SpatialHashGrid::new(0.1, 256);
    let positions = vec![Vec3::ZERO, Vec3::new(0.0, -0.35, 0.0)];

    grid.build(&positions);
    grid.query_all(&positions, 0.4);

    assert_eq!(grid.adjacent(0), &[1]);
    assert_eq!(grid.adjacent(1), &[0]);
}

#[test]
fn test_query_all_radius_covering_whole_table() {
    // The search box spans millions of cells but the table has 8 buckets.
    let mut grid = SpatialHashGrid::new(0.01, 8);
    let positions = vec![
        Vec3::ZERO,
        Vec3::new(4.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 9.0),
        Vec3::new(40.0, 0.0, 0.0),
    ];

    grid.build(&positions);
    grid.query_all(&positions, 10.0);

    assert_eq!(sorted_adjacent(&grid, 0), vec![1, 2]);
    assert_eq!(sorted_adjacent(&grid, 1), vec![0, 2]);
    assert_eq!(sorted_adjacent(&grid, 2), vec![0, 1]);
    assert!(grid.adjacent(3).is_empty(), "particle 3 is 36 away from its nearest neighbour");
}

#[test]
fn test_bucket_collisions_do_not_duplicate_ids() {
    // Small tables force distinct cells into the same bucket, both when the
    // search box covers the whole table and when it covers only part of it.
    let positions = vec![
        Vec3::ZERO,
        Vec3::new(0.5, 0.0, 0.0),
        Vec3::new(0.2, 0.3, 0.0),
        Vec3::new(0.25, -0.2, 0.3),
    ];
    for table_size in [1, 2, 3, 5, 7, 9, 11, 13] {
        let mut grid = SpatialHashGrid::new(1.0, table_size);
        grid.build(&positions);
        grid.query_all(&positions, 0.6);

        for i in 0..positions.len() {
            let ids = sorted_adjacent(&grid, i);
            let mut unique = ids.clone();
            unique.dedup();
            assert_eq!(ids, unique, "table {table_size}: particle {i} has duplicates");
            assert_eq!(ids.len(), 3, "table {table_size}: particle {i} lost a neighbour");
        }
    }
}

#[test]
fn test_query_all_is_symmetric_and_excludes_self() {
    let mut grid = SpatialHashGrid::new(0.3, 512);
    let mut positions = Vec::new();
    for x in 0..6 {
        for z in 0..6 {
            positions.push(Vec3::new(x as f32 * 0.2, 0.0, z as f32 * 0.2));
        }
    }

    grid.build(&positions);
    grid.query_all(&positions, 0.3);

    for i in 0..positions.len() {
        for &j in grid.adjacent(i) {
            assert_ne!(j as usize, i, "particle {i} listed as its own neighbor");
            assert!(
                grid.adjacent(j as usize).contains(&(i as u32)),
                "pair ({i}, {j}) only listed one way"
            );
            let d = positions[i].distance(positions[j as usize]);
            assert!(d <= 0.3 + 1e-6, "pair ({i}, {j}) is {d} apart");
        }
    }
    // Interior particle: 4 axis neighbours at 0.2, diagonals at 0.283.
    assert_eq!(grid.adjacent(7).len(), 8);
}

#[test]
fn test_query_all_matches_brute_force() {
    let mut grid = SpatialHashGrid::new(0.2, 2000);

    // Scatter particles along a spiral, some at negative coordinates.
    let mut positions = Vec::new();
    for i in 0..1000 {
        let t = i as f32 / 1000.0;
        let angle = t * std::f32::consts::TAU * 20.0;
        let r = 0.5 + t * 2.0;
        positions.push(Vec3::new(angle.cos() * r, (t - 0.5) * 3.0, angle.sin() * r));
    }

    grid.build(&positions);
    grid.query_all(&positions, 0.15);

    for i in 0..positions.len() {
        let expected: Vec<u32> = (0..positions.len())
            .filter(|&j| j != i && positions[i].distance_squared(positions[j]) <= 0.15 * 0.15)
            .map(|j| j as u32)
            .collect();
        assert_eq!(sorted_adjacent(&grid, i), expected, "particle {i}");
    }
}

#[test]
fn test_grid_empty() {
    let mut grid = SpatialHashGrid::new(1.0, 1024);
    let positions: Vec<Vec3> = vec![];
    grid.build(&positions);
    grid.query_all(&positions, 1.0);
    assert!(grid.adjacent(0).is_empty());
}

#[test]
fn test_grid_rebuild_with_new_layout() {
    let mut grid = SpatialHashGrid::new(1.0, 1024);

    let pos1 = vec![Vec3::ZERO, Vec3::new(5.0, 5.0, 5.0), Vec3::new(5.2, 5.0, 5.0)];
    grid.build(&pos1);
    grid.query_all(&pos1, 0.5);
    assert!(grid.adjacent(0).is_empty());
    assert_eq!(grid.adjacent(1), &[2]);

    let pos2 = vec![Vec3::ZERO, Vec3::new(0.2, 0.0, 0.0), Vec3::new(5.2, 5.0, 5.0)];
    grid.build(&pos2);
    grid.query_all(&pos2, 0.5);
    assert_eq!(grid.adjacent(0), &[1], "should find particle 1 near the origin after rebuild");
    assert!(grid.adjacent(2).is_empty());
}

#[test]
fn test_rebuild_clears_adjacency() {
    let mut grid = SpatialHashGrid::new(1.0, 16);
    let positions = vec![Vec3::ZERO, Vec3::new(0.5, 0.0, 0.0)];
    grid.build(&positions);
    grid.query_all(&positions, 1.0);
    assert_eq!(grid.adjacent(0), &[1]);

    grid.build(&positions);
    assert!(grid.adjacent(0).is_empty(), "adjacency must not outlive a rebuild");
}
