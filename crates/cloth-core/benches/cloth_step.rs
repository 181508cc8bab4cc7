//! Benchmarks for the cloth step.

use cloth_core::grid::SpatialHashGrid;
use cloth_core::{Cloth, ClothConfig, ClothMesh};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec3;

const GRAVITY: Vec3 = Vec3::new(0.0, -9.8, 0.0);

fn grid_mesh(n: u32, spacing: f32) -> ClothMesh {
    let mut positions = Vec::new();
    for j in 0..n {
        for i in 0..n {
            positions.push(Vec3::new(i as f32 * spacing, -(j as f32) * spacing, 0.0));
        }
    }
    let mut indices = Vec::new();
    for j in 0..n - 1 {
        for i in 0..n - 1 {
            let a = j * n + i;
            let c = a + n;
            indices.extend_from_slice(&[a, c, a + 1, a + 1, c, c + 1]);
        }
    }
    ClothMesh::new(positions, indices).unwrap()
}

fn hanging_cloth(n: u32) -> Cloth {
    let config = ClothConfig {
        pin_top_corners: true,
        ..ClothConfig::default()
    };
    Cloth::new(grid_mesh(n, 0.02), config).unwrap()
}

fn bench_distance_bending(c: &mut Criterion) {
    c.bench_function("cloth_30x30_distance_bending_60_frames", |b| {
        b.iter(|| {
            let mut cloth = hanging_cloth(30);
            cloth.register_distance_constraint(0.0);
            cloth.register_performant_bending_constraint(0.5);
            for _ in 0..60 {
                cloth.step_frame(1.0 / 60.0, GRAVITY);
            }
            black_box(cloth.positions_flat()[0])
        });
    });
}

fn bench_isometric(c: &mut Criterion) {
    c.bench_function("cloth_30x30_isometric_60_frames", |b| {
        b.iter(|| {
            let mut cloth = hanging_cloth(30);
            cloth.register_distance_constraint(0.0);
            cloth.register_isometric_bending_constraint(0.5);
            for _ in 0..60 {
                cloth.step_frame(1.0 / 60.0, GRAVITY);
            }
            black_box(cloth.positions_flat()[0])
        });
    });
}

fn bench_self_collision(c: &mut Criterion) {
    c.bench_function("cloth_30x30_self_collision_60_frames", |b| {
        b.iter(|| {
            let mut cloth = hanging_cloth(30);
            cloth.register_distance_constraint(0.0);
            cloth.register_self_collision();
            for _ in 0..60 {
                cloth.step_frame(1.0 / 60.0, GRAVITY);
            }
            black_box(cloth.positions_flat()[0])
        });
    });
}

fn bench_grid_query(c: &mut Criterion) {
    let positions = grid_mesh(64, 0.02).positions;
    c.bench_function("grid_query_all_4096", |b| {
        let mut grid = SpatialHashGrid::new(0.02, 2 * positions.len());
        b.iter(|| {
            grid.build(&positions);
            grid.query_all(&positions, 0.04);
            black_box(grid.adjacent(0).len())
        });
    });
}

criterion_group!(
    benches,
    bench_distance_bending,
    bench_isometric,
    bench_self_collision,
    bench_grid_query
);
criterion_main!(benches);
