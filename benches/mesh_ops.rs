//! Benchmarks for mesh operations.

use criterion::{criterion_group, criterion_main, Criterion};
use dualcell::prelude::*;
use nalgebra::{Point3, Vector3};

/// Build an `n x n` grid of split unit squares through the loader path.
fn build_grid(n: usize, skew: f64) -> Mesh {
    let mut mesh = Mesh::new();
    for j in 0..=n {
        for i in 0..=n {
            // a deterministic tangential skew makes the diagonals
            // non-Delaunay so equiangulation has work to do
            let dx = skew * ((3 * i + 5 * j) as f64).sin();
            let dy = skew * ((7 * i + 2 * j) as f64).cos();
            mesh.add_vertex(
                Point3::new(i as f64 + dx, j as f64 + dy, 0.0),
                Vector3::z(),
            );
        }
    }
    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;
            for [u, v] in [
                [v00, v10],
                [v10, v11],
                [v11, v00],
                [v00, v11],
                [v11, v01],
                [v01, v00],
            ] {
                mesh.add_edge(u, v);
                mesh.add_edge(v, u);
            }
        }
    }
    mesh.generate_faces().unwrap();
    mesh.postprocess(true).unwrap();
    mesh.generate_dual_mesh();
    mesh
}

fn bench_construction(c: &mut Criterion) {
    c.bench_function("build_grid_10x10", |b| {
        b.iter(|| build_grid(10, 0.0));
    });
}

fn bench_dual_refresh(c: &mut Criterion) {
    let mut mesh = build_grid(20, 0.0);

    c.bench_function("update_dual_mesh_20x20", |b| {
        b.iter(|| mesh.update_dual_mesh());
    });

    c.bench_function("dual_area_all_20x20", |b| {
        b.iter(|| {
            let mut total = 0.0;
            for v in 0..mesh.num_vertices() {
                total += mesh.dual_area(v).unwrap();
            }
            total
        });
    });
}

fn bench_equiangulate(c: &mut Criterion) {
    c.bench_function("equiangulate_skewed_10x10", |b| {
        b.iter(|| {
            let mut mesh = build_grid(10, 0.15);
            mesh.equiangulate().unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_construction,
    bench_dual_refresh,
    bench_equiangulate
);
criterion_main!(benches);
