//! Shared mesh fixtures for the unit tests.
//!
//! All fixtures are flat (z = 0 unless noted) with vertex normals along +z,
//! built through the loader path: vertices, both directions of every edge,
//! face discovery, postprocessing with star ordering, and one dual-mesh
//! refresh.

use nalgebra::{Point3, Vector3};

use crate::mesh::Mesh;

/// Build a finalized flat mesh from positions and a triangle list.
pub(crate) fn build_flat(points: &[(f64, f64, f64)], tris: &[[usize; 3]]) -> Mesh {
    let mut mesh = Mesh::new();
    for &(x, y, z) in points {
        mesh.add_vertex(Point3::new(x, y, z), Vector3::z());
    }
    for tri in tris {
        for i in 0..3 {
            let u = tri[i];
            let v = tri[(i + 1) % 3];
            mesh.add_edge(u, v);
            mesh.add_edge(v, u);
        }
    }
    mesh.generate_faces().expect("face discovery");
    mesh.postprocess(true).expect("postprocess");
    mesh.generate_dual_mesh();
    mesh
}

/// Regular unit hexagon fan: centre vertex 0 at the origin, outer vertices
/// 1..=6 on the unit circle, six equilateral triangles and one hole face.
pub(crate) fn hexagon_fan() -> Mesh {
    let mut points = vec![(0.0, 0.0, 0.0)];
    for k in 0..6 {
        let theta = k as f64 * std::f64::consts::FRAC_PI_3;
        points.push((theta.cos(), theta.sin(), 0.0));
    }
    let tris: Vec<[usize; 3]> = (1..=6).map(|k| [0, k, k % 6 + 1]).collect();
    build_flat(&points, &tris)
}

/// Square fan: centre vertex 0, corners 1..=4, four right isoceles triangles
/// whose circumcenters sit on the hypotenuse midpoints.
pub(crate) fn square_fan() -> Mesh {
    let points = [
        (0.0, 0.0, 0.0),
        (1.0, 1.0, 0.0),
        (-1.0, 1.0, 0.0),
        (-1.0, -1.0, 0.0),
        (1.0, -1.0, 0.0),
    ];
    let tris = [[0, 1, 2], [0, 2, 3], [0, 3, 4], [0, 4, 1]];
    build_flat(&points, &tris)
}

/// Two triangles sharing the diagonal 0-1, with apexes 2 and 3 at height
/// `h` above and below. Small `h` makes the shared diagonal non-Delaunay.
pub(crate) fn diamond(h: f64) -> Mesh {
    let points = [
        (0.0, 0.0, 0.0),
        (1.0, 0.0, 0.0),
        (0.5, h, 0.0),
        (0.5, -h, 0.0),
    ];
    let tris = [[0, 1, 2], [0, 3, 1]];
    build_flat(&points, &tris)
}

/// A flat pocket whose bottom triangle is an obtuse spike over the long
/// boundary edge 0-1; the apex 2 is interior, so the spike is removable.
pub(crate) fn obtuse_pocket() -> Mesh {
    let points = [
        (0.0, 0.0, 0.0),
        (2.0, 0.0, 0.0),
        (1.0, 0.1, 0.0),
        (0.0, 1.5, 0.0),
        (2.0, 1.5, 0.0),
    ];
    let tris = [[0, 1, 2], [0, 2, 3], [1, 4, 2], [2, 4, 3]];
    build_flat(&points, &tris)
}

/// An obtuse spike whose three vertices all lie on the boundary, so pruning
/// must refuse to remove it.
pub(crate) fn obtuse_ridge() -> Mesh {
    let points = [
        (0.0, 0.0, 0.0),
        (2.0, 0.0, 0.0),
        (1.0, 0.1, 0.0),
        (0.0, 1.0, 0.0),
    ];
    let tris = [[0, 1, 2], [0, 2, 3]];
    build_flat(&points, &tris)
}

/// A regular octahedron with outward radial vertex normals: the smallest
/// closed surface without boundary the engine meets in practice.
pub(crate) fn octahedron() -> Mesh {
    let points = [
        (1.0, 0.0, 0.0),
        (-1.0, 0.0, 0.0),
        (0.0, 1.0, 0.0),
        (0.0, -1.0, 0.0),
        (0.0, 0.0, 1.0),
        (0.0, 0.0, -1.0),
    ];
    let tris = [
        [4, 0, 2],
        [4, 2, 1],
        [4, 1, 3],
        [4, 3, 0],
        [5, 2, 0],
        [5, 1, 2],
        [5, 3, 1],
        [5, 0, 3],
    ];
    let mut mesh = Mesh::new();
    for &(x, y, z) in &points {
        let r = Point3::new(x, y, z);
        mesh.add_vertex(r, r.coords.normalize());
    }
    for tri in &tris {
        for i in 0..3 {
            mesh.add_edge(tri[i], tri[(i + 1) % 3]);
            mesh.add_edge(tri[(i + 1) % 3], tri[i]);
        }
    }
    mesh.generate_faces().expect("face discovery");
    mesh.postprocess(true).expect("postprocess");
    mesh.generate_dual_mesh();
    mesh
}

/// An `n x n` grid of unit squares, each split along its up-right diagonal.
pub(crate) fn grid(n: usize) -> Mesh {
    let mut points = Vec::with_capacity((n + 1) * (n + 1));
    for j in 0..=n {
        for i in 0..=n {
            points.push((i as f64, j as f64, 0.0));
        }
    }
    let mut tris = Vec::with_capacity(2 * n * n);
    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;
            tris.push([v00, v10, v11]);
            tris.push([v00, v11, v01]);
        }
    }
    build_flat(&points, &tris)
}
