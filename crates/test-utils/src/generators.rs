//! Synthetic meshes with predictable structure.

use povplot::Mesh;

/// Flat `nx` x `ny` vertex grid over `[-1, 1]^2` at height `z`, split into
/// two triangles per cell.
///
/// Values are `x + y` at each vertex, so the scalar field is a diagonal ramp
/// from -2 to 2.
pub fn grid_mesh(nx: usize, ny: usize, z: f64) -> Mesh {
    assert!(nx >= 2 && ny >= 2, "grid needs at least 2x2 vertices");
    let coord = |i: usize, n: usize| -1.0 + 2.0 * i as f64 / (n - 1) as f64;

    let mut vertices = Vec::with_capacity(nx * ny);
    let mut values = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            let (x, y) = (coord(i, nx), coord(j, ny));
            vertices.push([x, y, z]);
            values.push(x + y);
        }
    }

    let mut triangles = Vec::with_capacity(2 * (nx - 1) * (ny - 1));
    for j in 0..ny - 1 {
        for i in 0..nx - 1 {
            let a = j * nx + i;
            let b = a + 1;
            let c = a + nx;
            let d = c + 1;
            triangles.push([a, b, c]);
            triangles.push([b, d, c]);
        }
    }

    Mesh::new(vertices, triangles, Some(values)).expect("generated grid is valid")
}

/// Height field `z = amplitude * sin(x) * cos(y)` over an `n` x `n` grid,
/// valued by height.
pub fn wave_mesh(n: usize, amplitude: f64) -> Mesh {
    let grid = grid_mesh(n, n, 0.0);
    let vertices: Vec<[f64; 3]> = grid
        .vertices()
        .iter()
        .map(|&[x, y, _]| [x, y, amplitude * (3.0 * x).sin() * (3.0 * y).cos()])
        .collect();
    let values = vertices.iter().map(|v| v[2]).collect();
    Mesh::new(vertices, grid.triangles().to_vec(), Some(values)).expect("generated wave is valid")
}

/// `n` evenly spaced values from `lo` to `hi` inclusive.
pub fn ramp(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => (0..n)
            .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
            .collect(),
    }
}
