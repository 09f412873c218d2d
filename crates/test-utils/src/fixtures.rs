//! Reference scenes shared by the rendering tests.
//!
//! Both meshes lie in the plane `z = focal_length` and span `[-9, 9]` in x and
//! y. Seen by [`reference_camera`] at [`REFERENCE_SIZE`], the square covers
//! exactly columns `9..27` and rows `3..21`.

use povplot::{Camera, ImageSize, Mesh};

/// 36x24 pixels, matching the 36-unit film width.
pub const REFERENCE_SIZE: ImageSize = ImageSize {
    width: 36,
    height: 24,
};

/// Rows and columns covered by the square mesh at [`REFERENCE_SIZE`].
pub const SQUARE_ROWS: std::ops::Range<u32> = 3..21;
pub const SQUARE_COLS: std::ops::Range<u32> = 9..27;

/// Camera at the origin looking down +z at the reference meshes.
pub fn reference_camera(focal_length: f64) -> Camera {
    Camera::looking_at([0.0, 0.0, 0.0], [0.0, 0.0, focal_length], focal_length)
}

/// Two triangles forming a square, values ramping 0 to 2 along x.
pub fn square_mesh(focal_length: f64) -> Mesh {
    square_mesh_with_values(focal_length, Some(vec![0.0, 0.0, 2.0, 2.0]))
}

pub fn square_mesh_with_values(focal_length: f64, values: Option<Vec<f64>>) -> Mesh {
    let z = focal_length;
    Mesh::new(
        vec![
            [-9.0, -9.0, z],
            [-9.0, 9.0, z],
            [9.0, -9.0, z],
            [9.0, 9.0, z],
        ],
        vec![[0, 1, 2], [1, 3, 2]],
        values,
    )
    .expect("square mesh is valid")
}

/// One triangle with a sloped edge, values 0, 1, 2.
pub fn triangle_mesh(focal_length: f64) -> Mesh {
    let z = focal_length;
    Mesh::new(
        vec![[-9.0, -9.0, z], [-9.0, 9.0, z], [9.0, 0.0, z]],
        vec![[0, 1, 2]],
        Some(vec![0.0, 1.0, 2.0]),
    )
    .expect("triangle mesh is valid")
}

/// Whether pixel `(x, y)` lies on the square at [`REFERENCE_SIZE`].
pub fn in_square(x: u32, y: u32) -> bool {
    SQUARE_COLS.contains(&x) && SQUARE_ROWS.contains(&y)
}

/// Mesh JSON as accepted by the command-line renderer.
pub const SQUARE_MESH_JSON: &str = r#"{
  "vertices": [[-9, -9, 50], [-9, 9, 50], [9, -9, 50], [9, 9, 50]],
  "triangles": [[0, 1, 2], [1, 3, 2]],
  "values": [0, 1, 2, 3]
}"#;
