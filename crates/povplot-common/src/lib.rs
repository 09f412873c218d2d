//! Common types shared by the povplot crates.

pub mod bbox;
pub mod camera;
pub mod error;
pub mod mesh;

pub use bbox::BoundingBox;
pub use camera::{Camera, DEFAULT_FOCAL_LENGTH, FILM_WIDTH};
pub use error::{InputError, PlotError, PlotResult, RenderError};
pub use mesh::{Mesh, MeshData};
