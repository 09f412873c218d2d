//! Render triangle meshes through POV-Ray.
//!
//! A mesh with optional per-vertex values is turned into POV-Ray scene text
//! (colormap lookup, automatic camera framing), rendered as row bands by
//! concurrent `povray` processes, and stitched back into one RGBA raster that
//! can be written as PNG or JPEG or placed on a [`HostSurface`] with a
//! colorbar.

pub mod colormap;
pub mod compositor;
pub mod config;
pub mod framing;
pub mod orchestrator;
pub mod output;
pub mod overlay;
pub mod plot;
pub mod png;
pub mod povray;
pub mod raster;
pub mod resolve;
pub mod scene;
pub mod tiling;
pub mod view;

pub use colormap::{Color, Colormap, ColormapRegistry, DEFAULT_COLORMAP};
pub use compositor::TileSettings;
pub use config::RendererConfig;
pub use framing::frame_mesh;
pub use orchestrator::Orchestrator;
pub use output::{Destination, ImageType};
pub use overlay::{overlay_colorbar, Extent, Figure, HostSurface, PlacedImage};
pub use plot::{Plotter, RenderOptions, TriplotOptions};
pub use povplot_common::{
    BoundingBox, Camera, InputError, Mesh, MeshData, PlotError, PlotResult, RenderError,
    DEFAULT_FOCAL_LENGTH, FILM_WIDTH,
};
pub use povray::{PovrayRenderer, TileJob, TileRenderer};
pub use raster::{ImageSize, Raster, DEFAULT_SIZE};
pub use resolve::{resolve, ColorBinding, VertexColors};
pub use scene::{RawScene, SceneDescription, SceneOptions, SceneSource, SceneTemplate, Shading};
pub use tiling::{partition_rows, RenderTile};
