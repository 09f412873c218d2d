//! Entry points: render a mesh or a raw scene to a raster, a destination or
//! a plotting surface.

use std::sync::Arc;

use povplot_common::{Camera, InputError, Mesh, PlotResult, DEFAULT_FOCAL_LENGTH};
use tracing::info;

use crate::colormap::ColormapRegistry;
use crate::compositor::TileSettings;
use crate::config::RendererConfig;
use crate::framing::frame_mesh;
use crate::orchestrator::Orchestrator;
use crate::output::{write_raster, Destination, ImageType};
use crate::overlay::{Extent, HostSurface, PlacedImage};
use crate::povray::{PovrayRenderer, TileRenderer};
use crate::raster::{ImageSize, Raster, DEFAULT_SIZE};
use crate::resolve::{resolve, ColorBinding, DEFAULT_SURFACE_COLOR};
use crate::scene::{RawScene, SceneOptions, SceneTemplate, Shading};

/// How a mesh is looked at and colored.
#[derive(Debug, Clone, PartialEq)]
pub struct TriplotOptions {
    /// Full camera. Derived from the mesh bounds when absent.
    pub camera: Option<Camera>,
    /// Focal length used when the camera is derived.
    pub focal_length: f64,
    pub cmap: Option<String>,
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    pub shading: Shading,
    /// Surface color for meshes without values.
    pub color: Option<[f64; 3]>,
    pub diffuse: f64,
    /// Skip the frame drawn around the axes on a host surface.
    pub hide_frame: bool,
}

impl Default for TriplotOptions {
    fn default() -> Self {
        Self {
            camera: None,
            focal_length: DEFAULT_FOCAL_LENGTH,
            cmap: None,
            vmin: None,
            vmax: None,
            shading: Shading::default(),
            color: None,
            diffuse: 0.0,
            hide_frame: false,
        }
    }
}

/// Output raster settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub size: Option<ImageSize>,
    pub transparent: bool,
    pub antialias: bool,
    /// Maximum concurrent renderer processes, and the number of row bands.
    pub nprocs: usize,
    /// Explicit image type, overriding the destination's extension.
    pub imgtype: Option<ImageType>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            size: None,
            transparent: false,
            antialias: false,
            nprocs: 1,
            imgtype: None,
        }
    }
}

impl RenderOptions {
    pub fn validate(&self) -> Result<(), InputError> {
        if self.nprocs == 0 {
            return Err(InputError::invalid_parameter("nprocs", "must be at least 1"));
        }
        Ok(())
    }

    fn tile_settings(&self) -> TileSettings {
        TileSettings {
            transparent: self.transparent,
            antialias: self.antialias,
            ..TileSettings::default()
        }
    }
}

/// Renders meshes and scenes through a [`TileRenderer`].
pub struct Plotter {
    orchestrator: Orchestrator,
    colormaps: ColormapRegistry,
}

impl Plotter {
    /// Plotter running the external renderer described by `config`.
    pub fn new(config: RendererConfig) -> Self {
        Self::with_renderer(Arc::new(PovrayRenderer::new(config)))
    }

    pub fn with_renderer(renderer: Arc<dyn TileRenderer>) -> Self {
        Self {
            orchestrator: Orchestrator::new(renderer),
            colormaps: ColormapRegistry::default(),
        }
    }

    pub fn colormaps(&self) -> &ColormapRegistry {
        &self.colormaps
    }

    pub fn colormaps_mut(&mut self) -> &mut ColormapRegistry {
        &mut self.colormaps
    }

    /// Render a mesh into an RGBA raster.
    pub async fn render_raster(
        &self,
        mesh: &Mesh,
        triplot: &TriplotOptions,
        options: &RenderOptions,
    ) -> PlotResult<Raster> {
        let size = options.size.unwrap_or(DEFAULT_SIZE);
        let (raster, _) = self.render_mesh(mesh, triplot, options, size).await?;
        Ok(raster)
    }

    /// Render a mesh and write it to `destination`.
    ///
    /// The image type is resolved before anything is rendered.
    pub async fn render_triplot(
        &self,
        destination: Destination<'_>,
        mesh: &Mesh,
        triplot: &TriplotOptions,
        options: &RenderOptions,
    ) -> PlotResult<()> {
        let imgtype = destination.resolve_image_type(options.imgtype)?;
        let raster = self.render_raster(mesh, triplot, options).await?;
        write_raster(&raster, destination, imgtype)?;
        info!(imgtype = %imgtype, "Wrote rendered mesh");
        Ok(())
    }

    /// Render caller-provided scene text as a single tile.
    pub async fn render_scene_raster(
        &self,
        scene: &str,
        options: &RenderOptions,
    ) -> PlotResult<Raster> {
        options.validate()?;
        let size = options.size.unwrap_or(DEFAULT_SIZE);
        self.orchestrator
            .render(
                Arc::new(RawScene(scene.to_string())),
                size,
                options.nprocs,
                options.tile_settings(),
            )
            .await
    }

    /// Render caller-provided scene text and write it to `destination`.
    pub async fn render_scene(
        &self,
        destination: Destination<'_>,
        scene: &str,
        options: &RenderOptions,
    ) -> PlotResult<()> {
        let imgtype = destination.resolve_image_type(options.imgtype)?;
        let raster = self.render_scene_raster(scene, options).await?;
        write_raster(&raster, destination, imgtype)?;
        info!(imgtype = %imgtype, "Wrote rendered scene");
        Ok(())
    }

    /// Render a mesh onto `surface` at `axes`.
    ///
    /// The raster size defaults to the axes size in surface pixels.
    pub async fn triplot<S: HostSurface + ?Sized>(
        &self,
        surface: &mut S,
        axes: Extent,
        mesh: &Mesh,
        triplot: &TriplotOptions,
        options: &RenderOptions,
    ) -> PlotResult<PlacedImage> {
        let size = match options.size {
            Some(size) => size,
            None => axes.pixel_size()?,
        };
        let (raster, binding) = self.render_mesh(mesh, triplot, options, size).await?;
        surface.draw_raster(&raster, axes)?;
        if !triplot.hide_frame {
            surface.draw_frame(axes)?;
        }
        Ok(PlacedImage {
            extent: axes,
            size,
            binding,
        })
    }

    async fn render_mesh(
        &self,
        mesh: &Mesh,
        triplot: &TriplotOptions,
        options: &RenderOptions,
        size: ImageSize,
    ) -> PlotResult<(Raster, ColorBinding)> {
        options.validate()?;
        let colormap = self.colormaps.get(triplot.cmap.as_deref())?;
        let binding = ColorBinding::for_mesh(mesh, colormap, triplot.vmin, triplot.vmax)?;
        let colors = resolve(
            mesh.values(),
            &binding,
            triplot.color.unwrap_or(DEFAULT_SURFACE_COLOR),
        );

        let camera = match &triplot.camera {
            Some(camera) => *camera,
            None => frame_mesh(mesh.vertices(), triplot.focal_length, size)?,
        };

        let scene_options = SceneOptions {
            shading: triplot.shading,
            transparent: options.transparent,
            diffuse: triplot.diffuse,
            ..SceneOptions::default()
        };
        let template = SceneTemplate::new(mesh, &colors, &binding, &camera, size, &scene_options)?;

        info!(
            vertices = mesh.vertices().len(),
            triangles = mesh.triangles().len(),
            colormap = binding.colormap.name(),
            vmin = binding.vmin,
            vmax = binding.vmax,
            "Rendering mesh"
        );

        let raster = self
            .orchestrator
            .render(Arc::new(template), size, options.nprocs, options.tile_settings())
            .await?;
        Ok((raster, binding))
    }
}
