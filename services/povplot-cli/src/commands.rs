//! Subcommand implementations.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use povplot::output::write_raster;
use povplot::{
    overlay_colorbar, Camera, Destination, Extent, Figure, ImageSize, ImageType, Mesh, Plotter,
    RenderOptions, RendererConfig, Shading, TriplotOptions, DEFAULT_FOCAL_LENGTH, DEFAULT_SIZE,
};
use tracing::info;

/// Margin around the axes when drawing a colorbar figure, in pixels.
const FIGURE_MARGIN: u32 = 10;

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Mesh JSON: {"vertices": [[x, y, z], ...], "triangles": [[i, j, k], ...], "values": [...]}
    pub mesh: PathBuf,

    /// Output image (.png, .jpg or .jpeg)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Image size as WIDTHxHEIGHT
    #[arg(long)]
    pub size: Option<ImageSize>,

    /// Colormap name; append _r to reverse
    #[arg(long)]
    pub cmap: Option<String>,

    /// Value mapped to the low end of the colormap
    #[arg(long, allow_negative_numbers = true)]
    pub vmin: Option<f64>,

    /// Value mapped to the high end of the colormap
    #[arg(long, allow_negative_numbers = true)]
    pub vmax: Option<f64>,

    /// Camera JSON: {"location", "look_at", "focal_point", "focal_length", "up"}
    #[arg(long)]
    pub camera: Option<PathBuf>,

    /// Focal length of the automatically placed camera
    #[arg(long, default_value_t = DEFAULT_FOCAL_LENGTH)]
    pub focal_length: f64,

    #[arg(long, value_enum, default_value_t = ShadingArg::Value)]
    pub shading: ShadingArg,

    /// Diffuse lighting contribution
    #[arg(long, default_value_t = 0.0)]
    pub diffuse: f64,

    /// Transparent background
    #[arg(long)]
    pub transparent: bool,

    #[arg(long)]
    pub antialias: bool,

    /// Concurrent renderer processes
    #[arg(long, default_value_t = 1)]
    pub nprocs: usize,

    /// Image type, overriding the output extension
    #[arg(long)]
    pub imgtype: Option<ImageType>,

    /// Draw the image on a figure with a colorbar
    #[arg(long)]
    pub colorbar: bool,

    /// Extra JSON colormap files
    #[arg(long = "colormap-file")]
    pub colormap_files: Vec<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SceneArgs {
    /// POV-Ray scene file
    pub scene: PathBuf,

    /// Output image (.png, .jpg or .jpeg)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Image size as WIDTHxHEIGHT
    #[arg(long)]
    pub size: Option<ImageSize>,

    #[arg(long)]
    pub transparent: bool,

    #[arg(long)]
    pub antialias: bool,

    /// Image type, overriding the output extension
    #[arg(long)]
    pub imgtype: Option<ImageType>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ShadingArg {
    /// Interpolate values across faces, then apply the colormap
    Value,
    /// Interpolate per-vertex colors across faces
    Vertex,
}

impl From<ShadingArg> for Shading {
    fn from(arg: ShadingArg) -> Self {
        match arg {
            ShadingArg::Value => Shading::ValueMapped,
            ShadingArg::Vertex => Shading::VertexColor,
        }
    }
}

pub async fn render(config: RendererConfig, args: RenderArgs) -> Result<()> {
    let start = Instant::now();
    let mut plotter = Plotter::new(config);
    load_colormaps(&mut plotter, &args.colormap_files)?;

    let mesh_json = std::fs::read_to_string(&args.mesh)
        .with_context(|| format!("Failed to read mesh {}", args.mesh.display()))?;
    let mesh = Mesh::from_json(&mesh_json)
        .with_context(|| format!("Invalid mesh {}", args.mesh.display()))?;
    let camera = args.camera.as_deref().map(read_camera).transpose()?;

    let triplot = TriplotOptions {
        camera,
        focal_length: args.focal_length,
        cmap: args.cmap.clone(),
        vmin: args.vmin,
        vmax: args.vmax,
        shading: args.shading.into(),
        diffuse: args.diffuse,
        ..TriplotOptions::default()
    };
    let options = RenderOptions {
        size: args.size,
        transparent: args.transparent,
        antialias: args.antialias,
        nprocs: args.nprocs,
        imgtype: args.imgtype,
    };

    if args.colorbar {
        render_with_colorbar(&plotter, &mesh, &triplot, &options, &args.output).await?;
    } else {
        plotter
            .render_triplot(Destination::path(&args.output), &mesh, &triplot, &options)
            .await
            .with_context(|| format!("Failed to render {}", args.output.display()))?;
    }

    info!(
        output = %args.output.display(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Render complete"
    );
    Ok(())
}

/// Image on a white figure with its colorbar to the right.
async fn render_with_colorbar(
    plotter: &Plotter,
    mesh: &Mesh,
    triplot: &TriplotOptions,
    options: &RenderOptions,
    output: &Path,
) -> Result<()> {
    let destination = Destination::path(output);
    let imgtype = destination.resolve_image_type(options.imgtype)?;

    let size = options.size.unwrap_or(DEFAULT_SIZE);
    let bar_room = (size.width / 10).max(20);
    let mut figure = Figure::new(
        size.width + 2 * FIGURE_MARGIN + bar_room,
        size.height + 2 * FIGURE_MARGIN,
    )?;
    let axes = Extent::new(
        FIGURE_MARGIN as f64,
        FIGURE_MARGIN as f64,
        size.width as f64,
        size.height as f64,
    );

    let options = RenderOptions {
        size: Some(size),
        ..options.clone()
    };
    let placed = plotter
        .triplot(&mut figure, axes, mesh, triplot, &options)
        .await
        .with_context(|| format!("Failed to render {}", output.display()))?;
    overlay_colorbar(&mut figure, &placed)?;

    write_raster(&figure.to_raster()?, destination, imgtype)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(())
}

pub async fn scene(config: RendererConfig, args: SceneArgs) -> Result<()> {
    let text = std::fs::read_to_string(&args.scene)
        .with_context(|| format!("Failed to read scene {}", args.scene.display()))?;
    let options = RenderOptions {
        size: args.size,
        transparent: args.transparent,
        antialias: args.antialias,
        imgtype: args.imgtype,
        ..RenderOptions::default()
    };

    Plotter::new(config)
        .render_scene(Destination::path(&args.output), &text, &options)
        .await
        .with_context(|| format!("Failed to render scene {}", args.scene.display()))?;
    info!(output = %args.output.display(), "Scene rendered");
    Ok(())
}

pub fn list_colormaps(files: &[PathBuf]) -> Result<()> {
    let mut plotter = Plotter::new(RendererConfig::default());
    load_colormaps(&mut plotter, files)?;
    for name in plotter.colormaps().names() {
        println!("{}", name);
    }
    Ok(())
}

fn load_colormaps(plotter: &mut Plotter, files: &[PathBuf]) -> Result<()> {
    for path in files {
        let name = plotter
            .colormaps_mut()
            .load_file(path)
            .with_context(|| format!("Failed to load colormap {}", path.display()))?;
        info!(name = %name, "Loaded colormap");
    }
    Ok(())
}

fn read_camera(path: &Path) -> Result<Camera> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read camera {}", path.display()))?;
    let camera: Camera = serde_json::from_str(&json)
        .map_err(povplot::PlotError::from)
        .with_context(|| format!("Invalid camera {}", path.display()))?;
    camera.validate()?;
    Ok(camera)
}
