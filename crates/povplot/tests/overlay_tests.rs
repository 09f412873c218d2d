//! Tests for drawing rendered meshes and colorbars on plotting surfaces.

use std::sync::Arc;

use povplot::{
    overlay_colorbar, ColorBinding, Extent, Figure, HostSurface, PlotResult, Plotter, Raster,
    RenderOptions, TriplotOptions,
};
use test_utils::{square_mesh, temp_test_dir, SolidRenderer};

const GREEN: [u8; 4] = [0, 200, 0, 255];
const WHITE: [u8; 4] = [255, 255, 255, 255];

fn plotter() -> (Plotter, Arc<SolidRenderer>) {
    let renderer = Arc::new(SolidRenderer::new(GREEN));
    (Plotter::with_renderer(renderer.clone()), renderer)
}

fn gray_triplot() -> TriplotOptions {
    TriplotOptions {
        cmap: Some("gray".to_string()),
        ..TriplotOptions::default()
    }
}

/// Records what was drawn instead of drawing it.
#[derive(Default)]
struct RecordingSurface {
    rasters: Vec<((u32, u32), Extent)>,
    colorbars: Vec<(Extent, f64, f64)>,
}

impl HostSurface for RecordingSurface {
    fn bounds(&self) -> Extent {
        Extent::new(0.0, 0.0, 100.0, 100.0)
    }

    fn draw_raster(&mut self, raster: &Raster, extent: Extent) -> PlotResult<()> {
        self.rasters.push((raster.size(), extent));
        Ok(())
    }

    fn draw_colorbar(&mut self, extent: Extent, binding: &ColorBinding) -> PlotResult<()> {
        self.colorbars.push((extent, binding.vmin, binding.vmax));
        Ok(())
    }
}

// ============================================================================
// Placing images
// ============================================================================

#[tokio::test]
async fn test_triplot_fills_axes() {
    let (plotter, renderer) = plotter();
    let mut figure = Figure::new(200, 100).unwrap();
    let axes = Extent::new(20.0, 10.0, 100.0, 80.0);

    let placed = plotter
        .triplot(
            &mut figure,
            axes,
            &square_mesh(50.0),
            &gray_triplot(),
            &RenderOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!((placed.size.width, placed.size.height), (100, 80));
    assert_eq!(placed.extent, axes);
    assert_eq!((placed.binding.vmin, placed.binding.vmax), (0.0, 2.0));
    assert_eq!(renderer.jobs()[0].width, 100);

    assert_eq!(figure.pixel(70, 50), Some(GREEN));
    assert_eq!(figure.pixel(21, 11), Some(GREEN));
    assert_eq!(figure.pixel(150, 50), Some(WHITE));
    // Frame straddles the left edge of the axes.
    assert_ne!(figure.pixel(19, 50), Some(WHITE));
}

#[tokio::test]
async fn test_hide_frame() {
    let (plotter, _) = plotter();
    let mut figure = Figure::new(200, 100).unwrap();
    let axes = Extent::new(20.0, 10.0, 100.0, 80.0);
    let triplot = TriplotOptions {
        hide_frame: true,
        ..gray_triplot()
    };

    plotter
        .triplot(&mut figure, axes, &square_mesh(50.0), &triplot, &RenderOptions::default())
        .await
        .unwrap();

    assert_eq!(figure.pixel(19, 50), Some(WHITE));
    assert_eq!(figure.pixel(70, 50), Some(GREEN));
}

#[tokio::test]
async fn test_explicit_size_is_scaled_to_axes() {
    let (plotter, renderer) = plotter();
    let mut surface = RecordingSurface::default();
    let axes = surface.bounds();
    let options = RenderOptions {
        size: Some(povplot::ImageSize::new(10, 10).unwrap()),
        ..RenderOptions::default()
    };

    let placed = plotter
        .triplot(&mut surface, axes, &square_mesh(50.0), &gray_triplot(), &options)
        .await
        .unwrap();

    assert_eq!(surface.rasters, vec![((10, 10), axes)]);
    assert_eq!((placed.size.width, placed.size.height), (10, 10));
    assert_eq!(renderer.jobs()[0].height(), 10);
}

// ============================================================================
// Colorbar
// ============================================================================

#[tokio::test]
async fn test_colorbar_beside_image() {
    let (plotter, _) = plotter();
    let mut figure = Figure::new(200, 100).unwrap();
    let axes = Extent::new(20.0, 10.0, 100.0, 80.0);
    let placed = plotter
        .triplot(&mut figure, axes, &square_mesh(50.0), &gray_triplot(), &RenderOptions::default())
        .await
        .unwrap();

    let bar = overlay_colorbar(&mut figure, &placed).unwrap();
    assert!(bar.x >= axes.right());
    assert!(bar.right() <= 200.0);
    assert_eq!((bar.y, bar.height), (axes.y, axes.height));

    // Gray map: dark at vmin (bottom), light at vmax (top).
    let x = (bar.x + bar.width / 2.0) as u32;
    let bottom = figure.pixel(x, (bar.bottom() - 3.0) as u32).unwrap();
    let top = figure.pixel(x, (bar.y + 3.0) as u32).unwrap();
    assert!(bottom[0] < 40, "bottom of colorbar is {:?}", bottom);
    assert!(top[0] > 215, "top of colorbar is {:?}", top);

    // The image is left alone.
    assert_eq!(figure.pixel(70, 50), Some(GREEN));
}

#[tokio::test]
async fn test_colorbar_uses_placed_binding() {
    let (plotter, _) = plotter();
    let mut surface = RecordingSurface::default();
    let axes = Extent::new(0.0, 0.0, 80.0, 100.0);
    let triplot = TriplotOptions {
        vmin: Some(-1.0),
        vmax: Some(3.0),
        ..gray_triplot()
    };
    let placed = plotter
        .triplot(&mut surface, axes, &square_mesh(50.0), &triplot, &RenderOptions::default())
        .await
        .unwrap();

    let bar = overlay_colorbar(&mut surface, &placed).unwrap();
    assert!(bar.x >= axes.right());
    assert!(bar.right() <= 100.0);
    assert_eq!(surface.colorbars, vec![(bar, -1.0, 3.0)]);
}

#[tokio::test]
async fn test_colorbar_never_covers_image() {
    let (plotter, _) = plotter();
    let mut figure = Figure::new(100, 80).unwrap();
    let axes = figure.axes([0.0, 0.0, 1.0, 1.0]);
    let placed = plotter
        .triplot(&mut figure, axes, &square_mesh(50.0), &gray_triplot(), &RenderOptions::default())
        .await
        .unwrap();
    let before = figure.to_raster().unwrap();

    let err = overlay_colorbar(&mut figure, &placed).unwrap_err();
    assert_eq!(err.category(), "InputError");
    assert_eq!(figure.to_raster().unwrap(), before);
    assert_eq!(figure.pixel(97, 40), Some(GREEN));

    let mut surface = RecordingSurface::default();
    let placed = plotter
        .triplot(
            &mut surface,
            Extent::new(0.0, 0.0, 100.0, 100.0),
            &square_mesh(50.0),
            &gray_triplot(),
            &RenderOptions::default(),
        )
        .await
        .unwrap();
    assert!(overlay_colorbar(&mut surface, &placed).is_err());
    assert!(surface.colorbars.is_empty());
}

#[tokio::test]
async fn test_save_figure() {
    let (plotter, _) = plotter();
    let mut figure = Figure::new(64, 48).unwrap();
    let axes = figure.axes([0.1, 0.1, 0.7, 0.8]);
    let placed = plotter
        .triplot(&mut figure, axes, &square_mesh(50.0), &gray_triplot(), &RenderOptions::default())
        .await
        .unwrap();
    overlay_colorbar(&mut figure, &placed).unwrap();

    let dir = temp_test_dir();
    let path = dir.path().join("figure.png");
    figure.save_png(&path).unwrap();
    let image = image::open(&path).unwrap().to_rgba8();
    assert_eq!(image.dimensions(), (64, 48));
    let raster = figure.to_raster().unwrap();
    assert_eq!(image.into_raw(), raster.into_pixels());
}
