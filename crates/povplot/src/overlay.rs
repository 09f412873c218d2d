//! Placing rendered rasters on a plotting surface, and the colorbar legend.
//!
//! Extents are in surface pixels with the origin at the top-left corner.

use std::path::Path;

use povplot_common::{InputError, PlotResult};
use tiny_skia::{
    FilterQuality, GradientStop, IntSize, LinearGradient, Paint, PathBuilder, Pixmap, PixmapPaint,
    Point, Rect, SpreadMode, Stroke, Transform,
};

use crate::colormap::Color;
use crate::png;
use crate::raster::{ImageSize, Raster};
use crate::resolve::ColorBinding;

/// Colorbar width as a fraction of the image width.
const COLORBAR_FRACTION: f64 = 0.05;
const MIN_COLORBAR_WIDTH: f64 = 6.0;
/// Gap between image and colorbar, relative to the colorbar width.
const COLORBAR_GAP: f64 = 0.5;
/// Gradient stops used to draw a colorbar.
const COLORBAR_STOPS: usize = 64;

/// Axis-aligned rectangle on a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Extent {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whole-pixel size of the extent, at least one pixel per side.
    pub fn pixel_size(&self) -> Result<ImageSize, InputError> {
        if !(self.width.is_finite() && self.height.is_finite()) {
            return Err(InputError::invalid_parameter("extent", "must be finite"));
        }
        ImageSize::new(
            self.width.round().max(0.0) as u32,
            self.height.round().max(0.0) as u32,
        )
    }

    fn to_rect(self) -> Result<Rect, InputError> {
        Rect::from_xywh(
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
        )
        .ok_or_else(|| {
            InputError::invalid_parameter("extent", format!("not a drawable rectangle: {:?}", self))
        })
    }
}

/// A plotting surface that rendered images are composed onto.
pub trait HostSurface {
    /// Drawable area of the whole surface.
    fn bounds(&self) -> Extent;

    /// Draw `raster` scaled to `extent`.
    fn draw_raster(&mut self, raster: &Raster, extent: Extent) -> PlotResult<()>;

    /// Draw a vertical gradient legend for `binding`, `vmin` at the bottom.
    fn draw_colorbar(&mut self, extent: Extent, binding: &ColorBinding) -> PlotResult<()>;

    /// Outline an axes area.
    fn draw_frame(&mut self, _extent: Extent) -> PlotResult<()> {
        Ok(())
    }
}

/// A raster placed on a surface, with the mapping its colors came from.
#[derive(Debug, Clone)]
pub struct PlacedImage {
    pub extent: Extent,
    pub size: ImageSize,
    pub binding: ColorBinding,
}

/// Where the colorbar for an image goes: right of the image, or left of it
/// when the right side of the surface is too narrow. The bar never overlaps
/// the image; with no room on either side this fails.
pub fn colorbar_extent(image: Extent, bounds: Extent) -> Result<Extent, InputError> {
    let width = (image.width * COLORBAR_FRACTION).max(MIN_COLORBAR_WIDTH);
    let gap = width * COLORBAR_GAP;
    let x = if image.right() + gap + width <= bounds.right() {
        image.right() + gap
    } else if image.x - gap - width >= bounds.x {
        image.x - gap - width
    } else {
        return Err(InputError::invalid_parameter(
            "colorbar",
            format!(
                "no room for a {:.0}px colorbar beside the image at {:?}; shrink the axes",
                width + gap,
                image
            ),
        ));
    };
    Ok(Extent::new(x, image.y, width, image.height))
}

/// Draw the colorbar for `image`. The image itself is not touched.
pub fn overlay_colorbar<S: HostSurface + ?Sized>(
    surface: &mut S,
    image: &PlacedImage,
) -> PlotResult<Extent> {
    let extent = colorbar_extent(image.extent, surface.bounds())?;
    surface.draw_colorbar(extent, &image.binding)?;
    Ok(extent)
}

/// In-memory surface backed by a tiny-skia pixmap.
pub struct Figure {
    pixmap: Pixmap,
}

impl Figure {
    /// White, opaque figure.
    pub fn new(width: u32, height: u32) -> Result<Self, InputError> {
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            InputError::invalid_parameter(
                "figure",
                format!("cannot allocate a {}x{} figure", width, height),
            )
        })?;
        pixmap.fill(tiny_skia::Color::WHITE);
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Axes extent from figure fractions `[left, bottom, width, height]`,
    /// measured from the bottom-left corner.
    pub fn axes(&self, rect: [f64; 4]) -> Extent {
        let (w, h) = (self.width() as f64, self.height() as f64);
        let [left, bottom, width, height] = rect;
        Extent::new(
            left * w,
            (1.0 - bottom - height) * h,
            width * w,
            height * h,
        )
    }

    /// Straight-alpha RGBA of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    pub fn to_raster(&self) -> PlotResult<Raster> {
        let pixels = self
            .pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        Raster::from_rgba(self.width(), self.height(), pixels)
    }

    pub fn encode_png(&self) -> PlotResult<Vec<u8>> {
        Ok(png::encode_raster(&self.to_raster()?)?)
    }

    pub fn save_png(&self, path: &Path) -> PlotResult<()> {
        std::fs::write(path, self.encode_png()?)?;
        Ok(())
    }
}

impl HostSurface for Figure {
    fn bounds(&self) -> Extent {
        Extent::new(0.0, 0.0, self.width() as f64, self.height() as f64)
    }

    fn draw_raster(&mut self, raster: &Raster, extent: Extent) -> PlotResult<()> {
        if raster.width() == 0 || raster.height() == 0 {
            return Ok(());
        }
        let size = IntSize::from_wh(raster.width(), raster.height()).ok_or_else(|| {
            InputError::invalid_parameter("raster", "cannot draw an empty raster")
        })?;
        let premultiplied: Vec<u8> = raster
            .pixels()
            .chunks_exact(4)
            .flat_map(|px| {
                let a = px[3] as u16;
                let mul = |c: u8| ((c as u16 * a + 127) / 255) as u8;
                [mul(px[0]), mul(px[1]), mul(px[2]), px[3]]
            })
            .collect();
        let source = Pixmap::from_vec(premultiplied, size).ok_or_else(|| {
            InputError::invalid_parameter("raster", "pixel buffer does not match its size")
        })?;

        let paint = PixmapPaint {
            quality: FilterQuality::Nearest,
            ..PixmapPaint::default()
        };
        let transform = Transform::from_row(
            (extent.width / raster.width() as f64) as f32,
            0.0,
            0.0,
            (extent.height / raster.height() as f64) as f32,
            extent.x as f32,
            extent.y as f32,
        );
        self.pixmap
            .draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);
        Ok(())
    }

    fn draw_colorbar(&mut self, extent: Extent, binding: &ColorBinding) -> PlotResult<()> {
        let rect = extent.to_rect()?;
        let stops: Vec<GradientStop> = binding
            .colormap
            .sample(COLORBAR_STOPS)
            .into_iter()
            .enumerate()
            .map(|(i, rgb)| {
                let c = Color::from_unit(rgb);
                GradientStop::new(
                    i as f32 / (COLORBAR_STOPS - 1) as f32,
                    tiny_skia::Color::from_rgba8(c.r, c.g, c.b, 255),
                )
            })
            .collect();

        let shader = LinearGradient::new(
            Point::from_xy(rect.left(), rect.bottom()),
            Point::from_xy(rect.left(), rect.top()),
            stops,
            SpreadMode::Pad,
            Transform::identity(),
        )
        .ok_or_else(|| InputError::invalid_parameter("colorbar", "degenerate gradient"))?;

        let paint = Paint {
            shader,
            anti_alias: false,
            ..Paint::default()
        };
        self.pixmap.fill_rect(rect, &paint, Transform::identity(), None);
        self.draw_frame(extent)
    }

    fn draw_frame(&mut self, extent: Extent) -> PlotResult<()> {
        let path = PathBuilder::from_rect(extent.to_rect()?);
        let mut paint = Paint::default();
        paint.set_color_rgba8(0, 0, 0, 255);
        let stroke = Stroke {
            width: 1.0,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        Ok(())
    }
}
