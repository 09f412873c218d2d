//! Decoding renderer output and assembling tiles into one raster.

use image::ImageFormat;
use povplot_common::{PlotError, PlotResult};

use crate::raster::Raster;

/// Output settings shared by every tile of one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSettings {
    pub transparent: bool,
    pub antialias: bool,
    /// Background color written by the scene, used to recover transparency
    /// from output without an alpha channel.
    pub background: [u8; 3],
}

impl Default for TileSettings {
    fn default() -> Self {
        Self {
            transparent: false,
            antialias: false,
            background: [0, 0, 0],
        }
    }
}

/// Decode one tile image and check it is `width` x `height`.
pub fn decode_tile(
    bytes: &[u8],
    width: u32,
    height: u32,
    settings: &TileSettings,
) -> PlotResult<Raster> {
    let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map_err(|e| PlotError::Decode(e.to_string()))?;
    let has_alpha = decoded.color().has_alpha();
    let rgba = decoded.to_rgba8();
    if rgba.dimensions() != (width, height) {
        return Err(PlotError::Decode(format!(
            "expected a {}x{} tile, got {}x{}",
            width,
            height,
            rgba.width(),
            rgba.height()
        )));
    }

    let mut raster = Raster::from_rgba(width, height, rgba.into_raw())?;
    apply_alpha(&mut raster, settings, has_alpha);
    Ok(raster)
}

/// Opaque output gets alpha 255 everywhere. Transparent output without an
/// alpha channel gets alpha 0 wherever it shows the background color.
pub fn apply_alpha(raster: &mut Raster, settings: &TileSettings, has_alpha: bool) {
    if !settings.transparent {
        for px in raster.pixels_mut().chunks_exact_mut(4) {
            px[3] = 255;
        }
    } else if !has_alpha {
        let bg = settings.background;
        for px in raster.pixels_mut().chunks_exact_mut(4) {
            px[3] = if px[..3] == bg { 0 } else { 255 };
        }
    }
}

/// Stack row bands, given in tile order, into a `width` x `height` raster.
pub fn stitch(width: u32, height: u32, bands: Vec<Raster>) -> PlotResult<Raster> {
    if let [_] = bands.as_slice() {
        let band = bands.into_iter().next().ok_or_else(no_bands)?;
        check_band(&band, width)?;
        if band.height() != height {
            return Err(coverage_error(band.height(), height));
        }
        return Ok(band);
    }

    let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
    let mut rows = 0;
    for band in &bands {
        check_band(band, width)?;
        rows += band.height();
        pixels.extend_from_slice(band.pixels());
    }
    if bands.is_empty() {
        return Err(no_bands());
    }
    if rows != height {
        return Err(coverage_error(rows, height));
    }
    Raster::from_rgba(width, height, pixels)
}

fn check_band(band: &Raster, width: u32) -> PlotResult<()> {
    if band.width() != width {
        return Err(PlotError::Decode(format!(
            "tile is {} pixels wide, expected {}",
            band.width(),
            width
        )));
    }
    Ok(())
}

fn coverage_error(rows: u32, height: u32) -> PlotError {
    PlotError::Decode(format!("tiles cover {} rows, expected {}", rows, height))
}

fn no_bands() -> PlotError {
    PlotError::Decode("no tiles to stitch".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(img: image::DynamicImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn rgb_tile() -> Vec<u8> {
        let mut img = image::RgbImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgb([0, 0, 0]));
        img.put_pixel(1, 0, image::Rgb([200, 10, 10]));
        png_bytes(image::DynamicImage::ImageRgb8(img))
    }

    #[test]
    fn test_decode_opaque_forces_alpha() {
        let mut img = image::RgbaImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgba([1, 2, 3, 0]));
        img.put_pixel(1, 0, image::Rgba([4, 5, 6, 100]));
        let bytes = png_bytes(image::DynamicImage::ImageRgba8(img));
        let raster = decode_tile(&bytes, 2, 1, &TileSettings::default()).unwrap();
        assert_eq!(raster.pixel(0, 0), [1, 2, 3, 255]);
        assert_eq!(raster.pixel(1, 0), [4, 5, 6, 255]);
    }

    #[test]
    fn test_decode_transparent_keeps_native_alpha() {
        let mut img = image::RgbaImage::new(1, 1);
        img.put_pixel(0, 0, image::Rgba([9, 9, 9, 128]));
        let bytes = png_bytes(image::DynamicImage::ImageRgba8(img));
        let settings = TileSettings {
            transparent: true,
            ..TileSettings::default()
        };
        let raster = decode_tile(&bytes, 1, 1, &settings).unwrap();
        assert_eq!(raster.pixel(0, 0), [9, 9, 9, 128]);
    }

    #[test]
    fn test_decode_transparent_without_alpha_keys_background() {
        let settings = TileSettings {
            transparent: true,
            ..TileSettings::default()
        };
        let raster = decode_tile(&rgb_tile(), 2, 1, &settings).unwrap();
        assert_eq!(raster.pixel(0, 0)[3], 0);
        assert_eq!(raster.pixel(1, 0), [200, 10, 10, 255]);
    }

    #[test]
    fn test_decode_rejects_garbage_and_wrong_size() {
        let settings = TileSettings::default();
        assert!(matches!(
            decode_tile(b"not an image", 2, 1, &settings),
            Err(PlotError::Decode(_))
        ));
        assert!(matches!(
            decode_tile(&rgb_tile(), 2, 2, &settings),
            Err(PlotError::Decode(_))
        ));
    }

    #[test]
    fn test_stitch_in_order() {
        let mut top = Raster::new(2, 1);
        top.set_pixel(0, 0, [1, 1, 1, 255]);
        let mut bottom = Raster::new(2, 2);
        bottom.set_pixel(1, 1, [2, 2, 2, 255]);
        let stitched = stitch(2, 3, vec![top, bottom]).unwrap();
        assert_eq!(stitched.pixel(0, 0), [1, 1, 1, 255]);
        assert_eq!(stitched.pixel(1, 2), [2, 2, 2, 255]);
    }

    #[test]
    fn test_stitch_checks_coverage() {
        assert!(stitch(2, 3, vec![Raster::new(2, 1)]).is_err());
        assert!(stitch(2, 2, vec![Raster::new(2, 1), Raster::new(3, 1)]).is_err());
        assert!(stitch(2, 2, vec![]).is_err());
    }
}
