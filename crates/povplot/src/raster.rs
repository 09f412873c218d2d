//! RGBA rasters and image sizes.

use povplot_common::{InputError, PlotError, PlotResult};
use serde::{Deserialize, Serialize};

/// Size used when neither the caller nor a host axes provide one.
pub const DEFAULT_SIZE: ImageSize = ImageSize {
    width: 640,
    height: 480,
};

/// Raster dimensions in pixels. Both sides are positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Result<Self, InputError> {
        if width == 0 || height == 0 {
            return Err(InputError::invalid_parameter(
                "size",
                format!("must be positive, got {}x{}", width, height),
            ));
        }
        Ok(Self { width, height })
    }

    /// `height / width`.
    pub fn aspect(&self) -> f64 {
        self.height as f64 / self.width as f64
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl std::str::FromStr for ImageSize {
    type Err = InputError;

    /// Parse `WIDTHxHEIGHT`, e.g. `640x480`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InputError::invalid_parameter("size", format!("expected WxH, got '{}'", s));
        let (w, h) = s.split_once(['x', 'X']).ok_or_else(invalid)?;
        let width = w.trim().parse().map_err(|_| invalid())?;
        let height = h.trim().parse().map_err(|_| invalid())?;
        Self::new(width, height)
    }
}

/// Row-major RGBA8 pixels, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    /// Fully transparent black raster.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> PlotResult<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(PlotError::Decode(format!(
                "expected {} bytes for a {}x{} RGBA raster, got {}",
                expected,
                width,
                height,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Pixel at column `x`, row `y`.
    ///
    /// # Panics
    /// If the coordinates are outside the raster.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(x < self.width && y < self.height, "pixel ({}, {}) out of bounds", x, y);
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        self.pixels[idx..idx + 4].copy_from_slice(&rgba);
    }

    /// Bytes of row `y`.
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.width as usize * 4;
        let start = y as usize * stride;
        &self.pixels[start..start + stride]
    }

    /// Sorted distinct alpha values.
    pub fn alpha_levels(&self) -> Vec<u8> {
        let mut seen = [false; 256];
        for px in self.pixels.chunks_exact(4) {
            seen[px[3] as usize] = true;
        }
        (0..=255u8).filter(|&a| seen[a as usize]).collect()
    }
}
