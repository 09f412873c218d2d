//! Camera geometry: the image plane spanned by a camera at a given raster size.
//!
//! The plane is `FILM_WIDTH` units wide at distance `focal_length` from the
//! eye, with height following the raster aspect ratio. Pixel `(x, y)` with
//! `y` growing downwards sees the ray
//! `direction + right * (x / w - 0.5) + up * (0.5 - y / h)`.

use nalgebra::Vector3;
use povplot_common::{Camera, InputError, FILM_WIDTH};

use crate::raster::ImageSize;

/// Camera expressed as explicit image-plane vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBasis {
    pub location: Vector3<f64>,
    pub direction: Vector3<f64>,
    pub right: Vector3<f64>,
    pub up: Vector3<f64>,
}

impl ViewBasis {
    pub fn from_camera(camera: &Camera, size: ImageSize) -> Result<Self, InputError> {
        camera.validate()?;

        let location = Vector3::from(camera.location);
        let forward = (Vector3::from(camera.look_at) - location).normalize();
        let up_hint = Vector3::from(camera.up_or_default());
        let right_unit = up_hint.cross(&forward).normalize();
        let up_unit = forward.cross(&right_unit);

        Ok(Self {
            location,
            direction: forward * camera.focal_length,
            right: right_unit * FILM_WIDTH,
            up: up_unit * (FILM_WIDTH * size.aspect()),
        })
    }

    /// The same image plane restricted to rows `[row_start, row_end)` of a
    /// `height`-row raster.
    ///
    /// Rays through the band's pixels coincide with the rays through the same
    /// pixels of the full view, so bands rendered separately stitch without
    /// seams.
    pub fn band(&self, row_start: u32, row_end: u32, height: u32) -> Self {
        let h = height as f64;
        let fraction = (row_end - row_start) as f64 / h;
        let center_offset = 0.5 - (row_start as f64 + row_end as f64) / (2.0 * h);
        Self {
            location: self.location,
            direction: self.direction + self.up * center_offset,
            right: self.right,
            up: self.up * fraction,
        }
    }

    /// Continuous pixel coordinates of a world point, or `None` when the
    /// point is not in front of the camera.
    ///
    /// Only valid for full (unbanded) views, whose vectors are orthogonal.
    pub fn project(&self, point: [f64; 3], size: ImageSize) -> Option<(f64, f64)> {
        let v = Vector3::from(point) - self.location;
        let depth = v.dot(&self.direction) / self.direction.norm_squared();
        if depth <= 0.0 {
            return None;
        }
        let a = v.dot(&self.right) / (depth * self.right.norm_squared());
        let b = v.dot(&self.up) / (depth * self.up.norm_squared());
        Some((
            (a + 0.5) * size.width as f64,
            (0.5 - b) * size.height as f64,
        ))
    }
}
