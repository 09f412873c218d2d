//! Automatic camera placement.

use povplot_common::{BoundingBox, Camera, InputError, FILM_WIDTH};
use tracing::debug;

use crate::raster::ImageSize;

/// Extra distance factor so the silhouette stays clear of the raster border.
pub const FRAMING_MARGIN: f64 = 1.1;

/// Radius assumed for meshes whose vertices all coincide.
pub const MIN_FRAMING_RADIUS: f64 = 1.0e-3;

/// Derive a camera that keeps the whole mesh in view.
///
/// The camera looks at the bounding-box center along the box's thinnest
/// axis, from the negative side, far enough away that the bounding sphere
/// fits inside the narrower of the two fields of view implied by
/// `focal_length` and the raster aspect ratio.
pub fn frame_mesh(
    vertices: &[[f64; 3]],
    focal_length: f64,
    size: ImageSize,
) -> Result<Camera, InputError> {
    let bbox = BoundingBox::from_points(vertices).ok_or(InputError::EmptyMesh)?;
    if !(focal_length.is_finite() && focal_length > 0.0) {
        return Err(InputError::invalid_parameter(
            "focal_length",
            format!("must be positive, got {}", focal_length),
        ));
    }

    let center = bbox.center();
    let radius = bbox.bounding_radius().max(MIN_FRAMING_RADIUS);

    let half_width = 0.5 * FILM_WIDTH;
    let half_height = half_width * size.aspect();
    let half_angle = (half_width.min(half_height) / focal_length).atan();
    let distance = FRAMING_MARGIN * radius / half_angle.sin();

    let axis = bbox.thinnest_axis();
    let mut location = center;
    location[axis] -= distance;
    let up = if axis == 1 {
        [0.0, 0.0, 1.0]
    } else {
        [0.0, 1.0, 0.0]
    };

    debug!(
        radius = radius,
        distance = distance,
        axis = axis,
        "Framed mesh"
    );

    Ok(Camera {
        location,
        look_at: center,
        focal_point: center,
        focal_length,
        up: Some(up),
    })
}
