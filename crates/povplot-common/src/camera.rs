//! Pinhole camera description.

use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Focal length used when the caller does not pick one, in film millimetres.
pub const DEFAULT_FOCAL_LENGTH: f64 = 50.0;

/// Width of the image plane at distance `focal_length`, matching 35 mm film.
pub const FILM_WIDTH: f64 = 36.0;

/// Default up direction.
pub const DEFAULT_UP: [f64; 3] = [0.0, 1.0, 0.0];

/// A fully specified pinhole camera.
///
/// Cameras are either supplied whole by the caller or derived whole by the
/// framer; there is no per-field defaulting apart from `up`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub location: [f64; 3],
    pub look_at: [f64; 3],
    /// Point brought into sharp focus.
    pub focal_point: [f64; 3],
    pub focal_length: f64,
    #[serde(default)]
    pub up: Option<[f64; 3]>,
}

impl Camera {
    /// Camera focused on the point it looks at.
    pub fn looking_at(location: [f64; 3], look_at: [f64; 3], focal_length: f64) -> Self {
        Self {
            location,
            look_at,
            focal_point: look_at,
            focal_length,
            up: None,
        }
    }

    pub fn with_up(mut self, up: [f64; 3]) -> Self {
        self.up = Some(up);
        self
    }

    pub fn up_or_default(&self) -> [f64; 3] {
        self.up.unwrap_or(DEFAULT_UP)
    }

    /// Reject cameras the scene synthesizer cannot turn into a view.
    pub fn validate(&self) -> Result<(), InputError> {
        let finite = |p: &[f64; 3]| p.iter().all(|c| c.is_finite());
        if !(finite(&self.location) && finite(&self.look_at) && finite(&self.focal_point)) {
            return Err(InputError::invalid_parameter(
                "camera",
                "coordinates must be finite",
            ));
        }
        if !(self.focal_length.is_finite() && self.focal_length > 0.0) {
            return Err(InputError::invalid_parameter(
                "camera.focal_length",
                format!("must be positive, got {}", self.focal_length),
            ));
        }
        if self.location == self.look_at {
            return Err(InputError::invalid_parameter(
                "camera",
                "location and look_at coincide",
            ));
        }
        let up = self.up_or_default();
        let forward = [
            self.look_at[0] - self.location[0],
            self.look_at[1] - self.location[1],
            self.look_at[2] - self.location[2],
        ];
        let cross = [
            up[1] * forward[2] - up[2] * forward[1],
            up[2] * forward[0] - up[0] * forward[2],
            up[0] * forward[1] - up[1] * forward[0],
        ];
        if cross.iter().all(|c| c.abs() < 1e-12) {
            return Err(InputError::invalid_parameter(
                "camera.up",
                "up vector is parallel to the viewing direction",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looking_at_focuses_on_target() {
        let cam = Camera::looking_at([0.0; 3], [0.0, 0.0, 50.0], 50.0);
        assert_eq!(cam.focal_point, cam.look_at);
        assert!(cam.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_focal_length() {
        let cam = Camera::looking_at([0.0; 3], [0.0, 0.0, 1.0], 0.0);
        assert!(cam.validate().is_err());
    }

    #[test]
    fn test_rejects_up_parallel_to_view() {
        let cam = Camera::looking_at([0.0; 3], [0.0, 5.0, 0.0], 50.0);
        assert!(cam.validate().is_err());
        assert!(cam.with_up([0.0, 0.0, 1.0]).validate().is_ok());
    }

    #[test]
    fn test_deserialize_without_up() {
        let json = r#"{"location":[0,0,0],"look_at":[0,0,50],"focal_point":[0,0,50],"focal_length":25}"#;
        let cam: Camera = serde_json::from_str(json).unwrap();
        assert_eq!(cam.up, None);
        assert_eq!(cam.focal_length, 25.0);
    }
}
