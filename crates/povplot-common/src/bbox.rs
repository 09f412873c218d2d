//! Axis-aligned bounding boxes in model space.

use serde::{Deserialize, Serialize};

/// An axis-aligned box enclosing a set of 3D points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point, or `None` for an empty slice.
    pub fn from_points(points: &[[f64; 3]]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bbox = Self::new(*first, *first);
        for p in rest {
            for axis in 0..3 {
                bbox.min[axis] = bbox.min[axis].min(p[axis]);
                bbox.max[axis] = bbox.max[axis].max(p[axis]);
            }
        }
        Some(bbox)
    }

    /// Box center.
    pub fn center(&self) -> [f64; 3] {
        [
            0.5 * (self.min[0] + self.max[0]),
            0.5 * (self.min[1] + self.max[1]),
            0.5 * (self.min[2] + self.max[2]),
        ]
    }

    /// Edge lengths along x, y and z.
    pub fn extent(&self) -> [f64; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    /// Length of the main diagonal.
    pub fn diagonal(&self) -> f64 {
        let [dx, dy, dz] = self.extent();
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Radius of the sphere through all eight corners.
    pub fn bounding_radius(&self) -> f64 {
        0.5 * self.diagonal()
    }

    /// Index of the axis with the smallest extent.
    ///
    /// Ties resolve towards z, then y, then x.
    pub fn thinnest_axis(&self) -> usize {
        let extent = self.extent();
        let mut best = 2;
        for axis in [1, 0] {
            if extent[axis] < extent[best] {
                best = axis;
            }
        }
        best
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, p: [f64; 3]) -> bool {
        (0..3).all(|axis| p[axis] >= self.min[axis] && p[axis] <= self.max[axis])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let bbox = BoundingBox::from_points(&[[1.0, -2.0, 3.0], [-1.0, 4.0, 0.0]]).unwrap();
        assert_eq!(bbox.min, [-1.0, -2.0, 0.0]);
        assert_eq!(bbox.max, [1.0, 4.0, 3.0]);
        assert_eq!(bbox.center(), [0.0, 1.0, 1.5]);
    }

    #[test]
    fn test_empty_points() {
        assert!(BoundingBox::from_points(&[]).is_none());
    }

    #[test]
    fn test_thinnest_axis_prefers_z_on_ties() {
        let cube = BoundingBox::new([0.0; 3], [1.0; 3]);
        assert_eq!(cube.thinnest_axis(), 2);

        let slab = BoundingBox::new([0.0; 3], [1.0, 0.1, 1.0]);
        assert_eq!(slab.thinnest_axis(), 1);
    }
}
