//! Triangle meshes with optional per-vertex scalars.

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::error::InputError;

/// A validated triangle mesh.
///
/// Construction checks every invariant the renderer relies on, so a `Mesh`
/// value is always safe to synthesize a scene from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mesh {
    vertices: Vec<[f64; 3]>,
    triangles: Vec<[usize; 3]>,
    values: Option<Vec<f64>>,
}

/// Unvalidated mesh as it arrives from JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct MeshData {
    pub vertices: Vec<[f64; 3]>,
    pub triangles: Vec<[usize; 3]>,
    #[serde(default)]
    pub values: Option<Vec<f64>>,
}

impl Mesh {
    pub fn new(
        vertices: Vec<[f64; 3]>,
        triangles: Vec<[usize; 3]>,
        values: Option<Vec<f64>>,
    ) -> Result<Self, InputError> {
        for (index, v) in vertices.iter().enumerate() {
            if v.iter().any(|c| !c.is_finite()) {
                return Err(InputError::NonFinite {
                    what: "vertex coordinate",
                    index,
                });
            }
        }

        let len = vertices.len();
        for (triangle, tri) in triangles.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i >= len) {
                return Err(InputError::IndexOutOfRange {
                    triangle,
                    index,
                    len,
                });
            }
        }

        if let Some(values) = &values {
            if values.len() != len {
                return Err(InputError::ValuesLength {
                    expected: len,
                    actual: values.len(),
                });
            }
            if let Some(index) = values.iter().position(|v| !v.is_finite()) {
                return Err(InputError::NonFinite {
                    what: "value",
                    index,
                });
            }
        }

        Ok(Self {
            vertices,
            triangles,
            values,
        })
    }

    /// Parse and validate a mesh from JSON.
    pub fn from_json(json: &str) -> Result<Self, crate::PlotError> {
        let data: MeshData = serde_json::from_str(json)?;
        Ok(Self::try_from(data)?)
    }

    pub fn vertices(&self) -> &[[f64; 3]] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    pub fn values(&self) -> Option<&[f64]> {
        self.values.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.vertices)
    }

    /// `(min, max)` of the scalar values, if any are present.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let values = self.values.as_deref()?;
        let (first, rest) = values.split_first()?;
        Some(
            rest.iter()
                .fold((*first, *first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
        )
    }
}

impl TryFrom<MeshData> for Mesh {
    type Error = InputError;

    fn try_from(data: MeshData) -> Result<Self, Self::Error> {
        Mesh::new(data.vertices, data.triangles, data.values)
    }
}
