//! Per-vertex color resolution.

use std::sync::Arc;

use povplot_common::{InputError, Mesh};

use crate::colormap::Colormap;

/// Color used for every vertex when the mesh carries no values.
pub const DEFAULT_SURFACE_COLOR: [f64; 3] = [0.8, 0.8, 0.8];

/// A colormap together with the value range it spans.
#[derive(Debug, Clone)]
pub struct ColorBinding {
    pub colormap: Arc<dyn Colormap>,
    pub vmin: f64,
    pub vmax: f64,
}

impl ColorBinding {
    pub fn new(colormap: Arc<dyn Colormap>, vmin: f64, vmax: f64) -> Result<Self, InputError> {
        if !(vmin.is_finite() && vmax.is_finite()) {
            return Err(InputError::invalid_parameter(
                "vmin/vmax",
                "must be finite",
            ));
        }
        if vmin > vmax {
            return Err(InputError::InvalidRange { vmin, vmax });
        }
        Ok(Self {
            colormap,
            vmin,
            vmax,
        })
    }

    /// Binding for a mesh, filling each missing bound from its values.
    ///
    /// A mesh without values spans `[0, 1]` unless told otherwise.
    pub fn for_mesh(
        mesh: &Mesh,
        colormap: Arc<dyn Colormap>,
        vmin: Option<f64>,
        vmax: Option<f64>,
    ) -> Result<Self, InputError> {
        let (lo, hi) = mesh.value_range().unwrap_or((0.0, 1.0));
        Self::new(colormap, vmin.unwrap_or(lo), vmax.unwrap_or(hi))
    }

    /// Position of `value` within the range, clamped to `[0, 1]`.
    ///
    /// A zero-width range maps everything to the middle of the colormap.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.vmax - self.vmin;
        if span == 0.0 {
            return 0.5;
        }
        ((value - self.vmin) / span).clamp(0.0, 1.0)
    }

    pub fn rgb(&self, value: f64) -> [f64; 3] {
        self.colormap.rgb(self.normalize(value))
    }
}

/// Resolved vertex colors.
#[derive(Debug, Clone, PartialEq)]
pub enum VertexColors {
    /// Every vertex shares one color.
    Uniform([f64; 3]),
    /// One normalized position and one RGB triple per vertex.
    Mapped {
        positions: Vec<f64>,
        colors: Vec<[f64; 3]>,
    },
}

/// Resolve one color per vertex.
pub fn resolve(values: Option<&[f64]>, binding: &ColorBinding, uniform: [f64; 3]) -> VertexColors {
    match values {
        None => VertexColors::Uniform(uniform),
        Some(values) => {
            let positions: Vec<f64> = values.iter().map(|&v| binding.normalize(v)).collect();
            let colors = positions.iter().map(|&t| binding.colormap.rgb(t)).collect();
            VertexColors::Mapped { positions, colors }
        }
    }
}
