//! Colormaps: normalized scalar position to RGB.
//!
//! The rest of the crate only sees the narrow [`Colormap`] trait, so a
//! different backend can be plugged in without touching the scene or render
//! code. Built-in maps:
//! - `viridis` (default), as a polynomial fit
//! - `jet`, `hot`, `gray` as piecewise-linear channel segments
//! - any map name suffixed with `_r` for its reverse
//!
//! Further maps can be registered from JSON color-stop files.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use povplot_common::{InputError, PlotResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Name of the colormap used when the caller does not pick one.
pub const DEFAULT_COLORMAP: &str = "viridis";

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from unit-range channels.
    pub fn from_unit(rgb: [f64; 3]) -> Self {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(q(rgb[0]), q(rgb[1]), q(rgb[2]), 255)
    }

    /// Parse `#rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

        Some(Self::new(r, g, b, 255))
    }
}

/// Maps a normalized position in `[0, 1]` to unit-range RGB.
///
/// Positions outside `[0, 1]` are clamped by every implementation.
pub trait Colormap: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn rgb(&self, t: f64) -> [f64; 3];

    fn color(&self, t: f64) -> Color {
        Color::from_unit(self.rgb(t))
    }

    /// `n` evenly spaced samples from `t = 0` to `t = 1` inclusive.
    fn sample(&self, n: usize) -> Vec<[f64; 3]> {
        match n {
            0 => Vec::new(),
            1 => vec![self.rgb(0.5)],
            _ => (0..n)
                .map(|i| self.rgb(i as f64 / (n - 1) as f64))
                .collect(),
        }
    }
}

/// Piecewise-linear map with independent anchor lists per channel.
///
/// Each anchor is `(position, value)`; positions must start at 0, end at 1
/// and be non-decreasing.
#[derive(Debug, Clone)]
pub struct SegmentedColormap {
    name: String,
    channels: [Vec<(f64, f64)>; 3],
}

impl SegmentedColormap {
    pub fn new(
        name: impl Into<String>,
        red: &[(f64, f64)],
        green: &[(f64, f64)],
        blue: &[(f64, f64)],
    ) -> Self {
        Self {
            name: name.into(),
            channels: [red.to_vec(), green.to_vec(), blue.to_vec()],
        }
    }

    /// Build from color stops sharing positions across channels.
    pub fn from_stops(name: impl Into<String>, stops: &[(f64, Color)]) -> Self {
        let channel = |pick: fn(&Color) -> u8| -> Vec<(f64, f64)> {
            stops
                .iter()
                .map(|(pos, c)| (*pos, pick(c) as f64 / 255.0))
                .collect()
        };
        Self {
            name: name.into(),
            channels: [channel(|c| c.r), channel(|c| c.g), channel(|c| c.b)],
        }
    }
}

fn eval_segments(anchors: &[(f64, f64)], t: f64) -> f64 {
    let Some(&(first_pos, first_val)) = anchors.first() else {
        return 0.0;
    };
    if t <= first_pos {
        return first_val;
    }
    for pair in anchors.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if t <= x1 {
            if x1 <= x0 {
                return y1;
            }
            return y0 + (y1 - y0) * (t - x0) / (x1 - x0);
        }
    }
    anchors[anchors.len() - 1].1
}

impl Colormap for SegmentedColormap {
    fn name(&self) -> &str {
        &self.name
    }

    fn rgb(&self, t: f64) -> [f64; 3] {
        let t = t.clamp(0.0, 1.0);
        [
            eval_segments(&self.channels[0], t),
            eval_segments(&self.channels[1], t),
            eval_segments(&self.channels[2], t),
        ]
    }
}

/// Map given by a per-channel polynomial in `t`, lowest degree first.
#[derive(Debug, Clone)]
pub struct PolynomialColormap {
    name: String,
    coefficients: Vec<[f64; 3]>,
}

impl PolynomialColormap {
    pub fn new(name: impl Into<String>, coefficients: &[[f64; 3]]) -> Self {
        Self {
            name: name.into(),
            coefficients: coefficients.to_vec(),
        }
    }
}

impl Colormap for PolynomialColormap {
    fn name(&self) -> &str {
        &self.name
    }

    fn rgb(&self, t: f64) -> [f64; 3] {
        let t = t.clamp(0.0, 1.0);
        let mut out = [0.0; 3];
        for (ch, value) in out.iter_mut().enumerate() {
            // Horner
            *value = self
                .coefficients
                .iter()
                .rev()
                .fold(0.0, |acc, c| acc * t + c[ch])
                .clamp(0.0, 1.0);
        }
        out
    }
}

/// Another map traversed from `t = 1` to `t = 0`.
#[derive(Debug, Clone)]
pub struct Reversed {
    name: String,
    inner: Arc<dyn Colormap>,
}

impl Colormap for Reversed {
    fn name(&self) -> &str {
        &self.name
    }

    fn rgb(&self, t: f64) -> [f64; 3] {
        self.inner.rgb(1.0 - t.clamp(0.0, 1.0))
    }
}

const VIRIDIS: [[f64; 3]; 7] = [
    [0.277_727_327_223_417_7, 0.005_407_344_544_966_578, 0.334_099_805_335_306_1],
    [0.105_093_043_108_577_4, 1.404_613_529_898_575, 1.384_590_162_594_685],
    [-0.330_861_828_725_556_3, 0.214_847_559_468_213, 0.095_095_163_028_236_59],
    [-4.634_230_498_983_486, -5.799_100_973_351_585, -19.332_440_956_279_87],
    [6.228_269_936_347_081, 14.179_933_366_805_09, 56.690_552_600_681_05],
    [4.776_384_997_670_288, -13.745_145_377_746_01, -65.353_032_633_372_34],
    [-5.435_455_855_934_631, 4.645_852_612_178_535, 26.312_435_249_583_2],
];

pub fn viridis() -> PolynomialColormap {
    PolynomialColormap::new("viridis", &VIRIDIS)
}

pub fn jet() -> SegmentedColormap {
    SegmentedColormap::new(
        "jet",
        &[(0.0, 0.0), (0.35, 0.0), (0.66, 1.0), (0.89, 1.0), (1.0, 0.5)],
        &[
            (0.0, 0.0),
            (0.125, 0.0),
            (0.375, 1.0),
            (0.64, 1.0),
            (0.91, 0.0),
            (1.0, 0.0),
        ],
        &[(0.0, 0.5), (0.11, 1.0), (0.34, 1.0), (0.65, 0.0), (1.0, 0.0)],
    )
}

pub fn hot() -> SegmentedColormap {
    SegmentedColormap::new(
        "hot",
        &[(0.0, 0.0416), (0.365079, 1.0), (1.0, 1.0)],
        &[(0.0, 0.0), (0.365079, 0.0), (0.746032, 1.0), (1.0, 1.0)],
        &[(0.0, 0.0), (0.746032, 0.0), (1.0, 1.0)],
    )
}

pub fn gray() -> SegmentedColormap {
    let ramp = [(0.0, 0.0), (1.0, 1.0)];
    SegmentedColormap::new("gray", &ramp, &ramp, &ramp)
}

/// Color stop in a colormap file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ColorStop {
    pub value: f64,
    pub color: String,
}

/// JSON colormap definition: stops at arbitrary values, rescaled to `[0, 1]`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ColormapFile {
    pub name: String,
    pub stops: Vec<ColorStop>,
}

impl ColormapFile {
    pub fn from_json(json: &str) -> PlotResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn into_colormap(self) -> Result<SegmentedColormap, InputError> {
        let invalid = |message: String| InputError::invalid_parameter("colormap", message);

        if self.stops.len() < 2 {
            return Err(invalid(format!(
                "'{}' needs at least two stops, got {}",
                self.name,
                self.stops.len()
            )));
        }

        let mut stops = self.stops;
        stops.sort_by(|a, b| a.value.total_cmp(&b.value));
        let lo = stops[0].value;
        let hi = stops[stops.len() - 1].value;
        if hi <= lo {
            return Err(invalid(format!("'{}' has an empty value range", self.name)));
        }

        let mut parsed = Vec::with_capacity(stops.len());
        for stop in &stops {
            let color = Color::from_hex(&stop.color)
                .ok_or_else(|| invalid(format!("bad color '{}'", stop.color)))?;
            parsed.push(((stop.value - lo) / (hi - lo), color));
        }
        Ok(SegmentedColormap::from_stops(self.name, &parsed))
    }
}

/// Named colormaps available to a plotter.
#[derive(Debug, Clone)]
pub struct ColormapRegistry {
    maps: HashMap<String, Arc<dyn Colormap>>,
}

impl Default for ColormapRegistry {
    fn default() -> Self {
        let mut registry = Self {
            maps: HashMap::new(),
        };
        registry.register(Arc::new(viridis()));
        registry.register(Arc::new(jet()));
        registry.register(Arc::new(hot()));
        let gray: Arc<dyn Colormap> = Arc::new(gray());
        registry.maps.insert("grey".to_string(), Arc::clone(&gray));
        registry.register(gray);
        registry
    }
}

impl ColormapRegistry {
    pub fn register(&mut self, map: Arc<dyn Colormap>) {
        self.maps.insert(map.name().to_string(), map);
    }

    /// Load a JSON colormap file and register it under its own name.
    pub fn load_file(&mut self, path: &Path) -> PlotResult<String> {
        let content = std::fs::read_to_string(path)?;
        let map = ColormapFile::from_json(&content)?.into_colormap()?;
        let name = map.name().to_string();
        debug!(name = %name, path = %path.display(), "Registered colormap");
        self.register(Arc::new(map));
        Ok(name)
    }

    /// Look up a map by name. `None` means the default map.
    pub fn get(&self, name: Option<&str>) -> Result<Arc<dyn Colormap>, InputError> {
        let name = name.unwrap_or(DEFAULT_COLORMAP);
        if let Some(map) = self.maps.get(name) {
            return Ok(Arc::clone(map));
        }
        if let Some(base) = name.strip_suffix("_r") {
            if let Some(inner) = self.maps.get(base) {
                return Ok(Arc::new(Reversed {
                    name: name.to_string(),
                    inner: Arc::clone(inner),
                }));
            }
        }
        Err(InputError::UnknownColormap(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.maps.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
