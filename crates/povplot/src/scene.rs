//! POV-Ray scene synthesis.
//!
//! A [`SceneTemplate`] holds everything about a scene except the camera
//! block, which is regenerated per tile: each tile's camera is the same image
//! plane cut down to the tile's rows (see [`ViewBasis::band`]). Output is a
//! pure function of the inputs, so identical inputs always give
//! byte-identical text.

use std::fmt::{self, Write as _};

use nalgebra::Vector3;
use povplot_common::{Camera, InputError, Mesh};

use crate::raster::ImageSize;
use crate::resolve::{ColorBinding, VertexColors};
use crate::tiling::RenderTile;
use crate::view::ViewBasis;

/// Entries in the emitted `color_map`, within POV-Ray's 256-entry limit.
const COLOR_MAP_SAMPLES: usize = 250;

/// Texture coordinates used for `t = 0` and `t = 1`.
///
/// Kept away from the pattern's wrap-around at integer values.
const UV_LOW: f64 = 0.001;
const UV_HIGH: f64 = 0.999;

/// How colors are interpolated across a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shading {
    /// Interpolate the scalar value, then look it up in the colormap.
    #[default]
    ValueMapped,
    /// Interpolate the per-vertex RGB colors.
    VertexColor,
}

/// Scene-wide appearance settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneOptions {
    pub shading: Shading,
    pub transparent: bool,
    pub background: [f64; 3],
    pub ambient: f64,
    pub diffuse: f64,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            shading: Shading::default(),
            transparent: false,
            background: [0.0, 0.0, 0.0],
            ambient: 1.0,
            diffuse: 0.0,
        }
    }
}

/// Complete scene text for one renderer invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneDescription(String);

impl SceneDescription {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SceneDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Produces the scene text for each tile of a render.
pub trait SceneSource: Send + Sync {
    fn scene_for(&self, tile: &RenderTile) -> SceneDescription;

    /// Whether bands can be rendered separately. Sources that cannot are
    /// always rendered as one tile.
    fn supports_tiling(&self) -> bool {
        true
    }
}

/// Caller-provided scene text, rendered as-is in a single tile.
#[derive(Debug, Clone)]
pub struct RawScene(pub String);

impl SceneSource for RawScene {
    fn scene_for(&self, _tile: &RenderTile) -> SceneDescription {
        SceneDescription::new(self.0.clone())
    }

    fn supports_tiling(&self) -> bool {
        false
    }
}

/// Scene text with a per-tile camera block.
#[derive(Debug, Clone)]
pub struct SceneTemplate {
    head: String,
    tail: String,
    view: ViewBasis,
    focal_point: [f64; 3],
    size: ImageSize,
}

impl SceneTemplate {
    pub fn new(
        mesh: &Mesh,
        colors: &VertexColors,
        binding: &ColorBinding,
        camera: &Camera,
        size: ImageSize,
        options: &SceneOptions,
    ) -> Result<Self, InputError> {
        let view = ViewBasis::from_camera(camera, size)?;

        let mut head = String::new();
        head.push_str("#version 3.7;\n");
        head.push_str("global_settings { assumed_gamma 1.0 ambient_light rgb <1, 1, 1> }\n");
        if options.transparent {
            let [r, g, b] = options.background;
            let _ = writeln!(head, "background {{ rgbt <{}, {}, {}, 1> }}", r, g, b);
        } else {
            let _ = writeln!(head, "background {{ rgb {} }}", vec3(options.background));
        }

        let mut tail = String::new();
        let _ = writeln!(
            tail,
            "light_source {{ {} color rgb <1, 1, 1> shadowless }}",
            vec3(camera.location)
        );
        if !mesh.triangles().is_empty() {
            write_mesh(&mut tail, mesh, colors, binding, options);
        }

        Ok(Self {
            head,
            tail,
            view,
            focal_point: camera.focal_point,
            size,
        })
    }

    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Scene for the whole raster.
    pub fn full(&self) -> SceneDescription {
        self.render(&self.view)
    }

    /// Scene for one row band of the raster.
    pub fn for_tile(&self, tile: &RenderTile) -> SceneDescription {
        if tile.is_full(self.size.height) {
            return self.full();
        }
        let band = self.view.band(tile.row_start, tile.row_end, self.size.height);
        self.render(&band)
    }

    fn render(&self, view: &ViewBasis) -> SceneDescription {
        let mut text = String::with_capacity(self.head.len() + self.tail.len() + 256);
        text.push_str(&self.head);
        text.push_str("camera {\n  perspective\n");
        let _ = writeln!(text, "  location {}", vector(&view.location));
        let _ = writeln!(text, "  direction {}", vector(&view.direction));
        let _ = writeln!(text, "  right {}", vector(&view.right));
        let _ = writeln!(text, "  up {}", vector(&view.up));
        let _ = writeln!(text, "  focal_point {}", vec3(self.focal_point));
        text.push_str("}\n");
        text.push_str(&self.tail);
        SceneDescription(text)
    }
}

impl SceneSource for SceneTemplate {
    fn scene_for(&self, tile: &RenderTile) -> SceneDescription {
        self.for_tile(tile)
    }
}

fn vec3(v: [f64; 3]) -> String {
    format!("<{}, {}, {}>", v[0], v[1], v[2])
}

fn vector(v: &Vector3<f64>) -> String {
    vec3([v.x, v.y, v.z])
}

fn finish(options: &SceneOptions) -> String {
    format!(
        "finish {{ ambient {} diffuse {} }}",
        options.ambient, options.diffuse
    )
}

fn write_mesh(
    out: &mut String,
    mesh: &Mesh,
    colors: &VertexColors,
    binding: &ColorBinding,
    options: &SceneOptions,
) {
    let vertices = mesh.vertices();
    let triangles = mesh.triangles();

    out.push_str("mesh2 {\n");
    let _ = writeln!(out, "  vertex_vectors {{ {},", vertices.len());
    write_list(out, vertices.iter().map(|&v| vec3(v)));

    match (colors, options.shading) {
        (VertexColors::Uniform(rgb), _) => {
            write_faces(out, triangles, false);
            let _ = writeln!(
                out,
                "  texture {{ pigment {{ rgb {} }} {} }}",
                vec3(*rgb),
                finish(options)
            );
        }
        (VertexColors::Mapped { positions, .. }, Shading::ValueMapped) => {
            let _ = writeln!(out, "  uv_vectors {{ {},", positions.len());
            write_list(
                out,
                positions
                    .iter()
                    .map(|&t| format!("<{}, 0.5>", UV_LOW + (UV_HIGH - UV_LOW) * t)),
            );
            write_faces(out, triangles, false);
            out.push_str("  texture {\n    uv_mapping pigment {\n      gradient x\n      color_map {\n");
            let samples = binding.colormap.sample(COLOR_MAP_SAMPLES - 2);
            if let (Some(first), Some(last)) = (samples.first(), samples.last()) {
                let _ = writeln!(out, "        [0 rgb {}]", vec3(*first));
                let steps = (samples.len() - 1).max(1) as f64;
                for (i, rgb) in samples.iter().enumerate() {
                    let pos = UV_LOW + (UV_HIGH - UV_LOW) * i as f64 / steps;
                    let _ = writeln!(out, "        [{} rgb {}]", pos, vec3(*rgb));
                }
                let _ = writeln!(out, "        [1 rgb {}]", vec3(*last));
            }
            out.push_str("      }\n    }\n");
            let _ = writeln!(out, "    {}\n  }}", finish(options));
        }
        (VertexColors::Mapped { colors, .. }, Shading::VertexColor) => {
            let _ = writeln!(out, "  texture_list {{ {},", colors.len());
            let finish = finish(options);
            write_list(
                out,
                colors
                    .iter()
                    .map(|&rgb| format!("texture {{ pigment {{ rgb {} }} {} }}", vec3(rgb), finish)),
            );
            write_faces(out, triangles, true);
        }
    }
    out.push_str("}\n");
}

/// Comma-separated entries, one per line, closing the enclosing block.
fn write_list(out: &mut String, items: impl Iterator<Item = String>) {
    let mut first = true;
    for item in items {
        if !first {
            out.push_str(",\n");
        }
        first = false;
        out.push_str("    ");
        out.push_str(&item);
    }
    out.push_str("\n  }\n");
}

/// `face_indices`, optionally followed by one texture index per corner.
fn write_faces(out: &mut String, triangles: &[[usize; 3]], per_vertex_textures: bool) {
    let _ = writeln!(out, "  face_indices {{ {},", triangles.len());
    write_list(
        out,
        triangles.iter().map(|&[a, b, c]| {
            if per_vertex_textures {
                format!("<{}, {}, {}>, {}, {}, {}", a, b, c, a, b, c)
            } else {
                format!("<{}, {}, {}>", a, b, c)
            }
        }),
    );
}
