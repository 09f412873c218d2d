//! Error types for mesh rendering.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type alias using PlotError.
pub type PlotResult<T> = Result<T, PlotError>;

/// Primary error type for a render call.
///
/// Every variant is fatal to the call that produced it; no partial raster is
/// ever returned alongside an error.
#[derive(Debug, Error)]
pub enum PlotError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Failed to decode renderer output: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlotError {
    /// Short category name, stable across releases.
    pub fn category(&self) -> &'static str {
        match self {
            PlotError::Input(_) => "InputError",
            PlotError::Render(_) => "RenderError",
            PlotError::Decode(_) => "DecodeError",
            PlotError::Io(_) => "IoError",
        }
    }

    /// Process exit code used by command-line front ends.
    pub fn exit_code(&self) -> i32 {
        match self {
            PlotError::Input(_) => 2,
            PlotError::Render(_) => 3,
            PlotError::Decode(_) => 4,
            PlotError::Io(_) => 1,
        }
    }

    /// The renderer failure, if this is one.
    pub fn as_render_error(&self) -> Option<&RenderError> {
        match self {
            PlotError::Render(err) => Some(err),
            _ => None,
        }
    }
}

/// Malformed caller input. Always raised before any renderer process starts.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("Triangle {triangle} references vertex {index}, but the mesh has {len} vertices")]
    IndexOutOfRange {
        triangle: usize,
        index: usize,
        len: usize,
    },

    #[error("Expected {expected} values (one per vertex), got {actual}")]
    ValuesLength { expected: usize, actual: usize },

    #[error("Non-finite {what} at index {index}")]
    NonFinite { what: &'static str, index: usize },

    #[error("Cannot frame an empty mesh")]
    EmptyMesh,

    #[error("Invalid value range: vmin ({vmin}) is greater than vmax ({vmax})")]
    InvalidRange { vmin: f64, vmax: f64 },

    #[error("Unknown colormap: {0}")]
    UnknownColormap(String),

    #[error("Unsupported image type: {0}")]
    UnsupportedImageType(String),

    #[error("Cannot determine image type for {0:?}: no recognizable extension")]
    UnknownExtension(PathBuf),

    #[error("Cannot determine image type: destination has no name and no image type was given")]
    MissingImageType,

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },
}

impl InputError {
    pub fn invalid_parameter(param: &str, message: impl Into<String>) -> Self {
        InputError::InvalidParameter {
            param: param.to_string(),
            message: message.into(),
        }
    }
}

/// The external renderer did not produce an image.
///
/// Each variant carries the exact scene text that was fed to the renderer, so
/// a failure can be reproduced outside this crate.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Povray failed with code {code}")]
    Failed { code: i32, script: String },

    #[error("Povray did not finish within {timeout:?}")]
    TimedOut { timeout: Duration, script: String },

    #[error("Failed to launch {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
        script: String,
    },

    #[error("Render of tile {tile} was cancelled before it finished")]
    Cancelled { tile: usize, script: String },
}

impl RenderError {
    /// The scene text that produced this failure.
    pub fn script(&self) -> &str {
        match self {
            RenderError::Failed { script, .. }
            | RenderError::TimedOut { script, .. }
            | RenderError::Spawn { script, .. }
            | RenderError::Cancelled { script, .. } => script,
        }
    }

    /// Exit code of the renderer process, when it exited on its own.
    ///
    /// Processes killed by a signal report the negated signal number.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            RenderError::Failed { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PlotError {
    fn from(err: serde_json::Error) -> Self {
        PlotError::Input(InputError::invalid_parameter("json", err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_error_message_format() {
        let err = RenderError::Failed {
            code: -11,
            script: "invalid".to_string(),
        };
        assert_eq!(err.to_string(), "Povray failed with code -11");
        assert_eq!(err.script(), "invalid");
        assert_eq!(err.exit_code(), Some(-11));
    }

    #[test]
    fn test_categories_and_exit_codes() {
        let input: PlotError = InputError::EmptyMesh.into();
        assert_eq!(input.category(), "InputError");
        assert_eq!(input.exit_code(), 2);

        let decode = PlotError::Decode("truncated".to_string());
        assert_eq!(decode.category(), "DecodeError");
        assert_eq!(decode.exit_code(), 4);
    }

    #[test]
    fn test_timeout_has_no_exit_code() {
        let err = RenderError::TimedOut {
            timeout: Duration::from_secs(1),
            script: "scene".to_string(),
        };
        assert_eq!(err.exit_code(), None);
        assert_eq!(err.script(), "scene");
    }

    #[test]
    fn test_cancelled_is_a_render_error() {
        let err: PlotError = RenderError::Cancelled {
            tile: 2,
            script: "scene".to_string(),
        }
        .into();
        assert_eq!(err.category(), "RenderError");
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.to_string(), "Render of tile 2 was cancelled before it finished");
        assert_eq!(err.as_render_error().map(RenderError::script), Some("scene"));
    }
}
