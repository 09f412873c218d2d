//! Renderer process configuration.
//!
//! Loaded from defaults, environment variables or a YAML file:
//!
//! ```yaml
//! program: /usr/local/bin/povray
//! extra_args: ["+Q9"]
//! timeout_secs: 120
//! antialias_threshold: 0.05
//! antialias_depth: 3
//! threads_per_process: 2
//! ```

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use povplot_common::{InputError, PlotResult};
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_PROGRAM: &str = "povray";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// How renderer processes are launched.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RendererConfig {
    #[serde(default = "default_program")]
    pub program: PathBuf,
    /// Passed to every invocation before the generated arguments.
    #[serde(default)]
    pub extra_args: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_antialias_threshold")]
    pub antialias_threshold: f64,
    #[serde(default = "default_antialias_depth")]
    pub antialias_depth: u32,
    /// Render threads per process (`+WT`). Left to the renderer when unset.
    #[serde(default)]
    pub threads_per_process: Option<usize>,
}

fn default_program() -> PathBuf {
    PathBuf::from(DEFAULT_PROGRAM)
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_antialias_threshold() -> f64 {
    0.05
}

fn default_antialias_depth() -> u32 {
    3
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            extra_args: Vec::new(),
            timeout_secs: default_timeout_secs(),
            antialias_threshold: default_antialias_threshold(),
            antialias_depth: default_antialias_depth(),
            threads_per_process: None,
        }
    }
}

impl RendererConfig {
    /// Defaults overridden by `POVPLOT_POVRAY` and `POVPLOT_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(program) = env::var("POVPLOT_POVRAY") {
            if !program.trim().is_empty() {
                config.program = PathBuf::from(program);
            }
        }
        if let Ok(raw) = env::var("POVPLOT_TIMEOUT_SECS") {
            match raw.trim().parse() {
                Ok(secs) => config.timeout_secs = secs,
                Err(_) => warn!(value = %raw, "Ignoring invalid POVPLOT_TIMEOUT_SECS"),
            }
        }
        config
    }

    pub fn from_yaml_str(yaml: &str) -> PlotResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| InputError::invalid_parameter("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> PlotResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn validate(&self) -> Result<(), InputError> {
        if self.timeout_secs == 0 {
            return Err(InputError::invalid_parameter("timeout_secs", "must be positive"));
        }
        if !(self.antialias_threshold.is_finite() && self.antialias_threshold >= 0.0) {
            return Err(InputError::invalid_parameter(
                "antialias_threshold",
                format!("must be non-negative, got {}", self.antialias_threshold),
            ));
        }
        if self.threads_per_process == Some(0) {
            return Err(InputError::invalid_parameter(
                "threads_per_process",
                "must be positive",
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RendererConfig::default();
        assert_eq!(config.program, PathBuf::from("povray"));
        assert_eq!(config.timeout(), Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = RendererConfig::from_yaml_str("timeout_secs: 12\nextra_args: ['+Q9']\n").unwrap();
        assert_eq!(config.timeout_secs, 12);
        assert_eq!(config.extra_args, vec!["+Q9".to_string()]);
        assert_eq!(config.antialias_depth, 3);
        assert_eq!(config.program, PathBuf::from(DEFAULT_PROGRAM));
    }

    #[test]
    fn test_yaml_rejects_zero_timeout() {
        assert!(RendererConfig::from_yaml_str("timeout_secs: 0").is_err());
        assert!(RendererConfig::from_yaml_str("threads_per_process: 0").is_err());
    }

    #[test]
    fn test_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("renderer.yaml");
        std::fs::write(&path, "program: /opt/povray/bin/povray\nthreads_per_process: 2\n").unwrap();
        let config = RendererConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.program, PathBuf::from("/opt/povray/bin/povray"));
        assert_eq!(config.threads_per_process, Some(2));
    }
}
