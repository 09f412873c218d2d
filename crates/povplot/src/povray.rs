//! Renderer invocation: one POV-Ray process per tile.

use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Instant;

use async_trait::async_trait;
use povplot_common::{PlotError, PlotResult, RenderError};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::compositor::{decode_tile, TileSettings};
use crate::config::RendererConfig;
use crate::raster::Raster;
use crate::scene::SceneDescription;
use crate::tiling::RenderTile;

const SCENE_FILE: &str = "scene.pov";
const OUTPUT_FILE: &str = "tile.png";

/// Lines of renderer stderr kept in failure logs.
const STDERR_TAIL_LINES: usize = 20;

/// Everything needed to render one band.
#[derive(Debug, Clone)]
pub struct TileJob {
    pub tile: RenderTile,
    pub width: u32,
    pub scene: SceneDescription,
    pub settings: TileSettings,
}

impl TileJob {
    pub fn height(&self) -> u32 {
        self.tile.height()
    }
}

/// Renders a single tile into a `width` x `tile.height()` raster.
#[async_trait]
pub trait TileRenderer: Send + Sync {
    async fn render_tile(&self, job: TileJob) -> PlotResult<Raster>;
}

/// Runs the external `povray` binary.
#[derive(Debug, Clone, Default)]
pub struct PovrayRenderer {
    config: RendererConfig,
}

impl PovrayRenderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }
}

#[async_trait]
impl TileRenderer for PovrayRenderer {
    async fn render_tile(&self, job: TileJob) -> PlotResult<Raster> {
        let start = Instant::now();
        let workdir = tempfile::Builder::new().prefix("povplot-").tempdir()?;
        tokio::fs::write(workdir.path().join(SCENE_FILE), job.scene.as_str()).await?;

        let args = command_args(
            &self.config,
            Path::new(SCENE_FILE),
            Path::new(OUTPUT_FILE),
            job.width,
            job.height(),
            &job.settings,
        );
        debug!(
            tile = job.tile.index,
            rows = ?(job.tile.row_start, job.tile.row_end),
            program = %self.config.program.display(),
            "Launching renderer"
        );

        let child = Command::new(&self.config.program)
            .args(&args)
            .current_dir(workdir.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RenderError::Spawn {
                program: self.config.program.clone(),
                source,
                script: job.scene.as_str().to_string(),
            })?;

        let timeout = self.config.timeout();
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                warn!(tile = job.tile.index, timeout_secs = timeout.as_secs(), "Renderer timed out");
                return Err(RenderError::TimedOut {
                    timeout,
                    script: job.scene.into_string(),
                }
                .into());
            }
        };

        if !output.status.success() {
            let code = exit_code(output.status);
            warn!(
                tile = job.tile.index,
                code = code,
                stderr = %stderr_tail(&output.stderr),
                "Renderer failed"
            );
            return Err(RenderError::Failed {
                code,
                script: job.scene.into_string(),
            }
            .into());
        }

        let bytes = match tokio::fs::read(workdir.path().join(OUTPUT_FILE)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(PlotError::Decode(
                    "renderer exited successfully but wrote no image".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };
        let raster = decode_tile(&bytes, job.width, job.height(), &job.settings)?;

        debug!(
            tile = job.tile.index,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Tile rendered"
        );
        Ok(raster)
    }
}

/// Command line for one invocation, scene and output paths relative to the
/// working directory.
pub fn command_args(
    config: &RendererConfig,
    scene: &Path,
    output: &Path,
    width: u32,
    height: u32,
    settings: &TileSettings,
) -> Vec<String> {
    let mut args = config.extra_args.clone();
    args.push(format!("+I{}", scene.display()));
    args.push(format!("+O{}", output.display()));
    args.push(format!("+W{}", width));
    args.push(format!("+H{}", height));
    args.push("+FN8".to_string());
    args.push("-D".to_string());
    args.push("-V".to_string());
    args.push(if settings.transparent { "+UA" } else { "-UA" }.to_string());
    if settings.antialias {
        args.push(format!("+A{}", config.antialias_threshold));
        args.push("+AM2".to_string());
        args.push(format!("+R{}", config.antialias_depth));
        args.push("-J".to_string());
    } else {
        args.push("-A".to_string());
    }
    if let Some(threads) = config.threads_per_process {
        args.push(format!("+WT{}", threads));
    }
    args.push("File_Gamma=1.0".to_string());
    args
}

/// Exit code of a finished process, or the negated signal number when it
/// was killed by one.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().collect();
    let skip = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[skip..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(settings: TileSettings, config: &RendererConfig) -> Vec<String> {
        command_args(
            config,
            Path::new("scene.pov"),
            Path::new("tile.png"),
            36,
            12,
            &settings,
        )
    }

    #[test]
    fn test_default_args() {
        let args = args(TileSettings::default(), &RendererConfig::default());
        assert_eq!(
            args,
            vec![
                "+Iscene.pov",
                "+Otile.png",
                "+W36",
                "+H12",
                "+FN8",
                "-D",
                "-V",
                "-UA",
                "-A",
                "File_Gamma=1.0"
            ]
        );
    }

    #[test]
    fn test_antialias_and_alpha_args() {
        let config = RendererConfig {
            extra_args: vec!["+Q9".to_string()],
            threads_per_process: Some(2),
            ..RendererConfig::default()
        };
        let settings = TileSettings {
            transparent: true,
            antialias: true,
            ..TileSettings::default()
        };
        let args = args(settings, &config);
        assert_eq!(args[0], "+Q9");
        assert!(args.contains(&"+UA".to_string()));
        assert!(args.contains(&"+A0.05".to_string()));
        assert!(args.contains(&"+AM2".to_string()));
        assert!(args.contains(&"+R3".to_string()));
        assert!(args.contains(&"+WT2".to_string()));
        assert!(!args.contains(&"-A".to_string()));
    }

    #[test]
    fn test_stderr_tail() {
        let text: String = (0..30).map(|i| format!("line {}\n", i)).collect();
        let tail = stderr_tail(text.as_bytes());
        assert!(tail.starts_with("line 10"));
        assert!(tail.ends_with("line 29"));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_code_from_signal() {
        use std::os::unix::process::ExitStatusExt;
        assert_eq!(exit_code(ExitStatus::from_raw(9)), -9);
        assert_eq!(exit_code(ExitStatus::from_raw(3 << 8)), 3);
    }
}
