//! Stand-ins for the external renderer.
//!
//! In-process fakes implement [`TileRenderer`] directly. Script fakes are
//! small `/bin/sh` programs that accept the same command line as `povray`
//! and are run through the real [`povplot::PovrayRenderer`].

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use povplot::{PlotResult, Raster, RenderError, TileJob, TileRenderer};

// ============================================================================
// In-process renderers
// ============================================================================

/// Fills every tile with one color and records the jobs it was given.
#[derive(Debug)]
pub struct SolidRenderer {
    color: [u8; 4],
    jobs: Mutex<Vec<TileJob>>,
}

impl SolidRenderer {
    pub fn new(color: [u8; 4]) -> Self {
        Self {
            color,
            jobs: Mutex::new(Vec::new()),
        }
    }

    /// Jobs received so far, in tile order.
    pub fn jobs(&self) -> Vec<TileJob> {
        let mut jobs = self.jobs.lock().unwrap().clone();
        jobs.sort_by_key(|job| job.tile.index);
        jobs
    }

    pub fn scenes(&self) -> Vec<String> {
        self.jobs()
            .into_iter()
            .map(|job| job.scene.into_string())
            .collect()
    }
}

#[async_trait]
impl TileRenderer for SolidRenderer {
    async fn render_tile(&self, job: TileJob) -> PlotResult<Raster> {
        let mut raster = Raster::new(job.width, job.height());
        for px in raster.pixels_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&self.color);
        }
        self.jobs.lock().unwrap().push(job);
        Ok(raster)
    }
}

/// Paints each pixel's red channel with its row in the full image and its
/// green channel with its tile index. Later tiles finish first.
#[derive(Debug, Default)]
pub struct RowIndexRenderer {
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl RowIndexRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most tiles ever rendering at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TileRenderer for RowIndexRenderer {
    async fn render_tile(&self, job: TileJob) -> PlotResult<Raster> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let delay = 20u64.saturating_sub(2 * job.tile.index as u64);
        tokio::time::sleep(Duration::from_millis(delay)).await;

        let mut raster = Raster::new(job.width, job.height());
        for y in 0..job.height() {
            let row = (job.tile.row_start + y) as u8;
            for x in 0..job.width {
                raster.set_pixel(x, y, [row, job.tile.index as u8, 0, 255]);
            }
        }

        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(raster)
    }
}

/// Fails one tile with a renderer error; every other tile hangs until
/// aborted, counting how many were started and how many ran to completion.
#[derive(Debug)]
pub struct FailingRenderer {
    fail_index: usize,
    code: i32,
    started: AtomicUsize,
    finished: AtomicUsize,
}

impl FailingRenderer {
    pub fn new(fail_index: usize, code: i32) -> Self {
        Self {
            fail_index,
            code,
            started: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        }
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TileRenderer for FailingRenderer {
    async fn render_tile(&self, job: TileJob) -> PlotResult<Raster> {
        self.started.fetch_add(1, Ordering::SeqCst);
        if job.tile.index == self.fail_index {
            return Err(RenderError::Failed {
                code: self.code,
                script: job.scene.into_string(),
            }
            .into());
        }
        tokio::time::sleep(Duration::from_secs(60)).await;
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok(Raster::new(job.width, job.height()))
    }
}

// ============================================================================
// Script renderers
// ============================================================================

/// Shell prologue that extracts the scene, output and height arguments.
const PARSE_ARGS: &str = r#"for arg in "$@"; do
  case "$arg" in
    +I*) scene="${arg#+I}" ;;
    +O*) out="${arg#+O}" ;;
    +H*) height="${arg#+H}" ;;
  esac
done
"#;

/// Write an executable `/bin/sh` script named `name` into `dir`.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    let script = format!("#!/bin/sh\n{}{}\n", PARSE_ARGS, body);
    std::fs::write(&path, script).expect("Failed to write fake renderer");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make fake renderer executable");
    }
    path
}

/// Exits with `code` without writing an image.
pub fn failing_script(dir: &Path, code: i32) -> PathBuf {
    write_script(dir, "povray-failing", &format!("exit {}", code))
}

/// Exits successfully without writing an image.
pub fn silent_script(dir: &Path) -> PathBuf {
    write_script(dir, "povray-silent", "exit 0")
}

/// Writes bytes that are not an image.
pub fn garbage_script(dir: &Path) -> PathBuf {
    write_script(dir, "povray-garbage", r#"printf 'not a png' > "$out""#)
}

/// Never finishes on its own. Records its pid in `pid_dir` first.
pub fn hanging_script(dir: &Path, pid_dir: &Path) -> PathBuf {
    write_script(
        dir,
        "povray-hanging",
        &format!(r#"echo $$ > "{}/$$"
exec sleep 600"#, pid_dir.display()),
    )
}

/// Copies every scene it is given into `record_dir`, then exits with `code`.
pub fn recording_script(dir: &Path, record_dir: &Path, code: i32) -> PathBuf {
    write_script(
        dir,
        "povray-recording",
        &format!(
            r#"cp "$scene" "{}/scene-$$.pov"
exit {}"#,
            record_dir.display(),
            code
        ),
    )
}

/// Writes a `width`-wide solid PNG of whatever height is requested, for
/// each height in `heights`. Other heights fail with exit code 9.
pub fn solid_png_script(dir: &Path, width: u32, heights: &[u32], rgba: [u8; 4]) -> PathBuf {
    let images = dir.join("images");
    std::fs::create_dir_all(&images).expect("Failed to create image directory");
    for &height in heights {
        let mut raster = Raster::new(width, height);
        for px in raster.pixels_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
        let png = povplot::png::encode_raster(&raster).expect("Failed to encode fake tile");
        std::fs::write(images.join(format!("{}.png", height)), png)
            .expect("Failed to write fake tile");
    }
    write_script(
        dir,
        "povray-solid",
        &format!(
            r#"src="{}/$height.png"
[ -f "$src" ] || exit 9
cp "$src" "$out""#,
            images.display()
        ),
    )
}

/// Pids recorded by [`hanging_script`].
pub fn recorded_pids(pid_dir: &Path) -> Vec<u32> {
    std::fs::read_dir(pid_dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter_map(|e| e.file_name().to_str().and_then(|s| s.parse().ok()))
                .collect()
        })
        .unwrap_or_default()
}

/// Whether a process with `pid` is still running. Zombies count as exited.
pub fn process_alive(pid: u32) -> bool {
    if cfg!(target_os = "linux") {
        return match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
            // State follows the parenthesized command name.
            Ok(stat) => !stat
                .rsplit(')')
                .next()
                .map(|rest| rest.trim_start().starts_with('Z'))
                .unwrap_or(false),
            Err(_) => false,
        };
    }
    std::process::Command::new("kill")
        .arg("-0")
        .arg(pid.to_string())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
