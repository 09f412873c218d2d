//! Parallel tile rendering and stitching.

use std::io;
use std::sync::Arc;
use std::time::Instant;

use povplot_common::{PlotError, PlotResult, RenderError};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::compositor::{stitch, TileSettings};
use crate::povray::{TileJob, TileRenderer};
use crate::raster::{ImageSize, Raster};
use crate::scene::SceneSource;
use crate::tiling::partition_rows;

/// Splits a render into row bands and runs them concurrently.
#[derive(Clone)]
pub struct Orchestrator {
    renderer: Arc<dyn TileRenderer>,
}

impl Orchestrator {
    pub fn new(renderer: Arc<dyn TileRenderer>) -> Self {
        Self { renderer }
    }

    /// Render `source` at `size` with at most `nprocs` tiles in flight.
    ///
    /// The first tile failure observed aborts every other tile, killing
    /// their processes, and is returned as-is.
    pub async fn render(
        &self,
        source: Arc<dyn SceneSource>,
        size: ImageSize,
        nprocs: usize,
        settings: TileSettings,
    ) -> PlotResult<Raster> {
        let start = Instant::now();
        let nprocs = nprocs.max(1);
        let requested = if source.supports_tiling() { nprocs } else { 1 };
        let tiles = partition_rows(size.height, requested);
        let tile_count = tiles.len();

        info!(
            width = size.width,
            height = size.height,
            tiles = tile_count,
            nprocs = nprocs,
            "Starting render"
        );

        // Never more permits than tiles; tokio caps the permit count.
        let semaphore = Arc::new(Semaphore::new(nprocs.min(tile_count)));
        let mut tasks = JoinSet::new();
        let mut scripts = Vec::with_capacity(tile_count);

        for tile in tiles {
            let scene = source.scene_for(&tile);
            scripts.push(scene.as_str().to_string());
            let job = TileJob {
                tile,
                width: size.width,
                scene,
                settings,
            };
            let renderer = Arc::clone(&self.renderer);
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| PlotError::Io(io::Error::new(io::ErrorKind::Other, e)))?;
                let raster = renderer.render_tile(job).await?;
                Ok::<_, PlotError>((tile.index, raster))
            });
        }

        let mut bands: Vec<Option<Raster>> = vec![None; tile_count];
        while let Some(joined) = tasks.join_next().await {
            let failure = match joined {
                Ok(Ok((index, raster))) => {
                    bands[index] = Some(raster);
                    continue;
                }
                Ok(Err(err)) => err,
                Err(join_err) if join_err.is_panic() => {
                    tasks.abort_all();
                    std::panic::resume_unwind(join_err.into_panic());
                }
                Err(_) => {
                    let index = bands.iter().position(Option::is_none).unwrap_or(0);
                    RenderError::Cancelled {
                        tile: index,
                        script: std::mem::take(&mut scripts[index]),
                    }
                    .into()
                }
            };

            warn!(error = %failure, "Tile failed, aborting remaining tiles");
            tasks.abort_all();
            while tasks.join_next().await.is_some() {}
            return Err(failure);
        }

        let bands = bands
            .into_iter()
            .enumerate()
            .map(|(index, band)| {
                band.ok_or_else(|| PlotError::Decode(format!("tile {} produced no raster", index)))
            })
            .collect::<PlotResult<Vec<_>>>()?;
        let raster = stitch(size.width, size.height, bands)?;

        info!(
            tiles = tile_count,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Render complete"
        );
        Ok(raster)
    }
}
