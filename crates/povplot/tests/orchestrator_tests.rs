//! Tests for tile scheduling, failure propagation and stitching, using
//! in-process renderers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use povplot::{
    ImageSize, Orchestrator, PlotError, RawScene, RenderError, RenderTile, SceneDescription,
    SceneSource, TileSettings,
};
use test_utils::{FailingRenderer, RowIndexRenderer, SolidRenderer};

/// Labels each tile's scene with its row range.
struct LabeledSource;

impl SceneSource for LabeledSource {
    fn scene_for(&self, tile: &RenderTile) -> SceneDescription {
        SceneDescription::new(format!("rows {}..{}", tile.row_start, tile.row_end))
    }
}

fn size(width: u32, height: u32) -> ImageSize {
    ImageSize::new(width, height).unwrap()
}

// ============================================================================
// Stitching
// ============================================================================

#[tokio::test]
async fn test_bands_stitched_in_row_order() {
    let renderer = Arc::new(RowIndexRenderer::new());
    let orchestrator = Orchestrator::new(renderer.clone());

    let raster = orchestrator
        .render(Arc::new(LabeledSource), size(7, 23), 4, TileSettings::default())
        .await
        .unwrap();

    assert_eq!(raster.size(), (7, 23));
    for y in 0..23 {
        for x in 0..7 {
            assert_eq!(raster.pixel(x, y)[0], y as u8, "row {} out of place", y);
        }
    }
    // Last band absorbs the remainder: 5, 5, 5, 8 rows.
    assert_eq!(raster.pixel(0, 14)[1], 2);
    assert_eq!(raster.pixel(0, 15)[1], 3);
    assert_eq!(raster.pixel(0, 22)[1], 3);
}

#[tokio::test]
async fn test_tiled_render_matches_single_process() {
    let single = Orchestrator::new(Arc::new(RowIndexRenderer::new()))
        .render(Arc::new(LabeledSource), size(5, 40), 1, TileSettings::default())
        .await
        .unwrap();
    let tiled = Orchestrator::new(Arc::new(RowIndexRenderer::new()))
        .render(Arc::new(LabeledSource), size(5, 40), 6, TileSettings::default())
        .await
        .unwrap();

    // Red carries the global row; green differs only by tile label.
    for y in 0..40 {
        assert_eq!(single.pixel(2, y)[0], tiled.pixel(2, y)[0]);
    }
}

// ============================================================================
// Scheduling
// ============================================================================

#[tokio::test]
async fn test_one_job_per_tile_with_its_own_scene() {
    let renderer = Arc::new(SolidRenderer::new([10, 20, 30, 255]));
    let orchestrator = Orchestrator::new(renderer.clone());

    orchestrator
        .render(Arc::new(LabeledSource), size(4, 12), 3, TileSettings::default())
        .await
        .unwrap();

    assert_eq!(
        renderer.scenes(),
        vec!["rows 0..4", "rows 4..8", "rows 8..12"]
    );
    for job in renderer.jobs() {
        assert_eq!(job.width, 4);
        assert_eq!(job.height(), 4);
    }
}

#[tokio::test]
async fn test_single_process_renders_one_tile() {
    let renderer = Arc::new(SolidRenderer::new([0, 0, 0, 255]));
    Orchestrator::new(renderer.clone())
        .render(Arc::new(LabeledSource), size(4, 12), 1, TileSettings::default())
        .await
        .unwrap();
    assert_eq!(renderer.scenes(), vec!["rows 0..12"]);
}

#[tokio::test]
async fn test_nprocs_capped_at_height() {
    let renderer = Arc::new(SolidRenderer::new([1, 2, 3, 255]));
    let raster = Orchestrator::new(renderer.clone())
        .render(Arc::new(LabeledSource), size(3, 3), 16, TileSettings::default())
        .await
        .unwrap();
    assert_eq!(renderer.jobs().len(), 3);
    assert!(renderer.jobs().iter().all(|job| job.height() == 1));
    assert_eq!(raster.pixel(2, 2), [1, 2, 3, 255]);
}

#[tokio::test]
async fn test_concurrency_never_exceeds_nprocs() {
    let renderer = Arc::new(RowIndexRenderer::new());
    Orchestrator::new(renderer.clone())
        .render(Arc::new(LabeledSource), size(2, 30), 3, TileSettings::default())
        .await
        .unwrap();
    let peak = renderer.peak_concurrency();
    assert!(peak >= 1 && peak <= 3, "peak concurrency {}", peak);
}

#[tokio::test]
async fn test_raw_scene_rendered_as_single_tile() {
    let renderer = Arc::new(SolidRenderer::new([9, 9, 9, 255]));
    let raster = Orchestrator::new(renderer.clone())
        .render(
            Arc::new(RawScene("sphere { 0, 1 }".to_string())),
            size(10, 10),
            4,
            TileSettings::default(),
        )
        .await
        .unwrap();
    assert_eq!(renderer.scenes(), vec!["sphere { 0, 1 }"]);
    assert_eq!(raster.size(), (10, 10));
}

// ============================================================================
// Failure propagation
// ============================================================================

#[tokio::test]
async fn test_failure_aborts_sibling_tiles() {
    let renderer = Arc::new(FailingRenderer::new(2, 7));
    let orchestrator = Orchestrator::new(renderer.clone());

    let start = Instant::now();
    let result = tokio::time::timeout(
        Duration::from_secs(10),
        orchestrator.render(Arc::new(LabeledSource), size(4, 16), 4, TileSettings::default()),
    )
    .await
    .expect("render should not wait for sibling tiles");

    assert!(start.elapsed() < Duration::from_secs(10));
    assert_eq!(renderer.finished(), 0);
    match result {
        Err(PlotError::Render(RenderError::Failed { code, script })) => {
            assert_eq!(code, 7);
            assert_eq!(script, "rows 8..12");
        }
        other => panic!("expected render failure, got {:?}", other.map(|r| r.size())),
    }
}

#[tokio::test]
async fn test_failure_in_single_tile() {
    let renderer = Arc::new(FailingRenderer::new(0, 1));
    let err = Orchestrator::new(renderer.clone())
        .render(
            Arc::new(RawScene("invalid".to_string())),
            size(4, 4),
            1,
            TileSettings::default(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.category(), "RenderError");
    assert_eq!(err.to_string(), "Povray failed with code 1");
    assert_eq!(err.as_render_error().unwrap().script(), "invalid");
    assert_eq!(renderer.started(), 1);
}
