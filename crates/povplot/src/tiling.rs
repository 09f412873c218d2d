//! Row-band partitioning of a raster.

use serde::Serialize;

/// A horizontal band of rows `[row_start, row_end)` rendered by one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenderTile {
    pub index: usize,
    pub row_start: u32,
    pub row_end: u32,
}

impl RenderTile {
    pub fn height(&self) -> u32 {
        self.row_end - self.row_start
    }

    /// Whether this band covers all `height` rows.
    pub fn is_full(&self, height: u32) -> bool {
        self.row_start == 0 && self.row_end == height
    }
}

/// Split `height` rows into `count` consecutive bands.
///
/// Bands have `height / count` rows each and the last band absorbs the
/// remainder. `count` is capped at `height` so no band is empty, and treated
/// as 1 when zero.
pub fn partition_rows(height: u32, count: usize) -> Vec<RenderTile> {
    let count = (count.max(1) as u64).min(height.max(1) as u64) as u32;
    let band = height / count;
    (0..count)
        .map(|i| RenderTile {
            index: i as usize,
            row_start: i * band,
            row_end: if i + 1 == count { height } else { (i + 1) * band },
        })
        .collect()
}
