//! Box-select picker: one invocation per pixel, 8x8 workgroups.
//!
//! Every invocation that samples a non-zero id reserves a result slot with a
//! fetch-and-add on the shared counter. Nothing is deduplicated; an id
//! covering several pixels appears once per pixel.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::id_buffer::IdBuffer;
use crate::results::{ResultBuffer, MAX_RESULTS};

/// Workgroup edge length in invocations
pub const WORKGROUP_SIZE: u32 = 8;

/// Axis-aligned selection box in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PickRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Region spanning two corners in any order, inclusive of both.
    pub fn from_corners(a: [u32; 2], b: [u32; 2]) -> Self {
        let (x0, x1) = (a[0].min(b[0]), a[0].max(b[0]));
        let (y0, y1) = (a[1].min(b[1]), a[1].max(b[1]));
        Self::new(x0, y0, x1 - x0 + 1, y1 - y0 + 1)
    }

    /// Workgroups needed along x and y
    pub fn workgroups(&self) -> (u32, u32) {
        (
            self.width.div_ceil(WORKGROUP_SIZE),
            self.height.div_ceil(WORKGROUP_SIZE),
        )
    }

    /// The part of this region inside a `width` x `height` buffer. Pixels
    /// outside the buffer read as background, so dropping them changes
    /// nothing but the amount of work.
    pub fn clipped(&self, width: u32, height: u32) -> Self {
        let x_end = self.x.saturating_add(self.width).min(width);
        let y_end = self.y.saturating_add(self.height).min(height);
        let x = self.x.min(x_end);
        let y = self.y.min(y_end);
        Self::new(x, y, x_end - x, y_end - y)
    }

    pub fn as_uniform(&self) -> [u32; 4] {
        [self.x, self.y, self.width, self.height]
    }
}

/// Run the box-select dispatch.
///
/// `results` must have been reset by the caller; the dispatch only ever
/// increments the counter. The returned value is the raw counter, which can
/// exceed [`MAX_RESULTS`].
pub fn pick_region(ids: &IdBuffer, region: PickRegion, results: &ResultBuffer) -> u32 {
    let requested = region;
    let region = region.clipped(ids.width(), ids.height());
    let (groups_x, groups_y) = region.workgroups();
    debug!(
        "box pick {:?} (clipped to {:?}): {}x{} workgroups",
        requested.as_uniform(),
        region.as_uniform(),
        groups_x,
        groups_y
    );

    let group_count = groups_x as usize * groups_y as usize;
    (0..group_count).into_par_iter().for_each(|group| {
        let group_x = (group % groups_x as usize) as u32;
        let group_y = (group / groups_x as usize) as u32;
        for local_y in 0..WORKGROUP_SIZE {
            for local_x in 0..WORKGROUP_SIZE {
                let gx = group_x * WORKGROUP_SIZE + local_x;
                let gy = group_y * WORKGROUP_SIZE + local_y;
                if gx >= region.width || gy >= region.height {
                    continue;
                }
                let id = ids.load(region.x + gx, region.y + gy);
                if id != 0 {
                    let slot = results.reserve();
                    results.write_slot(slot, id);
                }
            }
        }
    });

    let count = results.raw_count();
    if count as usize > MAX_RESULTS {
        debug!("box pick overflowed: {} hits, {} kept", count, MAX_RESULTS);
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_are_kept() {
        let mut ids = IdBuffer::new(32, 32);
        ids.store(2, 3, 5);
        ids.store(10, 11, 5);
        ids.store(15, 15, 5);
        ids.store(0, 7, 9);
        // Outside the box
        ids.store(16, 16, 5);

        let results = ResultBuffer::new();
        let count = pick_region(&ids, PickRegion::new(0, 0, 16, 16), &results);
        assert_eq!(count, 4);

        let mut picked = results.ids();
        picked.sort_unstable();
        assert_eq!(picked, vec![5, 5, 5, 9]);
    }

    #[test]
    fn test_overflow_is_clamped_on_read() {
        let mut ids = IdBuffer::new(20, 20);
        for y in 0..20 {
            for x in 0..20 {
                ids.store(x, y, y * 20 + x + 1);
            }
        }
        let results = ResultBuffer::new();
        let count = pick_region(&ids, PickRegion::new(0, 0, 20, 20), &results);
        assert_eq!(count, 400);
        assert_eq!(results.count(), MAX_RESULTS);

        let picked = results.ids();
        assert_eq!(picked.len(), MAX_RESULTS);
        assert!(picked.iter().all(|&id| (1..=400).contains(&id)));
    }

    #[test]
    fn test_region_past_u32_edge_reads_nothing() {
        let mut ids = IdBuffer::new(4, 4);
        ids.store(3, 0, 7);
        let results = ResultBuffer::new();
        assert_eq!(pick_region(&ids, PickRegion::new(u32::MAX - 2, 0, 8, 1), &results), 0);

        let results = ResultBuffer::new();
        let everything = PickRegion::new(2, 0, u32::MAX, u32::MAX);
        assert_eq!(everything.clipped(4, 4), PickRegion::new(2, 0, 2, 4));
        assert_eq!(pick_region(&ids, everything, &results), 1);
        assert_eq!(results.ids(), vec![7]);
    }

    #[test]
    fn test_partial_workgroups_and_offsets() {
        let region = PickRegion::from_corners([12, 9], [3, 2]);
        assert_eq!(region, PickRegion::new(3, 2, 10, 8));
        assert_eq!(region.workgroups(), (2, 1));

        let mut ids = IdBuffer::new(16, 16);
        ids.store(12, 9, 3);
        ids.store(13, 9, 4);
        let results = ResultBuffer::new();
        assert_eq!(pick_region(&ids, region, &results), 1);
        assert_eq!(results.ids(), vec![3]);
    }
}
