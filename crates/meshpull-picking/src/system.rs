//! Host-side picking state shared between input and render code

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::id_buffer::IdBuffer;
use crate::parallel::{pick_region, PickRegion};
use crate::results::ResultBuffer;
use crate::serial::{pick_point, SeenList};

/// A pick waiting for the next `process` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickRequest {
    Point { x: u32, y: u32 },
    Region(PickRegion),
}

#[derive(Default)]
struct PickState {
    pending: Option<PickRequest>,
    last_result: Option<Vec<u32>>,
    seen: SeenList,
    results: ResultBuffer,
}

/// Owns the picking buffers and the latest result.
///
/// Input handlers call [`request_point`](Self::request_point) or
/// [`request_region`](Self::request_region); the render loop calls
/// [`process`](Self::process) once the ID buffer for the frame exists.
#[derive(Default)]
pub struct PickingSystem {
    state: Mutex<PickState>,
}

impl PickingSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_point(&self, x: u32, y: u32) {
        self.state.lock().pending = Some(PickRequest::Point { x, y });
    }

    pub fn request_region(&self, region: PickRegion) {
        self.state.lock().pending = Some(PickRequest::Region(region));
    }

    pub fn has_pending(&self) -> bool {
        self.state.lock().pending.is_some()
    }

    /// Run the pending request against `ids`. Buffers are reset first, so
    /// each request starts from an empty seen list and a zero counter.
    ///
    /// Returns `false` if nothing was requested.
    pub fn process(&self, ids: &IdBuffer) -> bool {
        let mut state = self.state.lock();
        let Some(request) = state.pending.take() else {
            return false;
        };

        let state = &mut *state;
        state.seen.clear();
        state.results.reset();

        match request {
            PickRequest::Point { x, y } => {
                pick_point(ids, [x, y], &mut state.seen, &mut state.results);
            }
            PickRequest::Region(region) => {
                pick_region(ids, region, &state.results);
            }
        }

        let picked = state.results.ids();
        debug!(
            "pick {:?}: raw count {}, {} ids read back",
            request,
            state.results.raw_count(),
            picked.len()
        );
        state.last_result = if picked.is_empty() {
            None
        } else {
            info!("Picked {} id(s)", picked.len());
            Some(picked)
        };
        true
    }

    /// Ids from the last processed request, `None` if it hit only background
    pub fn last_result(&self) -> Option<Vec<u32>> {
        self.state.lock().last_result.clone()
    }

    pub fn clear_result(&self) {
        self.state.lock().last_result = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{dedup_ids, MAX_RESULTS};

    fn scene() -> IdBuffer {
        let mut ids = IdBuffer::new(16, 16);
        for (x, y) in [(1, 1), (2, 1), (1, 2)] {
            ids.store(x, y, 5);
        }
        ids.store(9, 9, 9);
        ids
    }

    #[test]
    fn test_point_request() {
        let picking = PickingSystem::new();
        let ids = scene();
        assert!(!picking.process(&ids));

        picking.request_point(9, 9);
        assert!(picking.has_pending());
        assert!(picking.process(&ids));
        assert!(!picking.has_pending());
        assert_eq!(picking.last_result(), Some(vec![9]));

        // Each request starts fresh, so the same id is reported again.
        picking.request_point(9, 9);
        picking.process(&ids);
        assert_eq!(picking.last_result(), Some(vec![9]));

        picking.request_point(0, 0);
        picking.process(&ids);
        assert_eq!(picking.last_result(), None);
    }

    #[test]
    fn test_region_request_keeps_duplicates() {
        let picking = PickingSystem::new();
        picking.request_region(PickRegion::new(0, 0, 16, 16));
        picking.process(&scene());

        let mut picked = picking.last_result().unwrap();
        picked.sort_unstable();
        assert_eq!(picked, vec![5, 5, 5, 9]);
        assert_eq!(dedup_ids(&picked), vec![5, 9]);

        picking.clear_result();
        assert_eq!(picking.last_result(), None);
    }

    #[test]
    fn test_region_overflow_result_is_clamped() {
        let mut ids = IdBuffer::new(24, 24);
        for y in 0..24 {
            for x in 0..24 {
                ids.store(x, y, 1);
            }
        }
        let picking = PickingSystem::new();
        picking.request_region(PickRegion::new(0, 0, 24, 24));
        picking.process(&ids);
        assert_eq!(picking.last_result().map(|ids| ids.len()), Some(MAX_RESULTS));
    }
}
