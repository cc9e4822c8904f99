//! Meshpull Picking - Resolve which objects cover a pixel or a screen region
//!
//! Both variants read a previously rendered identifier buffer where zero is
//! background:
//! - [`pick_point`]: one invocation, deduplicates through a bounded seen list
//! - [`pick_region`]: one invocation per pixel of a box, 8x8 workgroups,
//!   slots reserved with an atomic fetch-add; duplicates are kept
//!
//! Results land in a [`ResultBuffer`] of `[count, id_0, id_1, ...]`.

mod id_buffer;
mod parallel;
mod results;
mod serial;
mod system;

pub use id_buffer::IdBuffer;
pub use parallel::{pick_region, PickRegion, WORKGROUP_SIZE};
pub use results::{dedup_ids, ResultBuffer, MAX_RESULTS, RESULT_BUFFER_WORDS};
pub use serial::{pick_point, SeenList, MAX_SEEN_IDS};
pub use system::{PickRequest, PickingSystem};
