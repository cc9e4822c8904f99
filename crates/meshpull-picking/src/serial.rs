//! Single-invocation picker with a persistent seen list

use crate::id_buffer::IdBuffer;
use crate::results::ResultBuffer;

/// Slots in the seen list
pub const MAX_SEEN_IDS: usize = 1024;

/// Identifiers already reported, terminated by the first zero slot.
///
/// Zero is the background id, so it can never be a real entry.
#[derive(Debug, Clone)]
pub struct SeenList {
    slots: Box<[u32; MAX_SEEN_IDS]>,
}

impl Default for SeenList {
    fn default() -> Self {
        Self::new()
    }
}

impl SeenList {
    pub fn new() -> Self {
        Self {
            slots: Box::new([0; MAX_SEEN_IDS]),
        }
    }

    pub fn clear(&mut self) {
        self.slots.fill(0);
    }

    /// Entries before the terminator
    pub fn len(&self) -> usize {
        self.slots.iter().position(|&id| id == 0).unwrap_or(MAX_SEEN_IDS)
    }

    pub fn is_empty(&self) -> bool {
        self.slots[0] == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == MAX_SEEN_IDS
    }

    pub fn contains(&self, id: u32) -> bool {
        id != 0 && self.slots.iter().take_while(|&&slot| slot != 0).any(|&slot| slot == id)
    }

    /// Record `id` in the first free slot. Returns `false` if it was already
    /// present or the list is full.
    fn insert(&mut self, id: u32) -> bool {
        for slot in self.slots.iter_mut() {
            if *slot == 0 {
                *slot = id;
                return true;
            }
            if *slot == id {
                return false;
            }
        }
        false
    }
}

/// Sample the id under `point` and append it to `results` unless it is
/// background, already seen, or there is no room left to remember it.
///
/// Returns the id that was appended, if any.
pub fn pick_point(
    ids: &IdBuffer,
    point: [u32; 2],
    seen: &mut SeenList,
    results: &mut ResultBuffer,
) -> Option<u32> {
    let id = ids.load(point[0], point[1]);
    if id == 0 {
        return None;
    }
    // A full seen list cannot guarantee uniqueness, so the id is dropped.
    if !seen.insert(id) {
        return None;
    }
    results.append(id).then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::MAX_RESULTS;

    #[test]
    fn test_single_hit_is_reported_once() {
        let mut ids = IdBuffer::new(8, 8);
        ids.store(3, 4, 7);
        let mut seen = SeenList::new();
        let mut results = ResultBuffer::new();

        assert_eq!(pick_point(&ids, [3, 4], &mut seen, &mut results), Some(7));
        assert_eq!(&results.to_words()[..2], &[1, 7]);

        assert_eq!(pick_point(&ids, [3, 4], &mut seen, &mut results), None);
        assert_eq!(&results.to_words()[..3], &[1, 7, 0]);
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn test_background_and_out_of_bounds_are_ignored() {
        let ids = IdBuffer::new(4, 4);
        let mut seen = SeenList::new();
        let mut results = ResultBuffer::new();
        assert_eq!(pick_point(&ids, [1, 1], &mut seen, &mut results), None);
        assert_eq!(pick_point(&ids, [40, 1], &mut seen, &mut results), None);
        assert!(seen.is_empty());
        assert_eq!(results.raw_count(), 0);
    }

    #[test]
    fn test_results_cap_at_capacity() {
        let mut ids = IdBuffer::new(32, 32);
        for y in 0..32 {
            for x in 0..32 {
                ids.store(x, y, y * 32 + x + 1);
            }
        }
        let mut seen = SeenList::new();
        let mut results = ResultBuffer::new();
        for y in 0..32 {
            for x in 0..32 {
                pick_point(&ids, [x, y], &mut seen, &mut results);
            }
        }
        assert_eq!(results.raw_count(), MAX_RESULTS as u32);
        assert_eq!(results.ids().len(), MAX_RESULTS);
        assert!(seen.is_full());
        assert!(seen.contains(1024));
    }
}
