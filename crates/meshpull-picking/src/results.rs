//! Picking result buffer: word 0 is the count, words 1..=MAX_RESULTS the ids

use std::sync::atomic::{AtomicU32, Ordering};

/// Identifiers a single pick can report
pub const MAX_RESULTS: usize = 256;

/// Count word plus `MAX_RESULTS` id words
pub const RESULT_BUFFER_WORDS: usize = MAX_RESULTS + 1;

/// Shared, read-write result buffer.
///
/// Every word is atomic so the parallel picker can write it from many
/// invocations at once. Only the count is read-modify-written; each id slot
/// has exactly one writer, the invocation that reserved it.
#[derive(Debug)]
pub struct ResultBuffer {
    words: Box<[AtomicU32]>,
}

impl Default for ResultBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultBuffer {
    pub fn new() -> Self {
        Self {
            words: (0..RESULT_BUFFER_WORDS).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    /// Zero the counter and every slot. Must happen on the host before each
    /// dispatch; invocations never reset the buffer themselves.
    pub fn reset(&mut self) {
        for word in self.words.iter_mut() {
            *word.get_mut() = 0;
        }
    }

    /// Raw count word; the parallel picker may push it past `MAX_RESULTS`.
    pub fn raw_count(&self) -> u32 {
        self.words[0].load(Ordering::Acquire)
    }

    /// Count clamped to capacity
    pub fn count(&self) -> usize {
        (self.raw_count() as usize).min(MAX_RESULTS)
    }

    /// Reserve the next slot. Returns the zero-based slot index, which may be
    /// past capacity.
    #[inline]
    pub(crate) fn reserve(&self) -> u32 {
        self.words[0].fetch_add(1, Ordering::AcqRel)
    }

    /// Write `id` into a reserved slot; slots past capacity are dropped.
    #[inline]
    pub(crate) fn write_slot(&self, slot: u32, id: u32) {
        if (slot as usize) < MAX_RESULTS {
            self.words[slot as usize + 1].store(id, Ordering::Relaxed);
        }
    }

    /// Single-writer append used by the serial picker. Returns `false` when
    /// the buffer is full and the id was dropped.
    pub(crate) fn append(&mut self, id: u32) -> bool {
        let count = *self.words[0].get_mut() as usize;
        if count >= MAX_RESULTS {
            return false;
        }
        *self.words[count + 1].get_mut() = id;
        *self.words[0].get_mut() = count as u32 + 1;
        true
    }

    /// Collected ids, clamped to the count and capacity
    pub fn ids(&self) -> Vec<u32> {
        let count = self.count();
        self.words[1..=count]
            .iter()
            .map(|word| word.load(Ordering::Relaxed))
            .collect()
    }

    /// Snapshot of the whole buffer as it would be read back: `[count, ids..]`
    pub fn to_words(&self) -> Vec<u32> {
        self.words
            .iter()
            .map(|word| word.load(Ordering::Acquire))
            .collect()
    }
}

/// Remove duplicates while keeping first-seen order.
///
/// The parallel picker reports an id once per covered pixel; callers that
/// want a set run the result through this.
pub fn dedup_ids(ids: &[u32]) -> Vec<u32> {
    let mut unique = Vec::with_capacity(ids.len());
    for &id in ids {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_stops_at_capacity() {
        let mut results = ResultBuffer::new();
        for id in 1..=(MAX_RESULTS as u32 + 10) {
            results.append(id);
        }
        assert_eq!(results.raw_count(), MAX_RESULTS as u32);
        let ids = results.ids();
        assert_eq!(ids.len(), MAX_RESULTS);
        assert_eq!(ids[MAX_RESULTS - 1], MAX_RESULTS as u32);
    }

    #[test]
    fn test_overflowing_slots_are_dropped_but_counted() {
        let results = ResultBuffer::new();
        for id in 0..300 {
            let slot = results.reserve();
            results.write_slot(slot, id + 1);
        }
        assert_eq!(results.raw_count(), 300);
        assert_eq!(results.count(), MAX_RESULTS);
        assert_eq!(results.to_words().len(), RESULT_BUFFER_WORDS);
        assert_eq!(*results.ids().last().unwrap(), MAX_RESULTS as u32);
    }

    #[test]
    fn test_reset_and_dedup() {
        let mut results = ResultBuffer::new();
        results.append(5);
        results.reset();
        assert_eq!(results.to_words(), vec![0; RESULT_BUFFER_WORDS]);
        assert_eq!(dedup_ids(&[5, 9, 5, 5, 1, 9]), vec![5, 9, 1]);
    }
}
