//! Byte-addressed view over a word-aligned buffer.
//!
//! Meshlet-local triangle indices are single bytes, but storage buffers are
//! read in 32-bit words. Four bytes share a word, little-endian within the
//! word: byte address `a` lives in word `a / 4` at bit shift `(a % 4) * 8`.
//! Writers and readers must both go through this module so the order never
//! diverges.

/// Pack four bytes into one word, `bytes[0]` in the lowest bits.
#[inline]
pub const fn pack_word(bytes: [u8; 4]) -> u32 {
    u32::from_le_bytes(bytes)
}

/// Extract byte `lane` (0..4) of a packed word.
#[inline]
pub const fn unpack_byte(word: u32, lane: u32) -> u32 {
    (word >> ((lane % 4) * 8)) & 0xFF
}

/// Read the byte at `byte_address` from a slice of packed words.
///
/// This is what a shader does with `array<u32>`; the caller guarantees the
/// address is in range.
#[inline]
pub fn read_packed(words: &[u32], byte_address: u32) -> u32 {
    unpack_byte(words[(byte_address / 4) as usize], byte_address % 4)
}

/// Growable byte array stored as packed 32-bit words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackedBytes {
    words: Vec<u32>,
    len: u32,
}

impl PackedBytes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pack a byte slice; the final word is zero-padded.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut packed = Self::new();
        packed.extend_from_slice(bytes);
        packed
    }

    /// Number of bytes stored (not words)
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append one byte at address `len()`.
    pub fn push(&mut self, byte: u8) {
        let lane = self.len % 4;
        if lane == 0 {
            self.words.push(0);
        }
        if let Some(word) = self.words.last_mut() {
            *word |= (byte as u32) << (lane * 8);
        }
        self.len += 1;
    }

    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.push(byte);
        }
    }

    /// Byte at `byte_address`, or `None` past the end
    pub fn get(&self, byte_address: u32) -> Option<u8> {
        if byte_address >= self.len {
            return None;
        }
        Some(read_packed(&self.words, byte_address) as u8)
    }

    /// The packed words, ready for upload
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Unpack everything back into bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        (0..self.len)
            .map(|address| read_packed(&self.words, address) as u8)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_round_trip() {
        let bytes = [0u8, 255, 17, 128];
        let word = pack_word(bytes);
        for (lane, &expected) in bytes.iter().enumerate() {
            assert_eq!(unpack_byte(word, lane as u32), expected as u32);
        }
    }

    #[test]
    fn test_little_endian_lane_order() {
        assert_eq!(pack_word([0x01, 0x02, 0x03, 0x04]), 0x0403_0201);
    }

    #[test]
    fn test_packed_bytes_unaligned_append() {
        let mut packed = PackedBytes::from_bytes(&[1, 2, 3]);
        assert_eq!(packed.words().len(), 1);
        packed.extend_from_slice(&[4, 5, 6]);
        assert_eq!(packed.len(), 6);
        assert_eq!(packed.words().len(), 2);
        assert_eq!(packed.to_bytes(), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(packed.get(4), Some(5));
        assert_eq!(packed.get(6), None);
        // Tail lanes of the last word stay zero
        assert_eq!(packed.words()[1] >> 16, 0);
    }
}
