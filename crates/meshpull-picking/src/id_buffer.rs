/// 2-D unsigned identifier texture. Zero means background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdBuffer {
    width: u32,
    height: u32,
    ids: Vec<u32>,
}

impl IdBuffer {
    /// Create a buffer cleared to background
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ids: vec![0; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Texel fetch; coordinates outside the buffer read as background.
    #[inline]
    pub fn load(&self, x: u32, y: u32) -> u32 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.ids[(y * self.width + x) as usize]
    }

    /// Write one texel; out-of-bounds writes are ignored.
    pub fn store(&mut self, x: u32, y: u32, id: u32) {
        if x < self.width && y < self.height {
            self.ids[(y * self.width + x) as usize] = id;
        }
    }

    pub fn clear(&mut self) {
        self.ids.fill(0);
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.ids
    }
}
