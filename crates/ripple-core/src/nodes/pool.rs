//! Fixed-size buffer id pool shared by the producing adapters.

use crate::graph::io::BufferId;

/// Largest pool a producing node can own.
pub const MAX_POOL_BUFFERS: u32 = 64;

/// Free-list of buffer ids `0..size`, stored as a bitmask.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BufferPool {
    size: u32,
    free: u64,
}

impl BufferPool {
    /// Creates a pool of `size` buffers, clamped to `1..=MAX_POOL_BUFFERS`.
    pub fn new(size: u32) -> Self {
        let size = size.clamp(1, MAX_POOL_BUFFERS);
        let free = if size == 64 { u64::MAX } else { (1u64 << size) - 1 };
        Self { size, free }
    }

    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    pub fn available(&self) -> u32 {
        self.free.count_ones()
    }

    /// Takes the lowest free buffer id.
    pub fn acquire(&mut self) -> Option<BufferId> {
        if self.free == 0 {
            return None;
        }
        let id = self.free.trailing_zeros();
        self.free &= !(1u64 << id);
        Some(BufferId(id))
    }

    /// Returns `buffer` to the pool. Unknown or already-free ids are ignored.
    pub fn release(&mut self, buffer: BufferId) -> bool {
        if buffer.0 >= self.size {
            return false;
        }
        let bit = 1u64 << buffer.0;
        if self.free & bit != 0 {
            return false;
        }
        self.free |= bit;
        true
    }
}
