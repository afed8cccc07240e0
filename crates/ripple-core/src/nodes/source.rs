//! Source adapter: a node with one output that produces on request.

use crate::graph::io::BufferId;
use crate::process::{NodeIo, NodeProcessor, ProcessError, ProcessStatus};

use super::pool::BufferPool;

/// Produces a buffer every time it is asked for output.
///
/// A buffer left in the slot by the consumer is recycled before the next one
/// is produced. If the slot still holds unread data, nothing new is produced.
#[derive(Debug, Clone)]
pub struct Source {
    pool: BufferPool,
    produced: u64,
}

impl Source {
    /// Creates a source owning `buffers` buffer ids (clamped to `1..=64`).
    pub fn new(buffers: u32) -> Self {
        Self {
            pool: BufferPool::new(buffers),
            produced: 0,
        }
    }

    /// Buffers produced so far.
    pub fn produced(&self) -> u64 {
        self.produced
    }

    /// Size of the buffer pool.
    pub fn capacity(&self) -> u32 {
        self.pool.size()
    }

    /// Buffers currently free for production.
    pub fn available(&self) -> u32 {
        self.pool.available()
    }
}

impl NodeProcessor for Source {
    fn process_input(&mut self, _io: &mut NodeIo<'_>) -> Result<ProcessStatus, ProcessError> {
        Err(ProcessError::NotSupported)
    }

    fn process_output(&mut self, io: &mut NodeIo<'_>) -> Result<ProcessStatus, ProcessError> {
        let out = io.output(0).ok_or(ProcessError::Unlinked)?;
        if out.has_data() {
            return Ok(ProcessStatus::HaveOutput);
        }
        if let Some(consumed) = out.buffer_id.take() {
            self.pool.release(consumed);
        }
        let buffer = self
            .pool
            .acquire()
            .ok_or(ProcessError::Failed("buffer pool exhausted"))?;
        out.provide(buffer);
        self.produced += 1;
        Ok(ProcessStatus::HaveOutput)
    }

    fn reuse_buffer(&mut self, _port_index: usize, buffer: BufferId) {
        self.pool.release(buffer);
    }

    fn name(&self) -> &str {
        "source"
    }
}
