//! Mixer adapter: N inputs folded into one output.

use crate::graph::io::BufferId;
use crate::process::{NodeIo, NodeProcessor, ProcessError, ProcessStatus};

use super::pool::BufferPool;

/// Combines one buffer from each input into a single output buffer.
///
/// A mix happens only when every linked, non-optional input holds data and at
/// least one input does. Otherwise the inputs that are still empty are asked
/// for more and the mixer reports [`ProcessStatus::NeedMoreInput`]. Optional
/// inputs join the mix when they happen to have data.
///
/// While the output still holds an unread buffer the mixer reports
/// [`ProcessStatus::HaveOutput`] without touching its inputs.
#[derive(Debug, Clone)]
pub struct Mixer {
    pool: BufferPool,
    mixes: u64,
    consumed: u64,
}

impl Mixer {
    /// Creates a mixer owning `buffers` output buffer ids (clamped to `1..=64`).
    pub fn new(buffers: u32) -> Self {
        Self {
            pool: BufferPool::new(buffers),
            mixes: 0,
            consumed: 0,
        }
    }

    /// Output buffers produced so far.
    pub fn mixes(&self) -> u64 {
        self.mixes
    }

    /// Input buffers consumed so far.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    fn mix(&mut self, io: &mut NodeIo<'_>) -> Result<ProcessStatus, ProcessError> {
        let out = io.output_ref(0).ok_or(ProcessError::Unlinked)?;
        if out.has_data() {
            return Ok(ProcessStatus::HaveOutput);
        }

        let mut linked = 0;
        let mut ready = 0;
        let mut missing = false;
        for i in 0..io.input_count() {
            let Some(slot) = io.input_ref(i) else {
                continue;
            };
            linked += 1;
            if slot.has_data() {
                ready += 1;
            } else if !io.input_is_optional(i) {
                missing = true;
            }
        }
        if linked == 0 {
            return Err(ProcessError::Unlinked);
        }

        if missing || ready == 0 {
            for i in 0..io.input_count() {
                if let Some(slot) = io.input(i)
                    && !slot.has_data()
                {
                    slot.request();
                }
            }
            return Ok(ProcessStatus::NeedMoreInput);
        }

        for i in 0..io.input_count() {
            if let Some(slot) = io.input(i)
                && slot.take().is_some()
            {
                self.consumed += 1;
            }
        }

        let out = io.output(0).ok_or(ProcessError::Unlinked)?;
        if let Some(previous) = out.buffer_id.take() {
            self.pool.release(previous);
        }
        let buffer = self
            .pool
            .acquire()
            .ok_or(ProcessError::Failed("buffer pool exhausted"))?;
        out.provide(buffer);
        self.mixes += 1;
        Ok(ProcessStatus::HaveOutput)
    }
}

impl NodeProcessor for Mixer {
    fn process_input(&mut self, io: &mut NodeIo<'_>) -> Result<ProcessStatus, ProcessError> {
        self.mix(io)
    }

    fn process_output(&mut self, io: &mut NodeIo<'_>) -> Result<ProcessStatus, ProcessError> {
        self.mix(io)
    }

    fn reuse_buffer(&mut self, _port_index: usize, buffer: BufferId) {
        self.pool.release(buffer);
    }

    fn name(&self) -> &str {
        "mixer"
    }
}
