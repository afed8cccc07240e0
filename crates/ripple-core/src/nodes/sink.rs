//! Sink adapter: a node with one input that consumes whatever arrives.

#[cfg(not(feature = "std"))]
use alloc::sync::Arc;
use core::sync::atomic::{AtomicU64, Ordering};
#[cfg(feature = "std")]
use std::sync::Arc;

use crate::graph::io::BufferId;
use crate::process::{NodeIo, NodeProcessor, ProcessError, ProcessStatus};

const NO_BUFFER: u64 = u64::MAX;

#[derive(Debug)]
struct SinkCounters {
    received: AtomicU64,
    last: AtomicU64,
}

/// Shared view of a [`Sink`]'s consumption, readable after the sink has been
/// boxed into a graph.
#[derive(Debug, Clone)]
pub struct SinkProbe {
    counters: Arc<SinkCounters>,
}

impl SinkProbe {
    fn new() -> Self {
        Self {
            counters: Arc::new(SinkCounters {
                received: AtomicU64::new(0),
                last: AtomicU64::new(NO_BUFFER),
            }),
        }
    }

    /// Buffers consumed so far.
    pub fn received(&self) -> u64 {
        self.counters.received.load(Ordering::Relaxed)
    }

    /// The most recently consumed buffer.
    pub fn last_buffer(&self) -> Option<BufferId> {
        match self.counters.last.load(Ordering::Relaxed) {
            NO_BUFFER => None,
            id => Some(BufferId(id as u32)),
        }
    }

    fn record(&self, buffer: Option<BufferId>) {
        self.counters.received.fetch_add(1, Ordering::Relaxed);
        let raw = buffer.map_or(NO_BUFFER, |b| u64::from(b.0));
        self.counters.last.store(raw, Ordering::Relaxed);
    }
}

/// Consumes one buffer per `process_input` and immediately asks for the next.
#[derive(Debug)]
pub struct Sink {
    probe: SinkProbe,
}

impl Default for Sink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink {
    /// Creates a sink with its own probe.
    pub fn new() -> Self {
        Self {
            probe: SinkProbe::new(),
        }
    }

    /// Creates a sink and returns a probe observing it.
    pub fn with_probe() -> (Self, SinkProbe) {
        let sink = Self::new();
        let probe = sink.probe();
        (sink, probe)
    }

    /// Returns another handle to this sink's probe.
    pub fn probe(&self) -> SinkProbe {
        self.probe.clone()
    }
}

impl NodeProcessor for Sink {
    fn process_input(&mut self, io: &mut NodeIo<'_>) -> Result<ProcessStatus, ProcessError> {
        let slot = io.input(0).ok_or(ProcessError::Unlinked)?;
        if slot.has_data() {
            let buffer = slot.take();
            self.probe.record(buffer);
        } else {
            slot.request();
        }
        Ok(ProcessStatus::NeedMoreInput)
    }

    fn process_output(&mut self, io: &mut NodeIo<'_>) -> Result<ProcessStatus, ProcessError> {
        io.input(0).ok_or(ProcessError::Unlinked)?.request();
        Ok(ProcessStatus::NeedMoreInput)
    }

    fn name(&self) -> &str {
        "sink"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Direction, Graph, PortFlags, Status};

    #[test]
    fn consumes_pending_buffer() {
        let mut graph = Graph::new();
        let upstream = graph.add_node(Box::new(super::super::Source::new(4)));
        let (sink, probe) = Sink::with_probe();
        let sink = graph.add_node(Box::new(sink));
        let out = graph.add_port(upstream, Direction::Output, PortFlags::NONE).unwrap();
        let inp = graph.add_port(sink, Direction::Input, PortFlags::NONE).unwrap();
        graph.link(out, inp).unwrap();

        graph.push(upstream).unwrap();
        assert_eq!(probe.received(), 1);
        assert_eq!(probe.last_buffer(), Some(BufferId(0)));
        assert_eq!(graph.slot(inp).unwrap().status, Status::NeedData);
    }

    #[test]
    fn fresh_probe_is_empty() {
        let (_sink, probe) = Sink::with_probe();
        assert_eq!(probe.received(), 0);
        assert_eq!(probe.last_buffer(), None);
    }

    #[test]
    fn unlinked_input_is_never_run() {
        let mut graph = Graph::new();
        let sink = graph.add_node(Box::new(Sink::new()));
        graph.add_port(sink, Direction::Input, PortFlags::NONE).unwrap();
        // Unlinked ports are skipped by the check steps; the sink is never run.
        assert!(graph.pull(sink).is_ok());
        assert_eq!(graph.input_calls(sink), Some(0));
    }
}
