//! Graph node types.
//!
//! Each node has a [`NodeId`], a boxed [`NodeProcessor`] and the scheduling
//! bookkeeping the dispatch loop mutates: its [`SchedState`], the input
//! readiness counters and its ready-queue links.

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, vec::Vec};

use crate::process::NodeProcessor;

use super::port::PortId;

/// Unique identifier for a node in the graph.
///
/// Node IDs are assigned sequentially and never reused within a graph instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Scheduling state of a node. Exactly one is current at any time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SchedState {
    /// Enough input is available; run `process_input` next.
    In,
    /// The node was asked to produce; run `process_output` next.
    Out,
    /// Recount input readiness, then propagate output readiness.
    CheckIn,
    /// Propagate output readiness to downstream peers.
    CheckOut,
}

/// Node flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeFlags(u8);

impl NodeFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// The node completes asynchronously: it may be asked to produce even
    /// while it is the driver of the current activation.
    pub const ASYNC: Self = Self(1 << 0);

    /// Returns `true` if all bits in `other` are set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of two flag sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// Intrusive ready-queue links, stored inline in each node.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct QueueLink {
    pub queued: bool,
    pub prev: Option<u32>,
    pub next: Option<u32>,
}

/// Internal bookkeeping for a node in the graph.
pub(crate) struct NodeData {
    pub state: SchedState,
    /// Distinct inputs that must report data before `process_input` may run.
    pub required_in: u32,
    /// Inputs counted as ready during the current round.
    pub ready_in: u32,
    pub inputs: Vec<PortId>,
    pub outputs: Vec<PortId>,
    pub processor: Box<dyn NodeProcessor>,
    pub flags: NodeFlags,
    pub link: QueueLink,
    /// Lifetime count of `process_input` invocations.
    pub input_calls: u64,
    /// Lifetime count of `process_output` invocations.
    pub output_calls: u64,
}

impl NodeData {
    pub fn new(processor: Box<dyn NodeProcessor>) -> Self {
        Self {
            state: SchedState::CheckIn,
            required_in: 0,
            ready_in: 0,
            inputs: Vec::new(),
            outputs: Vec::new(),
            processor,
            flags: NodeFlags::NONE,
            link: QueueLink::default(),
            input_calls: 0,
            output_calls: 0,
        }
    }

    #[inline]
    pub fn is_async(&self) -> bool {
        self.flags.contains(NodeFlags::ASYNC)
    }
}
