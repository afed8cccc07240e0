//! Node processor trait and the IO view handed to it.
//!
//! A node's processing is supplied as a boxed [`NodeProcessor`]. The scheduler
//! calls [`process_input()`](NodeProcessor::process_input) when a node has
//! enough input and [`process_output()`](NodeProcessor::process_output) when a
//! downstream node asked it to produce. The returned [`ProcessStatus`] drives
//! the node's next scheduling state:
//!
//! | Result | Next state |
//! |--------|------------|
//! | `Ok(NeedMoreInput)` | `CheckIn` |
//! | `Ok(HaveOutput)` | `CheckOut` |
//! | `Err(_)` | unchanged, activation aborts |
//!
//! Processors see only their own ports, through [`NodeIo`]. They are the only
//! writers of slot `status` and `buffer_id`.
//!
//! # Example
//!
//! ```rust
//! use ripple_core::{NodeIo, NodeProcessor, ProcessError, ProcessStatus};
//!
//! /// Forwards its single input to its single output.
//! struct Passthrough;
//!
//! impl NodeProcessor for Passthrough {
//!     fn process_input(&mut self, io: &mut NodeIo<'_>) -> Result<ProcessStatus, ProcessError> {
//!         let buffer = io.input(0).and_then(|slot| slot.take());
//!         match (buffer, io.output(0)) {
//!             (Some(buffer), Some(out)) => {
//!                 out.provide(buffer);
//!                 Ok(ProcessStatus::HaveOutput)
//!             }
//!             _ => Ok(ProcessStatus::NeedMoreInput),
//!         }
//!     }
//!
//!     fn process_output(&mut self, io: &mut NodeIo<'_>) -> Result<ProcessStatus, ProcessError> {
//!         io.input(0).ok_or(ProcessError::Unlinked)?.request();
//!         Ok(ProcessStatus::NeedMoreInput)
//!     }
//! }
//! ```

use crate::graph::io::{BufferId, IoSlot};
use crate::graph::port::{PortData, PortFlags, PortId};

/// Flow-control result of a successful processor call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProcessStatus {
    /// The node consumed what it had and needs more input.
    NeedMoreInput,
    /// The node placed data on (some of) its outputs.
    HaveOutput,
}

/// Failure reported by a node processor.
///
/// A processor error is fatal to the current activation only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessError {
    /// The node does not implement this direction (e.g. input on a pure source).
    NotSupported,
    /// A port the processor depends on is not linked.
    Unlinked,
    /// A slot referenced a buffer the node does not know about.
    InvalidBuffer(BufferId),
    /// Implementation-specific failure.
    Failed(&'static str),
}

impl core::fmt::Display for ProcessError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotSupported => write!(f, "operation not supported by node"),
            Self::Unlinked => write!(f, "required port is not linked"),
            Self::InvalidBuffer(id) => write!(f, "invalid buffer id {}", id.0),
            Self::Failed(msg) => write!(f, "node failed: {msg}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ProcessError {}

/// Processing callbacks of a node.
///
/// Both callbacks run on the data thread inside the dispatch loop and must not
/// block or allocate.
pub trait NodeProcessor: Send {
    /// Consumes available input and produces output.
    fn process_input(&mut self, io: &mut NodeIo<'_>) -> Result<ProcessStatus, ProcessError>;

    /// Attempts to produce output on request of a downstream node.
    fn process_output(&mut self, io: &mut NodeIo<'_>) -> Result<ProcessStatus, ProcessError>;

    /// Returns a consumed buffer to the node that produced it.
    ///
    /// `port_index` is the index of the output port within the node.
    fn reuse_buffer(&mut self, _port_index: usize, _buffer: BufferId) {}

    /// Short name used in log output.
    fn name(&self) -> &str {
        "node"
    }
}

/// A processor built from two closures.
///
/// Handy for tests and glue code:
///
/// ```rust
/// use ripple_core::{FnProcessor, ProcessStatus};
///
/// let processor = FnProcessor::new(
///     |_io| Ok(ProcessStatus::NeedMoreInput),
///     |_io| Ok(ProcessStatus::HaveOutput),
/// );
/// # let _ = processor;
/// ```
pub struct FnProcessor<I, O> {
    input: I,
    output: O,
}

impl<I, O> FnProcessor<I, O>
where
    I: FnMut(&mut NodeIo<'_>) -> Result<ProcessStatus, ProcessError> + Send,
    O: FnMut(&mut NodeIo<'_>) -> Result<ProcessStatus, ProcessError> + Send,
{
    /// Wraps `input` and `output` as the node's two callbacks.
    pub fn new(input: I, output: O) -> Self {
        Self { input, output }
    }
}

impl<I, O> NodeProcessor for FnProcessor<I, O>
where
    I: FnMut(&mut NodeIo<'_>) -> Result<ProcessStatus, ProcessError> + Send,
    O: FnMut(&mut NodeIo<'_>) -> Result<ProcessStatus, ProcessError> + Send,
{
    fn process_input(&mut self, io: &mut NodeIo<'_>) -> Result<ProcessStatus, ProcessError> {
        (self.input)(io)
    }

    fn process_output(&mut self, io: &mut NodeIo<'_>) -> Result<ProcessStatus, ProcessError> {
        (self.output)(io)
    }
}

/// A processor's view of the IO slots behind its own ports.
///
/// Ports are addressed by their index within the node, in the order they were
/// added. An unlinked port has no slot and yields `None`.
pub struct NodeIo<'a> {
    inputs: &'a [PortId],
    outputs: &'a [PortId],
    ports: &'a [Option<PortData>],
    slots: &'a mut [Option<IoSlot>],
}

impl<'a> NodeIo<'a> {
    pub(crate) fn new(
        inputs: &'a [PortId],
        outputs: &'a [PortId],
        ports: &'a [Option<PortData>],
        slots: &'a mut [Option<IoSlot>],
    ) -> Self {
        Self {
            inputs,
            outputs,
            ports,
            slots,
        }
    }

    /// Number of input ports on the node.
    #[inline]
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Number of output ports on the node.
    #[inline]
    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Mutable access to the slot behind input port `index`.
    pub fn input(&mut self, index: usize) -> Option<&mut IoSlot> {
        let port = *self.inputs.get(index)?;
        self.slot_mut(port)
    }

    /// Mutable access to the slot behind output port `index`.
    pub fn output(&mut self, index: usize) -> Option<&mut IoSlot> {
        let port = *self.outputs.get(index)?;
        self.slot_mut(port)
    }

    /// Shared access to the slot behind input port `index`.
    pub fn input_ref(&self, index: usize) -> Option<&IoSlot> {
        let port = *self.inputs.get(index)?;
        self.slot_ref(port)
    }

    /// Shared access to the slot behind output port `index`.
    pub fn output_ref(&self, index: usize) -> Option<&IoSlot> {
        let port = *self.outputs.get(index)?;
        self.slot_ref(port)
    }

    /// Returns `true` if input port `index` is flagged optional.
    pub fn input_is_optional(&self, index: usize) -> bool {
        self.inputs
            .get(index)
            .and_then(|p| self.ports.get(p.0 as usize))
            .and_then(|p| p.as_ref())
            .is_some_and(|p| p.flags.contains(PortFlags::OPTIONAL))
    }

    fn slot_ref(&self, port: PortId) -> Option<&IoSlot> {
        let slot = self.ports.get(port.0 as usize)?.as_ref()?.slot?;
        self.slots.get(slot.0 as usize)?.as_ref()
    }

    fn slot_mut(&mut self, port: PortId) -> Option<&mut IoSlot> {
        let slot = self.ports.get(port.0 as usize)?.as_ref()?.slot?;
        self.slots.get_mut(slot.0 as usize)?.as_mut()
    }
}
