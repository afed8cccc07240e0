//! Demand-propagation scheduler.
//!
//! An activation starts from a *driver* node handed to [`Graph::pull()`] (a
//! sink that needs input) or [`Graph::push()`] (a source that has data). The
//! driver is seeded into the ready queue and the dispatch loop runs until the
//! queue is empty.
//!
//! # Dispatch
//!
//! Each dispatch pops the head node (clearing its membership first, so it may
//! be re-queued) and branches on its [`SchedState`]:
//!
//! | State | Action |
//! |-------|--------|
//! | `In` | reset `ready_in`, run `process_input`, re-queue unless the node is the driver |
//! | `Out` | run `process_output`, always re-queue |
//! | `CheckIn` | recount inputs and ask upstream for data, then `CheckOut` |
//! | `CheckOut` | count this node's output data into each downstream peer |
//!
//! A downstream node becomes `In` once exactly `required_in` of its inputs
//! were counted as holding data. Each input counts at most once per round, and
//! optional inputs are never counted. The check steps never run a callback.
//!
//! # Errors
//!
//! A processor error aborts the activation: the ready queue is drained, the
//! failing node keeps its state, and the error is returned to the caller. The
//! graph stays structurally valid and can be activated again.
//!
//! # Real-time safety
//!
//! The dispatch loop does not allocate. Port lists are walked by index and the
//! ready queue is intrusive.

use crate::process::{NodeIo, ProcessError, ProcessStatus};

use super::io::Status;
use super::node::{NodeId, SchedState};
use super::port::PortId;
use super::topology::Graph;

/// Errors returned by [`Graph::pull()`] and [`Graph::push()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    /// The driver node was not found in the graph.
    NodeNotFound(NodeId),
    /// A node callback failed, aborting the activation.
    Process {
        /// Node whose callback failed.
        node: NodeId,
        /// Error reported by the callback.
        error: ProcessError,
    },
}

impl core::fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "driver node {id} not found"),
            Self::Process { node, error } => write!(f, "{node} failed: {error}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SchedulerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Process { error, .. } => Some(error),
            Self::NodeNotFound(_) => None,
        }
    }
}

/// Counters for the most recent activation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivationStats {
    /// Nodes popped from the ready queue.
    pub dispatches: u32,
    /// `process_input` invocations.
    pub input_calls: u32,
    /// `process_output` invocations.
    pub output_calls: u32,
}

#[derive(Clone, Copy)]
enum Callback {
    Input,
    Output,
}

impl Graph {
    /// Services a node that needs more input.
    ///
    /// Puts `node` in `CheckIn`, makes it the driver and runs the dispatch
    /// loop to quiescence.
    pub fn pull(&mut self, node: NodeId) -> Result<(), SchedulerError> {
        #[cfg(feature = "tracing")]
        tracing::trace!("sched_pull: {node}");
        self.activate(node, SchedState::CheckIn)
    }

    /// Propagates data a node produced on its own.
    ///
    /// Puts `node` in `Out`, makes it the driver and runs the dispatch loop
    /// to quiescence.
    pub fn push(&mut self, node: NodeId) -> Result<(), SchedulerError> {
        #[cfg(feature = "tracing")]
        tracing::trace!("sched_push: {node}");
        self.activate(node, SchedState::Out)
    }

    /// Counters of the most recent activation.
    pub fn last_activation(&self) -> ActivationStats {
        self.stats
    }

    fn activate(&mut self, node: NodeId, state: SchedState) -> Result<(), SchedulerError> {
        self.node_mut(node)
            .map_err(|_| SchedulerError::NodeNotFound(node))?
            .state = state;
        self.driver = Some(node);
        self.stats = ActivationStats::default();
        self.ready.push_back(&mut self.nodes, node.0);

        let result = self.run();
        if let Err(_err) = &result {
            #[cfg(feature = "tracing")]
            tracing::warn!("sched_abort: {_err}");
            self.ready.clear(&mut self.nodes);
        }
        self.driver = None;
        result
    }

    fn run(&mut self) -> Result<(), SchedulerError> {
        while self.iterate()? {}
        Ok(())
    }

    /// Dispatches the head of the ready queue. Returns whether work remains.
    fn iterate(&mut self) -> Result<bool, SchedulerError> {
        let Some(idx) = self.ready.pop_front(&mut self.nodes) else {
            return Ok(false);
        };
        let id = NodeId(idx);
        let Some(state) = self.state(id) else {
            return Ok(!self.ready.is_empty());
        };
        self.stats.dispatches += 1;
        #[cfg(feature = "tracing")]
        tracing::trace!("sched_dispatch: {id} {state:?}");

        match state {
            SchedState::In => {
                self.invoke(id, Callback::Input)?;
                if self.driver != Some(id) {
                    self.ready.push_back(&mut self.nodes, idx);
                }
            }
            SchedState::Out => {
                self.invoke(id, Callback::Output)?;
                self.ready.push_back(&mut self.nodes, idx);
            }
            SchedState::CheckIn => {
                self.check_in(id);
                self.check_out(id);
            }
            SchedState::CheckOut => self.check_out(id),
        }
        Ok(!self.ready.is_empty())
    }

    /// Runs one callback and maps its result to the node's next state.
    fn invoke(&mut self, id: NodeId, callback: Callback) -> Result<(), SchedulerError> {
        if let Callback::Input = callback {
            // The inputs counted for this round are about to be consumed.
            self.reset_ready(id);
        }
        let Some(Some(node)) = self.nodes.get_mut(id.0 as usize) else {
            return Err(SchedulerError::NodeNotFound(id));
        };
        let mut io = NodeIo::new(&node.inputs, &node.outputs, &self.ports, &mut self.slots);
        let result = match callback {
            Callback::Input => {
                node.input_calls += 1;
                self.stats.input_calls += 1;
                node.processor.process_input(&mut io)
            }
            Callback::Output => {
                node.output_calls += 1;
                self.stats.output_calls += 1;
                node.processor.process_output(&mut io)
            }
        };
        if let Callback::Output = callback {
            self.drop_consumed(id);
        }

        let state = match result {
            Ok(ProcessStatus::NeedMoreInput) => SchedState::CheckIn,
            Ok(ProcessStatus::HaveOutput) => SchedState::CheckOut,
            Err(error) => return Err(SchedulerError::Process { node: id, error }),
        };
        if let Ok(node) = self.node_mut(id) {
            node.state = state;
        }
        Ok(())
    }

    /// Recounts the node's ready inputs and asks upstream peers of drained
    /// inputs to produce.
    ///
    /// The driver itself is not asked again unless it is asynchronous: its own
    /// request is what this activation is servicing.
    fn check_in(&mut self, id: NodeId) {
        let idx = id.0 as usize;
        let driver = self.driver;
        self.reset_ready(id);
        let Some(Some(node)) = self.nodes.get(idx) else {
            return;
        };
        debug_assert!(
            node.required_in > 0
                || node.inputs.iter().all(|p| {
                    self.ports
                        .get(p.0 as usize)
                        .and_then(|p| p.as_ref())
                        .is_none_or(|p| !p.is_required_input())
                }),
            "{id} declares required inputs but required_in is zero"
        );
        let count = node.inputs.len();

        for i in 0..count {
            let Some(port) = self.nodes[idx].as_ref().and_then(|n| n.inputs.get(i).copied())
            else {
                break;
            };
            let Ok(data) = self.port_data(port) else {
                continue;
            };
            let counted = data.is_required_input();
            let (Some(peer), Some(slot)) = (data.peer, data.slot) else {
                continue;
            };
            let status = self
                .slots
                .get(slot.0 as usize)
                .and_then(|s| s.as_ref())
                .map_or(Status::Ok, |s| s.status);

            match status {
                Status::NeedData => {
                    let Ok(upstream) = self.port_data(peer).map(|p| p.owner) else {
                        continue;
                    };
                    let Ok(up) = self.node_mut(upstream) else {
                        continue;
                    };
                    if driver != Some(upstream) || up.is_async() {
                        up.state = SchedState::Out;
                        self.ready.push_back(&mut self.nodes, upstream.0);
                    }
                }
                Status::Ok if counted => {
                    if let Some(Some(data)) = self.ports.get_mut(port.0 as usize) {
                        data.counted = true;
                    }
                    if let Some(Some(node)) = self.nodes.get_mut(idx) {
                        node.ready_in += 1;
                    }
                }
                Status::Ok | Status::HaveData | Status::Error => {}
            }
        }
    }

    /// Announces this node's outputs to every linked downstream input.
    fn check_out(&mut self, id: NodeId) {
        let idx = id.0 as usize;
        let count = self.nodes.get(idx).and_then(|n| n.as_ref()).map_or(0, |n| n.outputs.len());

        for i in 0..count {
            let Some(port) = self.nodes[idx].as_ref().and_then(|n| n.outputs.get(i).copied())
            else {
                break;
            };
            if let Some(peer) = self.peer(port) {
                self.port_check(peer);
            }
        }
    }

    /// Counts one input port of a downstream node and queues the node once
    /// all of its required inputs hold data.
    fn port_check(&mut self, port: PortId) {
        let Ok(data) = self.port_data(port) else {
            return;
        };
        let owner = data.owner;
        let status = data
            .slot
            .and_then(|s| self.slots.get(s.0 as usize))
            .and_then(|s| s.as_ref())
            .map(|s| s.status);
        // A slot announced twice before it is consumed still counts once.
        let fresh = data.is_required_input() && !data.counted && status == Some(Status::HaveData);
        if fresh && let Some(Some(data)) = self.ports.get_mut(port.0 as usize) {
            data.counted = true;
        }
        let Some(Some(node)) = self.nodes.get_mut(owner.0 as usize) else {
            return;
        };

        if fresh {
            node.ready_in += 1;
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(
            "sched_port_check: {port} on {owner} ready {}/{}",
            node.ready_in,
            node.required_in
        );

        if node.required_in > 0 && node.ready_in == node.required_in {
            node.state = SchedState::In;
            self.ready.push_back(&mut self.nodes, owner.0);
        } else {
            self.ready.remove(&mut self.nodes, owner.0);
        }
    }

    /// Starts a new counting round: zero `ready_in` and forget which inputs
    /// were counted.
    fn reset_ready(&mut self, id: NodeId) {
        let Some(Some(node)) = self.nodes.get_mut(id.0 as usize) else {
            return;
        };
        node.ready_in = 0;
        for port in &node.inputs {
            if let Some(Some(data)) = self.ports.get_mut(port.0 as usize) {
                data.counted = false;
            }
        }
    }

    /// Uncounts inputs a producing callback consumed outside `In`.
    fn drop_consumed(&mut self, id: NodeId) {
        let Some(Some(node)) = self.nodes.get_mut(id.0 as usize) else {
            return;
        };
        for port in &node.inputs {
            let Some(Some(data)) = self.ports.get_mut(port.0 as usize) else {
                continue;
            };
            let has_data = data
                .slot
                .and_then(|s| self.slots.get(s.0 as usize))
                .and_then(|s| s.as_ref())
                .is_some_and(|s| s.has_data());
            if data.counted && !has_data {
                data.counted = false;
                node.ready_in = node.ready_in.saturating_sub(1);
            }
        }
    }
}
