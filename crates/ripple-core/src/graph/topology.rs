//! Graph structure: node, port and link mutation plus read accessors.
//!
//! [`Graph`] owns three arenas (nodes, ports, IO slots) addressed by stable
//! ids, and the single ready queue the scheduler drains. Everything in this
//! file is structural and happens at quiescence: mutation and
//! [`pull()`](Graph::pull) / [`push()`](Graph::push) all take `&mut self`.

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, vec, vec::Vec};

use crate::process::NodeProcessor;

use super::io::{BufferId, IoSlot, SlotId};
use super::node::{NodeData, NodeFlags, NodeId, SchedState};
use super::port::{Direction, PortData, PortFlags, PortId, PortInfo};
use super::queue::ReadyQueue;
use super::scheduler::ActivationStats;

/// Errors that can occur during structural graph operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphError {
    /// The specified node was not found in the graph.
    NodeNotFound(NodeId),
    /// The specified port was not found in the graph.
    PortNotFound(PortId),
    /// The port has the wrong direction for this operation.
    DirectionMismatch(PortId),
    /// The port is already linked to a peer.
    AlreadyLinked(PortId),
    /// The two ports are not linked to each other.
    NotLinked(PortId, PortId),
    /// Both ports belong to the same node.
    SameNode(NodeId),
}

impl core::fmt::Display for GraphError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "node {id} not found"),
            Self::PortNotFound(id) => write!(f, "port {id} not found"),
            Self::DirectionMismatch(id) => write!(f, "port {id} has the wrong direction"),
            Self::AlreadyLinked(id) => write!(f, "port {id} is already linked"),
            Self::NotLinked(a, b) => write!(f, "ports {a} and {b} are not linked"),
            Self::SameNode(id) => write!(f, "cannot link node {id} to itself"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GraphError {}

/// A media graph: nodes, their ports, the links between them and the ready
/// queue used to schedule them.
///
/// # Usage
///
/// 1. Create a graph with [`new()`](Self::new)
/// 2. Add nodes with [`add_node()`](Self::add_node) and ports with
///    [`add_port()`](Self::add_port)
/// 3. Link output ports to input ports with [`link()`](Self::link)
/// 4. Drive activations with [`pull()`](Self::pull) or [`push()`](Self::push)
pub struct Graph {
    pub(crate) nodes: Vec<Option<NodeData>>,
    pub(crate) ports: Vec<Option<PortData>>,
    pub(crate) slots: Vec<Option<IoSlot>>,
    pub(super) ready: ReadyQueue,
    /// Node that started the activation in progress.
    pub(super) driver: Option<NodeId>,
    pub(super) stats: ActivationStats,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            ports: Vec::new(),
            slots: Vec::new(),
            ready: ReadyQueue::new(),
            driver: None,
            stats: ActivationStats::default(),
        }
    }

    // --- Node mutations ---

    /// Adds a node driven by `processor`. Returns the new node's ID.
    ///
    /// The node starts in [`SchedState::CheckIn`] with no ports.
    pub fn add_node(&mut self, processor: Box<dyn NodeProcessor>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_add: node {id} ({})", processor.name());
        self.nodes.push(Some(NodeData::new(processor)));
        id
    }

    /// Removes a node, unlinking and removing all of its ports.
    ///
    /// If the node is still in the ready queue it is taken out first.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        let node = self.node(id)?;
        let ports: Vec<PortId> = node.inputs.iter().chain(node.outputs.iter()).copied().collect();

        self.ready.remove(&mut self.nodes, id.0);
        for port in ports {
            self.unlink_port(port);
            self.ports[port.0 as usize] = None;
        }
        self.nodes[id.0 as usize] = None;
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_remove: node {id}");
        Ok(())
    }

    /// Adds a port to `node`.
    ///
    /// Non-optional input ports increase the node's `required_in`.
    pub fn add_port(
        &mut self,
        node: NodeId,
        direction: Direction,
        flags: PortFlags,
    ) -> Result<PortId, GraphError> {
        self.node(node)?;
        let id = PortId(self.ports.len() as u32);
        let data = PortData::new(direction, node, flags);
        let required = data.is_required_input();
        self.ports.push(Some(data));

        let node_data = self.node_mut(node)?;
        match direction {
            Direction::Input => node_data.inputs.push(id),
            Direction::Output => node_data.outputs.push(id),
        }
        if required {
            node_data.required_in += 1;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_add: port {id} {direction:?} on {node}");
        Ok(id)
    }

    /// Removes a port, unlinking it first if necessary.
    pub fn remove_port(&mut self, id: PortId) -> Result<(), GraphError> {
        let port = self.port_data(id)?;
        let owner = port.owner;
        let required = port.is_required_input();

        self.unlink_port(id);
        self.ports[id.0 as usize] = None;

        let node = self.node_mut(owner)?;
        node.inputs.retain(|p| *p != id);
        node.outputs.retain(|p| *p != id);
        if required {
            node.required_in = node.required_in.saturating_sub(1);
        }
        node.ready_in = node.ready_in.min(node.required_in);
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_remove: port {id}");
        Ok(())
    }

    /// Links an output port to an input port through a fresh [`IoSlot`].
    ///
    /// Returns the new slot's ID, or an error if:
    /// - Either port doesn't exist
    /// - `output` is not an output port or `input` is not an input port
    /// - Either port is already linked
    /// - Both ports belong to the same node
    pub fn link(&mut self, output: PortId, input: PortId) -> Result<SlotId, GraphError> {
        let out = self.port_data(output)?;
        let inp = self.port_data(input)?;

        if out.direction != Direction::Output {
            return Err(GraphError::DirectionMismatch(output));
        }
        if inp.direction != Direction::Input {
            return Err(GraphError::DirectionMismatch(input));
        }
        if out.peer.is_some() {
            return Err(GraphError::AlreadyLinked(output));
        }
        if inp.peer.is_some() {
            return Err(GraphError::AlreadyLinked(input));
        }
        if out.owner == inp.owner {
            return Err(GraphError::SameNode(out.owner));
        }

        // Slot ids are never reused: each link appends a slot and unlinking
        // leaves a `None` hole, so the arena grows with link churn.
        let slot = SlotId(self.slots.len() as u32);
        self.slots.push(Some(IoSlot::new()));

        if let Some(Some(port)) = self.ports.get_mut(output.0 as usize) {
            port.peer = Some(input);
            port.slot = Some(slot);
        }
        if let Some(Some(port)) = self.ports.get_mut(input.0 as usize) {
            port.peer = Some(output);
            port.slot = Some(slot);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_link: {output} → {input} via slot {}", slot.0);
        Ok(slot)
    }

    /// Tears down the link between `output` and `input`, freeing its slot.
    pub fn unlink(&mut self, output: PortId, input: PortId) -> Result<(), GraphError> {
        let out = self.port_data(output)?;
        self.port_data(input)?;
        if out.peer != Some(input) {
            return Err(GraphError::NotLinked(output, input));
        }
        self.unlink_port(output);
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_unlink: {output} ↛ {input}");
        Ok(())
    }

    /// Overrides the number of inputs that must report data before the node
    /// may run `process_input`.
    ///
    /// Set by the format-negotiation layer before the first activation.
    pub fn set_required_in(&mut self, id: NodeId, required_in: u32) -> Result<(), GraphError> {
        let node = self.node_mut(id)?;
        node.required_in = required_in;
        node.ready_in = node.ready_in.min(required_in);
        Ok(())
    }

    /// Replaces the node's flags.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) -> Result<(), GraphError> {
        self.node_mut(id)?.flags = flags;
        Ok(())
    }

    /// Hands a consumed buffer back to the processor that owns output `port`.
    pub fn reuse_buffer(&mut self, port: PortId, buffer: BufferId) -> Result<(), GraphError> {
        let data = self.port_data(port)?;
        if data.direction != Direction::Output {
            return Err(GraphError::DirectionMismatch(port));
        }
        let owner = data.owner;
        let node = self.node_mut(owner)?;
        let index = node
            .outputs
            .iter()
            .position(|p| *p == port)
            .ok_or(GraphError::PortNotFound(port))?;
        node.processor.reuse_buffer(index, buffer);
        Ok(())
    }

    // --- Accessors ---

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    /// Number of live ports.
    pub fn port_count(&self) -> usize {
        self.ports.iter().flatten().count()
    }

    /// Number of live links.
    pub fn link_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// IDs of all live nodes, in creation order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_some())
            .map(|(i, _)| NodeId(i as u32))
    }

    /// Returns `true` if `id` names a live node.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    /// Current scheduling state of a node.
    pub fn state(&self, id: NodeId) -> Option<SchedState> {
        self.node(id).ok().map(|n| n.state)
    }

    /// Number of inputs the node needs before `process_input` may run.
    pub fn required_in(&self, id: NodeId) -> Option<u32> {
        self.node(id).ok().map(|n| n.required_in)
    }

    /// Number of inputs counted ready in the current round.
    pub fn ready_in(&self, id: NodeId) -> Option<u32> {
        self.node(id).ok().map(|n| n.ready_in)
    }

    /// Flags of a node.
    pub fn flags(&self, id: NodeId) -> Option<NodeFlags> {
        self.node(id).ok().map(|n| n.flags)
    }

    /// Name reported by the node's processor.
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        self.node(id).ok().map(|n| n.processor.name())
    }

    /// Returns `true` if the node is currently in the ready queue.
    pub fn is_queued(&self, id: NodeId) -> bool {
        ReadyQueue::contains(&self.nodes, id.0)
    }

    /// Number of nodes in the ready queue. Zero at quiescence.
    pub fn queued_count(&self) -> usize {
        self.ready.len()
    }

    /// Lifetime count of `process_input` invocations on a node.
    pub fn input_calls(&self, id: NodeId) -> Option<u64> {
        self.node(id).ok().map(|n| n.input_calls)
    }

    /// Lifetime count of `process_output` invocations on a node.
    pub fn output_calls(&self, id: NodeId) -> Option<u64> {
        self.node(id).ok().map(|n| n.output_calls)
    }

    /// Input ports of a node, in creation order.
    pub fn input_ports(&self, id: NodeId) -> Option<&[PortId]> {
        self.node(id).ok().map(|n| n.inputs.as_slice())
    }

    /// Output ports of a node, in creation order.
    pub fn output_ports(&self, id: NodeId) -> Option<&[PortId]> {
        self.node(id).ok().map(|n| n.outputs.as_slice())
    }

    /// Read-only view of a port.
    pub fn port(&self, id: PortId) -> Option<PortInfo> {
        self.port_data(id).ok().map(PortInfo::from)
    }

    /// Peer of a linked port.
    pub fn peer(&self, id: PortId) -> Option<PortId> {
        self.port_data(id).ok()?.peer
    }

    /// The IO slot behind a linked port.
    pub fn slot(&self, port: PortId) -> Option<&IoSlot> {
        let slot = self.port_data(port).ok()?.slot?;
        self.slots.get(slot.0 as usize)?.as_ref()
    }

    /// Mutable access to the IO slot behind a linked port.
    ///
    /// This is how node implementations outside the dispatch loop publish
    /// status before calling [`pull()`](Self::pull) or [`push()`](Self::push).
    pub fn slot_mut(&mut self, port: PortId) -> Option<&mut IoSlot> {
        let slot = self.port_data(port).ok()?.slot?;
        self.slots.get_mut(slot.0 as usize)?.as_mut()
    }

    /// DFS reachability check: can `from` reach `to` by following links
    /// downstream?
    pub fn can_reach(&self, from: NodeId, to: NodeId) -> bool {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![from];

        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            let idx = current.0 as usize;
            if idx >= visited.len() || visited[idx] {
                continue;
            }
            visited[idx] = true;

            if let Some(Some(node)) = self.nodes.get(idx) {
                for port in &node.outputs {
                    let peer = self.peer(*port).and_then(|p| self.port_data(p).ok());
                    if let Some(peer) = peer {
                        stack.push(peer.owner);
                    }
                }
            }
        }
        false
    }

    // --- Internal helpers ---

    pub(crate) fn node(&self, id: NodeId) -> Result<&NodeData, GraphError> {
        self.nodes
            .get(id.0 as usize)
            .and_then(|n| n.as_ref())
            .ok_or(GraphError::NodeNotFound(id))
    }

    pub(super) fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData, GraphError> {
        self.nodes
            .get_mut(id.0 as usize)
            .and_then(|n| n.as_mut())
            .ok_or(GraphError::NodeNotFound(id))
    }

    pub(super) fn port_data(&self, id: PortId) -> Result<&PortData, GraphError> {
        self.ports
            .get(id.0 as usize)
            .and_then(|p| p.as_ref())
            .ok_or(GraphError::PortNotFound(id))
    }

    /// Breaks the link `port` takes part in, if any, and frees its slot.
    fn unlink_port(&mut self, port: PortId) {
        let Some(Some(data)) = self.ports.get_mut(port.0 as usize) else {
            return;
        };
        let peer = data.peer.take();
        let slot = data.slot.take();
        self.uncount(port);

        if let Some(peer) = peer
            && let Some(Some(peer_data)) = self.ports.get_mut(peer.0 as usize)
        {
            peer_data.peer = None;
            peer_data.slot = None;
            self.uncount(peer);
        }
        if let Some(slot) = slot {
            self.slots[slot.0 as usize] = None;
        }
    }

    /// Takes an input that was counted ready back out of its owner's
    /// `ready_in`.
    fn uncount(&mut self, port: PortId) {
        let Some(Some(data)) = self.ports.get_mut(port.0 as usize) else {
            return;
        };
        if !core::mem::take(&mut data.counted) {
            return;
        }
        let owner = data.owner;
        if let Ok(node) = self.node_mut(owner) {
            node.ready_in = node.ready_in.saturating_sub(1);
        }
    }
}
