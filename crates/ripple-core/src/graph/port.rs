//! Port types: directional attachment points on a node.
//!
//! A port belongs to exactly one node and is linked to at most one peer. While
//! linked it refers to the link's [`IoSlot`](super::io::IoSlot) by id.

use super::io::SlotId;
use super::node::NodeId;

/// Unique identifier for a port in the graph.
///
/// Port IDs are assigned sequentially and never reused within a graph instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PortId(pub(crate) u32);

impl PortId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for PortId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "PortId({})", self.0)
    }
}

/// Data direction of a port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Consumes data from an upstream peer.
    Input,
    /// Produces data for a downstream peer.
    Output,
}

/// Port capability flags.
///
/// ```rust
/// use ripple_core::PortFlags;
///
/// let flags = PortFlags::NONE.union(PortFlags::OPTIONAL);
/// assert!(flags.contains(PortFlags::OPTIONAL));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortFlags(u8);

impl PortFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Input port that does not count towards the node's `required_in`.
    pub const OPTIONAL: Self = Self(1 << 0);

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

/// Internal bookkeeping for a port.
#[derive(Debug, Clone)]
pub(crate) struct PortData {
    pub direction: Direction,
    pub owner: NodeId,
    pub flags: PortFlags,
    /// Slot of the link this port takes part in.
    pub slot: Option<SlotId>,
    /// The port on the other end of the link.
    pub peer: Option<PortId>,
    /// Already counted into the owner's `ready_in` this round.
    pub counted: bool,
}

impl PortData {
    pub fn new(direction: Direction, owner: NodeId, flags: PortFlags) -> Self {
        Self {
            direction,
            owner,
            flags,
            slot: None,
            peer: None,
            counted: false,
        }
    }

    /// Whether this port contributes to its owner's `required_in`.
    #[inline]
    pub fn is_required_input(&self) -> bool {
        self.direction == Direction::Input && !self.flags.contains(PortFlags::OPTIONAL)
    }
}

/// Read-only view of a port, returned by [`Graph::port()`](super::Graph::port).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortInfo {
    /// Direction of the port.
    pub direction: Direction,
    /// Node that owns the port.
    pub owner: NodeId,
    /// Port flags.
    pub flags: PortFlags,
    /// Slot of the link, if linked.
    pub slot: Option<SlotId>,
    /// Linked peer, if any.
    pub peer: Option<PortId>,
}

impl From<&PortData> for PortInfo {
    fn from(data: &PortData) -> Self {
        Self {
            direction: data.direction,
            owner: data.owner,
            flags: data.flags,
            slot: data.slot,
            peer: data.peer,
        }
    }
}
