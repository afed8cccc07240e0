//! IO slots: the shared cell through which one link passes readiness.
//!
//! Every link owns exactly one [`IoSlot`]. The producing (output) port and the
//! consuming (input) port both refer to it by [`SlotId`]. Node processors write
//! `status` and `buffer_id`; the scheduler only ever reads `status`.

/// Unique identifier for an IO slot inside a graph.
///
/// Slot IDs are assigned sequentially and never reused within a graph instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotId(pub(crate) u32);

impl SlotId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Opaque handle of a buffer exchanged through a slot.
///
/// The scheduler never looks inside buffers; it only moves readiness around.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

/// Readiness signal carried by an [`IoSlot`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Status {
    /// No pending transition.
    #[default]
    Ok,
    /// The producer placed a buffer the consumer may read.
    HaveData,
    /// The consumer drained its buffer and wants more.
    NeedData,
    /// The link is in an error state.
    Error,
}

/// Status and buffer handle shared by the two ports of a link.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IoSlot {
    /// Readiness signal read by the scheduler.
    pub status: Status,
    /// Buffer currently associated with the slot, if any.
    pub buffer_id: Option<BufferId>,
}

impl IoSlot {
    /// Creates a slot with `Ok` status and no buffer.
    pub const fn new() -> Self {
        Self {
            status: Status::Ok,
            buffer_id: None,
        }
    }

    /// Places `buffer` in the slot and marks it `HaveData`.
    #[inline]
    pub fn provide(&mut self, buffer: BufferId) {
        self.buffer_id = Some(buffer);
        self.status = Status::HaveData;
    }

    /// Marks the slot `NeedData`, keeping whatever buffer id it still holds
    /// so the producer can recycle it.
    #[inline]
    pub fn request(&mut self) {
        self.status = Status::NeedData;
    }

    /// Consumes the pending buffer, if any, and asks for the next one.
    ///
    /// The buffer id is left in place for the producer to recycle; the
    /// returned value is what the consumer should read.
    #[inline]
    pub fn take(&mut self) -> Option<BufferId> {
        if self.status != Status::HaveData {
            return None;
        }
        self.status = Status::NeedData;
        self.buffer_id
    }

    /// Returns `true` if the slot reports `HaveData`.
    #[inline]
    pub fn has_data(&self) -> bool {
        self.status == Status::HaveData
    }

    /// Returns `true` if the slot reports `NeedData`.
    #[inline]
    pub fn needs_data(&self) -> bool {
        self.status == Status::NeedData
    }
}
