//! Ripple Core - Graph scheduling engine
//!
//! This crate connects independent processing units ("nodes") into a directed
//! graph and decides, on every pull or push event, which nodes must run and in
//! what order. It never looks inside buffers: readiness travels through one
//! [`IoSlot`] per link, and the scheduler only reads each slot's [`Status`].
//!
//! # Features
//!
//! - `std` (default): Enables `std::error::Error` impls for the error types
//! - `tracing`: Emits `tracing` events for structural changes and dispatch
//!
//! # no_std Support
//!
//! The crate is `no_std` compatible with `alloc`. Disable default features:
//!
//! ```toml
//! [dependencies]
//! ripple-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Core Abstractions
//!
//! - [`Graph`]: nodes, ports, links and the ready queue
//! - [`NodeProcessor`]: the two callbacks a node supplies
//! - [`Graph::pull()`] / [`Graph::push()`]: the two activation entry points
//! - [`nodes`]: built-in [`Source`], [`Sink`] and [`Mixer`] processors

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod graph;
pub mod nodes;
pub mod process;

pub use graph::{
    ActivationStats, BufferId, Direction, Graph, GraphError, IoSlot, NodeFlags, NodeId,
    PortFlags, PortId, PortInfo, SchedState, SchedulerError, SlotId, Status,
};
pub use nodes::{MAX_POOL_BUFFERS, Mixer, Sink, SinkProbe, Source};
pub use process::{FnProcessor, NodeIo, NodeProcessor, ProcessError, ProcessStatus};
