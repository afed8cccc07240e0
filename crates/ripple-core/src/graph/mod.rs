//! Graph data model and scheduling engine.
//!
//! A [`Graph`] holds nodes, their ports, the links between ports and a single
//! ready queue. Links share one [`IoSlot`] between the producing and the
//! consuming port; its [`Status`] is the only readiness signal the scheduler
//! looks at.
//!
//! # Architecture
//!
//! - **Arenas**: nodes, ports and slots live in `Vec<Option<_>>` arenas
//!   addressed by [`NodeId`], [`PortId`] and [`SlotId`]. Ids are never reused.
//! - **Ready queue**: an intrusive FIFO whose links live inside each node, so
//!   enqueue, dequeue and remove-from-middle are O(1) and allocation-free.
//! - **Scheduler**: [`Graph::pull()`] and [`Graph::push()`] seed the queue
//!   with a driver node and dispatch until quiescence. See
//!   [`scheduler`](self::scheduler) for the state machine.
//!
//! Structural changes (`add_node`, `link`, ...) and activations both take
//! `&mut Graph`, so the graph can never be rewired while it is being
//! scheduled.
//!
//! # Example
//!
//! ```rust
//! use ripple_core::graph::{Direction, Graph, PortFlags};
//! use ripple_core::nodes::{Sink, Source};
//!
//! let mut graph = Graph::new();
//! let source = graph.add_node(Box::new(Source::new(2)));
//! let (sink, probe) = Sink::with_probe();
//! let sink = graph.add_node(Box::new(sink));
//!
//! let out = graph.add_port(source, Direction::Output, PortFlags::NONE).unwrap();
//! let inp = graph.add_port(sink, Direction::Input, PortFlags::NONE).unwrap();
//! graph.link(out, inp).unwrap();
//!
//! graph.slot_mut(inp).unwrap().request();
//! graph.pull(sink).unwrap();
//! assert_eq!(probe.received(), 1);
//! ```

pub mod io;
pub mod node;
pub mod port;
mod queue;
pub mod scheduler;
mod topology;

pub use io::{BufferId, IoSlot, SlotId, Status};
pub use node::{NodeFlags, NodeId, SchedState};
pub use port::{Direction, PortFlags, PortId, PortInfo};
pub use scheduler::{ActivationStats, SchedulerError};
pub use topology::{Graph, GraphError};
