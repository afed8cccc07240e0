//! Graph descriptions for the ripple scheduling engine.
//!
//! This crate describes ripple graphs in TOML files and turns them into
//! runnable [`ripple_core::Graph`]s.
//!
//! # Features
//!
//! - **Graph Descriptions**: Load and save nodes, links and activation scripts
//! - **Validation**: Names, port references, link exclusivity and cycles
//! - **Building**: Create the graph with built-in source, sink and mixer nodes
//! - **Factory Graphs**: Built-in descriptions of the basic scheduling shapes
//!
//! # Example
//!
//! ```rust,no_run
//! use ripple_config::{ActivationConfig, GraphConfig, NodeConfig, NodeKind};
//!
//! let config = GraphConfig::new("my graph")
//!     .with_description("one source, one sink")
//!     .with_node(NodeConfig::new("src", NodeKind::Source).with_buffers(2))
//!     .with_node(NodeConfig::new("out", NodeKind::Sink))
//!     .with_link("src", "out")
//!     .with_activation(ActivationConfig::pull("out").times(8));
//!
//! config.save("graphs/my_graph.toml").unwrap();
//!
//! let loaded = GraphConfig::load("graphs/my_graph.toml").unwrap();
//! let mut built = loaded.build().unwrap();
//! built.run_script(|_| {}).unwrap();
//! ```

mod builder;
mod error;
mod graph_config;
mod node_config;

/// Graph description validation.
pub mod validation;

/// Factory graphs bundled with the library.
pub mod factory_graphs;

pub use builder::{Activation, BuiltGraph};
pub use error::ConfigError;
pub use factory_graphs::{
    FACTORY_GRAPH_NAMES, factory_graph_names, factory_graphs, get_factory_graph, is_factory_graph,
};
pub use graph_config::{ActivationConfig, ActivationMode, GraphConfig, LinkConfig, PortRef};
pub use node_config::{DEFAULT_BUFFERS, DEFAULT_MIXER_INPUTS, NodeConfig, NodeKind};
pub use validation::{ValidationError, ValidationResult, validate_graph};
