//! Graph description file format and operations.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::builder::BuiltGraph;
use crate::error::ConfigError;
use crate::node_config::NodeConfig;
use crate::validation::{ValidationResult, validate_graph};

/// A `node` or `node:index` reference to one port of a named node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRef<'a> {
    /// Node name.
    pub node: &'a str,
    /// Port index within the node, in creation order.
    pub index: u32,
}

impl<'a> PortRef<'a> {
    /// Parses `"node"` (index 0) or `"node:index"`.
    ///
    /// Returns `None` for an empty node name or a non-numeric index.
    ///
    /// ```rust
    /// use ripple_config::PortRef;
    ///
    /// assert_eq!(PortRef::parse("mix:1"), Some(PortRef { node: "mix", index: 1 }));
    /// assert_eq!(PortRef::parse("out"), Some(PortRef { node: "out", index: 0 }));
    /// assert_eq!(PortRef::parse("mix:x"), None);
    /// ```
    pub fn parse(s: &'a str) -> Option<Self> {
        let (node, index) = match s.split_once(':') {
            Some((node, index)) => (node.trim(), index.trim().parse().ok()?),
            None => (s.trim(), 0),
        };
        if node.is_empty() {
            return None;
        }
        Some(Self { node, index })
    }
}

/// A link from an output port to an input port.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkConfig {
    /// Producing port, `node` or `node:output_index`.
    pub from: String,
    /// Consuming port, `node` or `node:input_index`.
    pub to: String,
}

impl LinkConfig {
    /// Create a link description.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Parsed producing port.
    pub fn source(&self) -> Option<PortRef<'_>> {
        PortRef::parse(&self.from)
    }

    /// Parsed consuming port.
    pub fn target(&self) -> Option<PortRef<'_>> {
        PortRef::parse(&self.to)
    }
}

/// Activation entry point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ActivationMode {
    /// `Graph::pull`: a node needs input.
    Pull,
    /// `Graph::push`: a node produced data on its own.
    Push,
}

impl std::fmt::Display for ActivationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivationMode::Pull => f.write_str("pull"),
            ActivationMode::Push => f.write_str("push"),
        }
    }
}

/// One step of the activation script run by `ripple run`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivationConfig {
    /// Entry point.
    pub mode: ActivationMode,
    /// Driver node name.
    pub node: String,
    /// How many times to activate in a row.
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

fn default_repeat() -> u32 {
    1
}

impl ActivationConfig {
    /// A single pull of `node`.
    pub fn pull(node: impl Into<String>) -> Self {
        Self {
            mode: ActivationMode::Pull,
            node: node.into(),
            repeat: 1,
        }
    }

    /// A single push from `node`.
    pub fn push(node: impl Into<String>) -> Self {
        Self {
            mode: ActivationMode::Push,
            node: node.into(),
            repeat: 1,
        }
    }

    /// Repeat the activation `repeat` times.
    pub fn times(mut self, repeat: u32) -> Self {
        self.repeat = repeat;
        self
    }
}

/// A graph description: nodes, links and an activation script.
///
/// # TOML Format
///
/// ```toml
/// name = "fan-in"
/// description = "two sources into a two-input mixer"
///
/// [[nodes]]
/// name = "left"
/// kind = "source"
/// buffers = 4
///
/// [[nodes]]
/// name = "right"
/// kind = "source"
///
/// [[nodes]]
/// name = "mix"
/// kind = "mixer"
/// inputs = 2
///
/// [[nodes]]
/// name = "out"
/// kind = "sink"
///
/// [[links]]
/// from = "left"
/// to = "mix:0"
///
/// [[links]]
/// from = "right"
/// to = "mix:1"
///
/// [[links]]
/// from = "mix"
/// to = "out"
///
/// [[activations]]
/// mode = "pull"
/// node = "out"
/// repeat = 4
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphConfig {
    /// Name of the graph.
    pub name: String,

    /// Optional description of the graph.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Accept links that close a cycle.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub allow_cycles: bool,

    /// Nodes, in creation order.
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,

    /// Links between node ports.
    #[serde(default)]
    pub links: Vec<LinkConfig>,

    /// Activation script.
    #[serde(default)]
    pub activations: Vec<ActivationConfig>,
}

impl GraphConfig {
    /// Create an empty description.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            allow_cycles: false,
            nodes: Vec::new(),
            links: Vec::new(),
            activations: Vec::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a node.
    pub fn with_node(mut self, node: NodeConfig) -> Self {
        self.nodes.push(node);
        self
    }

    /// Add a link from `from` to `to` (`node` or `node:index`).
    pub fn with_link(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.links.push(LinkConfig::new(from, to));
        self
    }

    /// Append an activation step.
    pub fn with_activation(mut self, activation: ActivationConfig) -> Self {
        self.activations.push(activation);
        self
    }

    /// Load a description from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load a description from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the description to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the description to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Look up a node by name.
    pub fn node(&self, name: &str) -> Option<&NodeConfig> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Total number of activations the script performs.
    pub fn total_activations(&self) -> u64 {
        self.activations.iter().map(|a| u64::from(a.repeat)).sum()
    }

    /// Check names, port references, links and cycles.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_graph(self)
    }

    /// Validate and build a runnable graph.
    pub fn build(&self) -> Result<BuiltGraph, ConfigError> {
        BuiltGraph::from_config(self)
    }
}
