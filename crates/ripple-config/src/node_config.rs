//! Node description types.

use serde::{Deserialize, Serialize};

/// Default number of buffer ids owned by a producing node.
pub const DEFAULT_BUFFERS: u32 = 4;

/// Default number of mixer inputs.
pub const DEFAULT_MIXER_INPUTS: u32 = 2;

/// Built-in processor a node is created with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// One output, produces on request.
    Source,
    /// One input, consumes and counts.
    Sink,
    /// `inputs` inputs folded into one output.
    Mixer,
}

impl NodeKind {
    /// All kinds, in documentation order.
    pub const ALL: [NodeKind; 3] = [NodeKind::Source, NodeKind::Sink, NodeKind::Mixer];

    /// Lowercase name as written in description files.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Source => "source",
            NodeKind::Sink => "sink",
            NodeKind::Mixer => "mixer",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for a single node in a graph description.
///
/// # Example
///
/// ```rust
/// use ripple_config::{NodeConfig, NodeKind};
///
/// let mix = NodeConfig::new("mix", NodeKind::Mixer)
///     .with_inputs(3)
///     .with_optional_input(2);
///
/// assert_eq!(mix.input_count(), 3);
/// assert_eq!(mix.output_count(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeConfig {
    /// Unique node name, used by links and activations.
    pub name: String,

    /// Processor kind.
    pub kind: NodeKind,

    /// Number of input ports (mixers only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<u32>,

    /// Size of the buffer pool (sources and mixers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffers: Option<u32>,

    /// Mark the node asynchronous.
    #[serde(default, rename = "async", skip_serializing_if = "std::ops::Not::not")]
    pub is_async: bool,

    /// Override for the number of inputs that must hold data before the node runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_in: Option<u32>,

    /// Input port indices created with the optional flag.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub optional_inputs: Vec<u32>,
}

impl NodeConfig {
    /// Create a node description with default settings.
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            inputs: None,
            buffers: None,
            is_async: false,
            required_in: None,
            optional_inputs: Vec::new(),
        }
    }

    /// Set the number of mixer inputs.
    pub fn with_inputs(mut self, inputs: u32) -> Self {
        self.inputs = Some(inputs);
        self
    }

    /// Set the buffer pool size.
    pub fn with_buffers(mut self, buffers: u32) -> Self {
        self.buffers = Some(buffers);
        self
    }

    /// Mark the node asynchronous.
    pub fn with_async(mut self, is_async: bool) -> Self {
        self.is_async = is_async;
        self
    }

    /// Override `required_in`.
    pub fn with_required_in(mut self, required_in: u32) -> Self {
        self.required_in = Some(required_in);
        self
    }

    /// Flag input `index` optional.
    pub fn with_optional_input(mut self, index: u32) -> Self {
        if !self.optional_inputs.contains(&index) {
            self.optional_inputs.push(index);
        }
        self
    }

    /// Number of input ports the node is created with.
    pub fn input_count(&self) -> u32 {
        match self.kind {
            NodeKind::Source => 0,
            NodeKind::Sink => 1,
            NodeKind::Mixer => self.inputs.unwrap_or(DEFAULT_MIXER_INPUTS),
        }
    }

    /// Number of output ports the node is created with.
    pub fn output_count(&self) -> u32 {
        match self.kind {
            NodeKind::Source | NodeKind::Mixer => 1,
            NodeKind::Sink => 0,
        }
    }

    /// Buffer pool size, falling back to [`DEFAULT_BUFFERS`].
    pub fn buffer_count(&self) -> u32 {
        self.buffers.unwrap_or(DEFAULT_BUFFERS)
    }

    /// Returns `true` if input `index` is flagged optional.
    pub fn is_optional_input(&self, index: u32) -> bool {
        self.optional_inputs.contains(&index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_counts_per_kind() {
        let src = NodeConfig::new("a", NodeKind::Source);
        let sink = NodeConfig::new("b", NodeKind::Sink);
        let mix = NodeConfig::new("c", NodeKind::Mixer);
        assert_eq!((src.input_count(), src.output_count()), (0, 1));
        assert_eq!((sink.input_count(), sink.output_count()), (1, 0));
        assert_eq!((mix.input_count(), mix.output_count()), (2, 1));
        assert_eq!(mix.with_inputs(5).input_count(), 5);
    }

    #[test]
    fn optional_input_is_recorded_once() {
        let node = NodeConfig::new("m", NodeKind::Mixer)
            .with_optional_input(1)
            .with_optional_input(1);
        assert_eq!(node.optional_inputs, vec![1]);
        assert!(node.is_optional_input(1));
        assert!(!node.is_optional_input(0));
    }

    #[test]
    fn kind_display() {
        assert_eq!(NodeKind::Mixer.to_string(), "mixer");
        assert_eq!(NodeKind::ALL.len(), 3);
    }

    #[test]
    fn defaults_are_skipped_when_serialized() {
        let toml = toml::to_string(&NodeConfig::new("out", NodeKind::Sink)).unwrap();
        assert_eq!(toml.trim(), "name = \"out\"\nkind = \"sink\"");
    }

    #[test]
    fn async_field_name() {
        let node: NodeConfig =
            toml::from_str("name = \"cap\"\nkind = \"source\"\nasync = true\n").unwrap();
        assert!(node.is_async);
        assert_eq!(node.buffer_count(), DEFAULT_BUFFERS);
    }
}
