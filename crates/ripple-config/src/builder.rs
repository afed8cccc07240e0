//! Building a runnable [`Graph`] from a [`GraphConfig`].
//!
//! # Example
//!
//! ```rust
//! use ripple_config::get_factory_graph;
//!
//! let mut built = get_factory_graph("linear").unwrap().build().unwrap();
//! let total = built.run_script(|_| {}).unwrap();
//!
//! let probe = built.probe("out").unwrap();
//! assert_eq!(probe.received(), total);
//! ```

use ripple_core::{
    Direction, Graph, Mixer, NodeFlags, NodeId, NodeProcessor, PortFlags, PortId, SchedulerError,
    Sink, SinkProbe, Source,
};

use crate::error::ConfigError;
use crate::graph_config::{ActivationMode, GraphConfig, PortRef};
use crate::node_config::{NodeConfig, NodeKind};
use crate::validation::ValidationError;

/// One resolved step of the activation script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    /// Entry point.
    pub mode: ActivationMode,
    /// Driver node.
    pub node: NodeId,
    /// Driver node name.
    pub name: String,
    /// How many times to activate in a row.
    pub repeat: u32,
}

/// A graph built from a description, with its names and sink probes.
pub struct BuiltGraph {
    name: String,
    graph: Graph,
    nodes: Vec<(String, NodeId)>,
    probes: Vec<(String, SinkProbe)>,
    activations: Vec<Activation>,
}

impl BuiltGraph {
    /// Validates `config` and builds the graph it describes.
    ///
    /// Every sink's input slot starts out requesting data, so a pull on a sink
    /// propagates upstream right away.
    pub fn from_config(config: &GraphConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut graph = Graph::new();
        let mut nodes = Vec::with_capacity(config.nodes.len());
        let mut probes = Vec::new();

        for node in &config.nodes {
            let processor: Box<dyn NodeProcessor> = match node.kind {
                NodeKind::Source => Box::new(Source::new(node.buffer_count())),
                NodeKind::Mixer => Box::new(Mixer::new(node.buffer_count())),
                NodeKind::Sink => {
                    let (sink, probe) = Sink::with_probe();
                    probes.push((node.name.clone(), probe));
                    Box::new(sink)
                }
            };
            let id = graph.add_node(processor);
            add_ports(&mut graph, id, node)?;
            if node.is_async {
                graph.set_flags(id, NodeFlags::ASYNC)?;
            }
            if let Some(required_in) = node.required_in {
                graph.set_required_in(id, required_in)?;
            }
            nodes.push((node.name.clone(), id));
        }

        let mut built = Self {
            name: config.name.clone(),
            graph,
            nodes,
            probes,
            activations: Vec::new(),
        };

        for link in &config.links {
            let output = built.resolve(&link.from, Direction::Output)?;
            let input = built.resolve(&link.to, Direction::Input)?;
            built.graph.link(output, input)?;
        }

        for (name, id) in &built.nodes {
            if config.node(name).is_some_and(|n| n.kind == NodeKind::Sink)
                && let Some(&port) = built.graph.input_ports(*id).and_then(|p| p.first())
                && let Some(slot) = built.graph.slot_mut(port)
            {
                slot.request();
            }
        }

        for activation in &config.activations {
            let node = built
                .node_id(&activation.node)
                .ok_or_else(|| ValidationError::UnknownNode(activation.node.clone()))?;
            built.activations.push(Activation {
                mode: activation.mode,
                node,
                name: activation.node.clone(),
                repeat: activation.repeat,
            });
        }

        Ok(built)
    }

    /// Name of the description this graph was built from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The built graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Mutable access to the built graph.
    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    /// Consumes the wrapper and returns the graph.
    pub fn into_graph(self) -> Graph {
        self.graph
    }

    /// Node id for a description name.
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().find(|(n, _)| n == name).map(|(_, id)| *id)
    }

    /// Description name for a node id.
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        self.nodes
            .iter()
            .find(|(_, node)| *node == id)
            .map(|(name, _)| name.as_str())
    }

    /// Named nodes, in description order.
    pub fn nodes(&self) -> impl Iterator<Item = (&str, NodeId)> + '_ {
        self.nodes.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// Probe of the sink named `name`.
    pub fn probe(&self, name: &str) -> Option<&SinkProbe> {
        self.probes.iter().find(|(n, _)| n == name).map(|(_, p)| p)
    }

    /// All sinks with their probes, in description order.
    pub fn sinks(&self) -> impl Iterator<Item = (&str, &SinkProbe)> + '_ {
        self.probes.iter().map(|(name, probe)| (name.as_str(), probe))
    }

    /// The resolved activation script.
    pub fn activations(&self) -> &[Activation] {
        &self.activations
    }

    /// Total number of activations the script performs.
    pub fn total_activations(&self) -> u64 {
        self.activations.iter().map(|a| u64::from(a.repeat)).sum()
    }

    /// Runs one activation.
    pub fn activate(&mut self, mode: ActivationMode, node: NodeId) -> Result<(), SchedulerError> {
        match mode {
            ActivationMode::Pull => self.graph.pull(node),
            ActivationMode::Push => self.graph.push(node),
        }
    }

    /// Runs the whole activation script, calling `progress` with the number of
    /// activations completed so far after each one.
    ///
    /// Returns the number of activations performed.
    pub fn run_script(&mut self, mut progress: impl FnMut(u64)) -> Result<u64, SchedulerError> {
        let steps: Vec<(ActivationMode, NodeId, u32)> = self
            .activations
            .iter()
            .map(|a| (a.mode, a.node, a.repeat))
            .collect();

        let mut done = 0;
        for (mode, node, repeat) in steps {
            for _ in 0..repeat {
                self.activate(mode, node)?;
                done += 1;
                progress(done);
            }
        }
        Ok(done)
    }

    fn resolve(&self, reference: &str, direction: Direction) -> Result<PortId, ConfigError> {
        let port = PortRef::parse(reference)
            .ok_or_else(|| ValidationError::InvalidPortRef(reference.to_string()))?;
        let id = self
            .node_id(port.node)
            .ok_or_else(|| ValidationError::UnknownNode(port.node.to_string()))?;
        let ports = match direction {
            Direction::Input => self.graph.input_ports(id),
            Direction::Output => self.graph.output_ports(id),
        }
        .unwrap_or_default();

        ports.get(port.index as usize).copied().ok_or_else(|| {
            ConfigError::Validation(ValidationError::PortOutOfRange {
                node: port.node.to_string(),
                direction: match direction {
                    Direction::Input => "input",
                    Direction::Output => "output",
                },
                index: port.index,
                count: ports.len() as u32,
            })
        })
    }
}

fn add_ports(graph: &mut Graph, id: NodeId, node: &NodeConfig) -> Result<(), ConfigError> {
    for i in 0..node.input_count() {
        let flags = if node.is_optional_input(i) {
            PortFlags::OPTIONAL
        } else {
            PortFlags::NONE
        };
        graph.add_port(id, Direction::Input, flags)?;
    }
    for _ in 0..node.output_count() {
        graph.add_port(id, Direction::Output, PortFlags::NONE)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph_config::ActivationConfig;
    use ripple_core::Status;

    fn fan_in() -> GraphConfig {
        GraphConfig::new("fan-in")
            .with_node(NodeConfig::new("a", NodeKind::Source))
            .with_node(NodeConfig::new("b", NodeKind::Source).with_buffers(2))
            .with_node(NodeConfig::new("mix", NodeKind::Mixer))
            .with_node(NodeConfig::new("out", NodeKind::Sink))
            .with_link("a", "mix:0")
            .with_link("b", "mix:1")
            .with_link("mix", "out")
            .with_activation(ActivationConfig::pull("out").times(5))
    }

    #[test]
    fn builds_nodes_ports_and_links() {
        let built = BuiltGraph::from_config(&fan_in()).unwrap();
        let graph = built.graph();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.port_count(), 6);
        assert_eq!(graph.link_count(), 3);

        let mix = built.node_id("mix").unwrap();
        assert_eq!(graph.required_in(mix), Some(2));
        assert_eq!(built.node_name(mix), Some("mix"));
        assert_eq!(graph.node_name(mix), Some("mixer"));
    }

    #[test]
    fn sink_input_starts_requesting() {
        let built = BuiltGraph::from_config(&fan_in()).unwrap();
        let out = built.node_id("out").unwrap();
        let port = built.graph().input_ports(out).unwrap()[0];
        assert_eq!(built.graph().slot(port).unwrap().status, Status::NeedData);
    }

    #[test]
    fn runs_activation_script() {
        let mut built = BuiltGraph::from_config(&fan_in()).unwrap();
        let mut seen = Vec::new();
        let total = built.run_script(|n| seen.push(n)).unwrap();

        assert_eq!(total, 5);
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
        assert_eq!(built.probe("out").unwrap().received(), 5);
        assert_eq!(built.graph().queued_count(), 0);
    }

    #[test]
    fn settings_reach_the_graph() {
        let config = GraphConfig::new("settings")
            .with_node(NodeConfig::new("cap", NodeKind::Source).with_async(true))
            .with_node(
                NodeConfig::new("mix", NodeKind::Mixer)
                    .with_inputs(3)
                    .with_optional_input(2)
                    .with_required_in(1),
            )
            .with_link("cap", "mix:0");
        let built = config.build().unwrap();
        let graph = built.graph();

        let cap = built.node_id("cap").unwrap();
        let mix = built.node_id("mix").unwrap();
        assert!(graph.flags(cap).unwrap().contains(NodeFlags::ASYNC));
        assert_eq!(graph.required_in(mix), Some(1));
        let optional = graph.input_ports(mix).unwrap()[2];
        assert!(graph.port(optional).unwrap().flags.contains(PortFlags::OPTIONAL));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = fan_in().with_link("a", "ghost");
        assert!(matches!(
            BuiltGraph::from_config(&config),
            Err(ConfigError::Validation(_))
        ));
    }
}
