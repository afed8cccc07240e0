//! Graph description validation.
//!
//! Checks everything that can be decided from the description alone: node
//! names, port references, link exclusivity, `required_in` overrides,
//! activation targets (no push on an async node), and (unless `allow_cycles`
//! is set) cycles. Cycles are detected the way the graph itself would see
//! them, by wiring a skeleton [`Graph`] link by link and asking
//! [`Graph::can_reach`] before each link.
//!
//! # Example
//!
//! ```rust
//! use ripple_config::{GraphConfig, NodeConfig, NodeKind, ValidationError};
//!
//! let config = GraphConfig::new("broken")
//!     .with_node(NodeConfig::new("src", NodeKind::Source))
//!     .with_link("src", "nowhere");
//!
//! assert_eq!(
//!     config.validate(),
//!     Err(ValidationError::UnknownNode("nowhere".to_string()))
//! );
//! ```

use std::collections::{HashMap, HashSet};

use ripple_core::{
    Direction, FnProcessor, Graph, MAX_POOL_BUFFERS, NodeId, PortFlags, ProcessStatus,
};
use thiserror::Error;

use crate::graph_config::{ActivationMode, GraphConfig, PortRef};
use crate::node_config::NodeKind;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A node has an empty name.
    #[error("node #{0} has an empty name")]
    EmptyName(usize),

    /// Two nodes share a name.
    #[error("duplicate node name: {0}")]
    DuplicateNode(String),

    /// A link or activation names a node that does not exist.
    #[error("unknown node: {0}")]
    UnknownNode(String),

    /// A port reference is not `node` or `node:index`.
    #[error("invalid port reference: '{0}'")]
    InvalidPortRef(String),

    /// A port index is beyond the node's ports.
    #[error("node '{node}' has no {direction} port {index} (it has {count})")]
    PortOutOfRange {
        /// Node name.
        node: String,
        /// `"input"` or `"output"`.
        direction: &'static str,
        /// Requested index.
        index: u32,
        /// Ports the node has in that direction.
        count: u32,
    },

    /// A port appears in more than one link.
    #[error("port '{0}' is linked more than once")]
    PortAlreadyLinked(String),

    /// A link connects a node to itself.
    #[error("link '{from}' -> '{to}' connects a node to itself")]
    SelfLink {
        /// Producing port reference.
        from: String,
        /// Consuming port reference.
        to: String,
    },

    /// A link would close a cycle.
    #[error("link '{from}' -> '{to}' creates a cycle")]
    Cycle {
        /// Producing port reference.
        from: String,
        /// Consuming port reference.
        to: String,
    },

    /// A node setting is inconsistent with its kind or ports.
    #[error("invalid setting for node '{node}': {reason}")]
    InvalidNode {
        /// Node name.
        node: String,
        /// Description of the problem.
        reason: String,
    },

    /// An activation cannot be performed on its target.
    #[error("cannot {mode} node '{node}': {reason}")]
    InvalidActivation {
        /// Entry point.
        mode: ActivationMode,
        /// Driver node name.
        node: String,
        /// Description of the problem.
        reason: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a graph description.
///
/// Every problem found is reported; more than one is wrapped in
/// [`ValidationError::Multiple`].
pub fn validate_graph(config: &GraphConfig) -> ValidationResult<()> {
    let mut errors = Vec::new();

    let mut names: HashMap<&str, usize> = HashMap::new();
    for (i, node) in config.nodes.iter().enumerate() {
        if node.name.trim().is_empty() {
            errors.push(ValidationError::EmptyName(i));
        } else if names.contains_key(node.name.as_str()) {
            errors.push(ValidationError::DuplicateNode(node.name.clone()));
        } else {
            names.insert(node.name.as_str(), i);
        }
        validate_node_settings(config, i, &mut errors);
    }

    validate_links(config, &names, &mut errors);

    for activation in &config.activations {
        let Some(&i) = names.get(activation.node.as_str()) else {
            errors.push(ValidationError::UnknownNode(activation.node.clone()));
            continue;
        };
        let node = &config.nodes[i];
        let reason = match (activation.mode, node.kind) {
            (ActivationMode::Pull, NodeKind::Source) => Some("a source has no inputs to pull"),
            (ActivationMode::Push, NodeKind::Sink) => Some("a sink has no outputs to push"),
            // Downstream demand asks an async driver to produce again, and
            // the built-in nodes always answer, so the activation never ends.
            (ActivationMode::Push, _) if node.is_async => {
                Some("an async node is asked to produce again and never settles")
            }
            _ if activation.repeat == 0 => Some("repeat must be at least 1"),
            _ => None,
        };
        if let Some(reason) = reason {
            errors.push(ValidationError::InvalidActivation {
                mode: activation.mode,
                node: activation.node.clone(),
                reason: reason.to_string(),
            });
        }
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

fn validate_node_settings(config: &GraphConfig, index: usize, errors: &mut Vec<ValidationError>) {
    let node = &config.nodes[index];
    let invalid = |reason: String| ValidationError::InvalidNode {
        node: node.name.clone(),
        reason,
    };

    if node.inputs.is_some() && node.kind != NodeKind::Mixer {
        errors.push(invalid(format!("'inputs' is only valid for mixers, not a {}", node.kind)));
    }
    if node.kind == NodeKind::Mixer && node.input_count() == 0 {
        errors.push(invalid("a mixer needs at least one input".to_string()));
    }
    if let Some(buffers) = node.buffers {
        if node.kind == NodeKind::Sink {
            errors.push(invalid("'buffers' is not valid for sinks".to_string()));
        } else if buffers == 0 || buffers > MAX_POOL_BUFFERS {
            errors.push(invalid(format!(
                "'buffers' must be between 1 and {MAX_POOL_BUFFERS}, got {buffers}"
            )));
        }
    }
    for &optional in &node.optional_inputs {
        if optional >= node.input_count() {
            errors.push(invalid(format!(
                "optional input {optional} does not exist (node has {} inputs)",
                node.input_count()
            )));
        }
    }
    let inputs = node.input_count();
    if inputs > 0 && node.required_in.is_none() && (0..inputs).all(|i| node.is_optional_input(i)) {
        errors.push(invalid(
            "every input is optional, so 'required_in' must be set".to_string(),
        ));
    }
    if let Some(required) = node.required_in {
        if inputs == 0 {
            errors.push(invalid("'required_in' set on a node without inputs".to_string()));
        } else if required == 0 || required > inputs {
            errors.push(invalid(format!(
                "'required_in' must be between 1 and {inputs}, got {required}"
            )));
        }
    }
}

fn validate_links(
    config: &GraphConfig,
    names: &HashMap<&str, usize>,
    errors: &mut Vec<ValidationError>,
) {
    // Skeleton graph: one idle node per description node, ports added as
    // links are accepted.
    let mut skeleton = Graph::new();
    let ids: Vec<NodeId> = config
        .nodes
        .iter()
        .map(|_| {
            skeleton.add_node(Box::new(FnProcessor::new(
                |_io| Ok(ProcessStatus::NeedMoreInput),
                |_io| Ok(ProcessStatus::NeedMoreInput),
            )))
        })
        .collect();

    let mut used_outputs: HashSet<(usize, u32)> = HashSet::new();
    let mut used_inputs: HashSet<(usize, u32)> = HashSet::new();

    for link in &config.links {
        let Some(from) = resolve(&link.from, Direction::Output, config, names, errors) else {
            continue;
        };
        let Some(to) = resolve(&link.to, Direction::Input, config, names, errors) else {
            continue;
        };

        if !used_outputs.insert(from) {
            errors.push(ValidationError::PortAlreadyLinked(link.from.clone()));
            continue;
        }
        if !used_inputs.insert(to) {
            errors.push(ValidationError::PortAlreadyLinked(link.to.clone()));
            continue;
        }
        if from.0 == to.0 {
            errors.push(ValidationError::SelfLink {
                from: link.from.clone(),
                to: link.to.clone(),
            });
            continue;
        }

        let (from_id, to_id) = (ids[from.0], ids[to.0]);
        if !config.allow_cycles && skeleton.can_reach(to_id, from_id) {
            errors.push(ValidationError::Cycle {
                from: link.from.clone(),
                to: link.to.clone(),
            });
            continue;
        }
        let linked = skeleton
            .add_port(from_id, Direction::Output, PortFlags::NONE)
            .and_then(|out| {
                let inp = skeleton.add_port(to_id, Direction::Input, PortFlags::NONE)?;
                skeleton.link(out, inp)
            });
        debug_assert!(linked.is_ok(), "skeleton link failed: {linked:?}");
    }
}

/// Resolves a port reference to `(node index, port index)`, recording any
/// problem in `errors`.
fn resolve(
    reference: &str,
    direction: Direction,
    config: &GraphConfig,
    names: &HashMap<&str, usize>,
    errors: &mut Vec<ValidationError>,
) -> Option<(usize, u32)> {
    let Some(port) = PortRef::parse(reference) else {
        errors.push(ValidationError::InvalidPortRef(reference.to_string()));
        return None;
    };
    let Some(&i) = names.get(port.node) else {
        errors.push(ValidationError::UnknownNode(port.node.to_string()));
        return None;
    };
    let node = &config.nodes[i];
    let (count, label) = match direction {
        Direction::Input => (node.input_count(), "input"),
        Direction::Output => (node.output_count(), "output"),
    };
    if port.index >= count {
        errors.push(ValidationError::PortOutOfRange {
            node: node.name.clone(),
            direction: label,
            index: port.index,
            count,
        });
        return None;
    }
    Some((i, port.index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph_config::ActivationConfig;
    use crate::node_config::NodeConfig;

    fn fan_in() -> GraphConfig {
        GraphConfig::new("fan-in")
            .with_node(NodeConfig::new("a", NodeKind::Source))
            .with_node(NodeConfig::new("b", NodeKind::Source))
            .with_node(NodeConfig::new("mix", NodeKind::Mixer))
            .with_node(NodeConfig::new("out", NodeKind::Sink))
            .with_link("a", "mix:0")
            .with_link("b", "mix:1")
            .with_link("mix", "out")
            .with_activation(ActivationConfig::pull("out"))
    }

    #[test]
    fn valid_graph_passes() {
        assert_eq!(validate_graph(&fan_in()), Ok(()));
    }

    #[test]
    fn duplicate_names() {
        let config = fan_in().with_node(NodeConfig::new("mix", NodeKind::Sink));
        assert_eq!(
            validate_graph(&config),
            Err(ValidationError::DuplicateNode("mix".to_string()))
        );
    }

    #[test]
    fn empty_name() {
        let config = GraphConfig::new("x").with_node(NodeConfig::new(" ", NodeKind::Sink));
        assert_eq!(validate_graph(&config), Err(ValidationError::EmptyName(0)));
    }

    #[test]
    fn port_out_of_range() {
        let config = fan_in().with_link("a", "mix:2");
        assert!(matches!(
            validate_graph(&config),
            Err(ValidationError::PortOutOfRange { index: 2, count: 2, direction: "input", .. })
        ));
    }

    #[test]
    fn invalid_port_reference() {
        let config = fan_in().with_link("a:x", "out");
        assert_eq!(
            validate_graph(&config),
            Err(ValidationError::InvalidPortRef("a:x".to_string()))
        );
    }

    #[test]
    fn double_link_rejected() {
        let config = fan_in()
            .with_node(NodeConfig::new("out2", NodeKind::Sink))
            .with_link("mix", "out2");
        assert_eq!(
            validate_graph(&config),
            Err(ValidationError::PortAlreadyLinked("mix".to_string()))
        );
    }

    #[test]
    fn self_link_rejected() {
        let config = GraphConfig::new("loop")
            .with_node(NodeConfig::new("mix", NodeKind::Mixer))
            .with_link("mix", "mix:0");
        assert!(matches!(
            validate_graph(&config),
            Err(ValidationError::SelfLink { .. })
        ));
    }

    #[test]
    fn cycle_rejected_unless_allowed() {
        let mut config = GraphConfig::new("ring")
            .with_node(NodeConfig::new("m1", NodeKind::Mixer))
            .with_node(NodeConfig::new("m2", NodeKind::Mixer))
            .with_link("m1", "m2:0")
            .with_link("m2", "m1:0");
        assert_eq!(
            validate_graph(&config),
            Err(ValidationError::Cycle {
                from: "m2".to_string(),
                to: "m1:0".to_string(),
            })
        );

        config.allow_cycles = true;
        assert_eq!(validate_graph(&config), Ok(()));
    }

    #[test]
    fn node_settings_checked() {
        let config = GraphConfig::new("x")
            .with_node(NodeConfig::new("src", NodeKind::Source).with_inputs(2))
            .with_node(NodeConfig::new("mix", NodeKind::Mixer).with_required_in(3))
            .with_node(NodeConfig::new("pool", NodeKind::Source).with_buffers(0))
            .with_node(NodeConfig::new("opt", NodeKind::Mixer).with_optional_input(4));
        let Err(ValidationError::Multiple(errors)) = validate_graph(&config) else {
            panic!("expected multiple errors");
        };
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().all(|e| matches!(e, ValidationError::InvalidNode { .. })));
    }

    #[test]
    fn activation_targets_checked() {
        let config = fan_in()
            .with_activation(ActivationConfig::pull("a"))
            .with_activation(ActivationConfig::push("out"))
            .with_activation(ActivationConfig::pull("ghost"))
            .with_activation(ActivationConfig::push("a").times(0));
        let Err(ValidationError::Multiple(errors)) = validate_graph(&config) else {
            panic!("expected multiple errors");
        };
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::UnknownNode("ghost".to_string())));
        assert_eq!(
            errors[0].to_string(),
            "cannot pull node 'a': a source has no inputs to pull"
        );
    }

    #[test]
    fn push_on_async_node_rejected() {
        let mut config = GraphConfig::new("capture")
            .with_node(NodeConfig::new("cap", NodeKind::Source).with_async(true))
            .with_node(NodeConfig::new("out", NodeKind::Sink))
            .with_link("cap", "out")
            .with_activation(ActivationConfig::push("cap"));
        assert_eq!(
            validate_graph(&config),
            Err(ValidationError::InvalidActivation {
                mode: ActivationMode::Push,
                node: "cap".to_string(),
                reason: "an async node is asked to produce again and never settles".to_string(),
            })
        );

        // Pulling through an async source is fine.
        config.activations = vec![ActivationConfig::pull("out")];
        assert_eq!(validate_graph(&config), Ok(()));
    }
}
