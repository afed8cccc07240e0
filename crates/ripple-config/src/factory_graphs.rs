//! Factory graphs bundled with the ripple library.
//!
//! Built-in graph descriptions that are always available without external
//! files. They cover the basic scheduling shapes and serve as starting points
//! for custom descriptions.

use crate::GraphConfig;

/// Array of factory graph names for external access.
pub static FACTORY_GRAPH_NAMES: &[&str] = &[
    "linear",
    "fan_in",
    "fan_in3",
    "push_chain",
    "optional_aux",
];

/// TOML content for factory graphs.
///
/// These are embedded at compile time and always available.
static FACTORY_GRAPHS_TOML: &[(&str, &str)] = &[
    ("linear", LINEAR_GRAPH),
    ("fan_in", FAN_IN_GRAPH),
    ("fan_in3", FAN_IN3_GRAPH),
    ("push_chain", PUSH_CHAIN_GRAPH),
    ("optional_aux", OPTIONAL_AUX_GRAPH),
];

/// Linear graph - one source pulled by one sink.
const LINEAR_GRAPH: &str = r#"
name = "linear"
description = "One source feeding one sink, driven by sink pulls"

[[nodes]]
name = "src"
kind = "source"
buffers = 2

[[nodes]]
name = "out"
kind = "sink"

[[links]]
from = "src"
to = "out"

[[activations]]
mode = "pull"
node = "out"
repeat = 16
"#;

/// Fan-in graph - two sources mixed into one sink.
const FAN_IN_GRAPH: &str = r#"
name = "fan_in"
description = "Two sources into a two-input mixer, driven by sink pulls"

[[nodes]]
name = "left"
kind = "source"

[[nodes]]
name = "right"
kind = "source"

[[nodes]]
name = "mix"
kind = "mixer"
inputs = 2

[[nodes]]
name = "out"
kind = "sink"

[[links]]
from = "left"
to = "mix:0"

[[links]]
from = "right"
to = "mix:1"

[[links]]
from = "mix"
to = "out"

[[activations]]
mode = "pull"
node = "out"
repeat = 16
"#;

/// Three-way fan-in graph.
const FAN_IN3_GRAPH: &str = r#"
name = "fan_in3"
description = "Three sources into a three-input mixer, driven by sink pulls"

[[nodes]]
name = "a"
kind = "source"

[[nodes]]
name = "b"
kind = "source"

[[nodes]]
name = "c"
kind = "source"

[[nodes]]
name = "mix"
kind = "mixer"
inputs = 3

[[nodes]]
name = "out"
kind = "sink"

[[links]]
from = "a"
to = "mix:0"

[[links]]
from = "b"
to = "mix:1"

[[links]]
from = "c"
to = "mix:2"

[[links]]
from = "mix"
to = "out"

[[activations]]
mode = "pull"
node = "out"
repeat = 16
"#;

/// Push chain - a capture source pushing through a mixer.
const PUSH_CHAIN_GRAPH: &str = r#"
name = "push_chain"
description = "A source pushing unsolicited data through a mixer into a sink"

[[nodes]]
name = "capture"
kind = "source"
buffers = 2

[[nodes]]
name = "mix"
kind = "mixer"
inputs = 1

[[nodes]]
name = "out"
kind = "sink"

[[links]]
from = "capture"
to = "mix"

[[links]]
from = "mix"
to = "out"

[[activations]]
mode = "push"
node = "capture"
repeat = 16
"#;

/// Optional auxiliary input - the mixer runs on its main input alone.
const OPTIONAL_AUX_GRAPH: &str = r#"
name = "optional_aux"
description = "A main and an optional auxiliary source into a mixer"

[[nodes]]
name = "main"
kind = "source"

[[nodes]]
name = "aux"
kind = "source"

[[nodes]]
name = "mix"
kind = "mixer"
inputs = 2
optional_inputs = [1]

[[nodes]]
name = "out"
kind = "sink"

[[links]]
from = "main"
to = "mix:0"

[[links]]
from = "aux"
to = "mix:1"

[[links]]
from = "mix"
to = "out"

[[activations]]
mode = "pull"
node = "out"
repeat = 16
"#;

/// Get all factory graphs.
///
/// # Example
///
/// ```rust
/// use ripple_config::factory_graphs;
///
/// for graph in factory_graphs() {
///     println!("{}: {}", graph.name, graph.description.as_deref().unwrap_or(""));
/// }
/// ```
pub fn factory_graphs() -> Vec<GraphConfig> {
    FACTORY_GRAPHS_TOML
        .iter()
        .filter_map(|(_, toml)| GraphConfig::from_toml(toml).ok())
        .collect()
}

/// Get a factory graph by name.
///
/// The name match is case-insensitive and treats `-` like `_`.
///
/// ```rust
/// use ripple_config::get_factory_graph;
///
/// assert!(get_factory_graph("fan-in").is_some());
/// assert!(get_factory_graph("diamond").is_none());
/// ```
pub fn get_factory_graph(name: &str) -> Option<GraphConfig> {
    let wanted = normalize(name);
    FACTORY_GRAPHS_TOML
        .iter()
        .find(|(graph_name, _)| normalize(graph_name) == wanted)
        .and_then(|(_, toml)| GraphConfig::from_toml(toml).ok())
}

/// Get all factory graph names.
pub fn factory_graph_names() -> &'static [&'static str] {
    FACTORY_GRAPH_NAMES
}

/// Returns `true` if `name` names a factory graph.
pub fn is_factory_graph(name: &str) -> bool {
    let wanted = normalize(name);
    FACTORY_GRAPH_NAMES.iter().any(|n| normalize(n) == wanted)
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase().replace('-', "_")
}
