//! Shared CLI helpers used across multiple commands.

use ripple_config::{GraphConfig, get_factory_graph};
use std::path::Path;

/// Load a graph description by factory name or file path.
///
/// Factory graphs win over files of the same name.
pub fn load_graph(name: &str) -> anyhow::Result<GraphConfig> {
    if let Some(config) = get_factory_graph(name) {
        return Ok(config);
    }

    let path = Path::new(name);
    if path.exists() {
        return GraphConfig::load(path).map_err(|e| anyhow::anyhow!("{}", e));
    }

    anyhow::bail!(
        "Graph '{}' not found. Use 'ripple graphs' to see the factory graphs.",
        name
    )
}
