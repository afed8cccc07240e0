//! Factory graph listing and export command.

use clap::Args;
use ripple_config::{factory_graphs, get_factory_graph};
use std::path::PathBuf;

#[derive(Args)]
pub struct GraphsArgs {
    /// Factory graph to print as TOML (lists all graphs when omitted)
    name: Option<String>,

    /// Write the factory graph to this file instead of printing it
    #[arg(short, long, requires = "name")]
    export: Option<PathBuf>,
}

pub fn run(args: GraphsArgs) -> anyhow::Result<()> {
    let Some(name) = args.name else {
        list_graphs();
        return Ok(());
    };

    let Some(config) = get_factory_graph(&name) else {
        anyhow::bail!(
            "Factory graph '{}' not found. Use 'ripple graphs' to list them.",
            name
        );
    };

    match args.export {
        Some(path) => {
            config.save(&path)?;
            println!("Saved '{}' to {}", config.name, path.display());
        }
        None => print!("{}", config.to_toml()?),
    }
    Ok(())
}

fn list_graphs() {
    println!("Factory Graphs:");
    println!("===============");
    for config in factory_graphs() {
        let desc = config.description.as_deref().unwrap_or("");
        println!("  {:14} - {}", config.name, desc);
    }
    println!();
    println!("Run one with: ripple run <name>");
}
