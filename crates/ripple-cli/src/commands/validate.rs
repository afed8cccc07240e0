//! Graph description validation command.

use super::common::load_graph;
use clap::Args;
use ripple_config::ValidationError;

#[derive(Args)]
pub struct ValidateArgs {
    /// Factory graph names or paths to graph descriptions (TOML)
    #[arg(value_name = "GRAPH", required = true)]
    graphs: Vec<String>,
}

pub fn run(args: ValidateArgs) -> anyhow::Result<()> {
    let mut failed = 0;

    for name in &args.graphs {
        let config = match load_graph(name) {
            Ok(config) => config,
            Err(e) => {
                println!("FAIL  {}: {}", name, e);
                failed += 1;
                continue;
            }
        };

        match config.validate() {
            Ok(()) => println!(
                "OK    {} ({} nodes, {} links, {} activations)",
                name,
                config.nodes.len(),
                config.links.len(),
                config.total_activations()
            ),
            Err(ValidationError::Multiple(errors)) => {
                println!("FAIL  {}: {} errors", name, errors.len());
                for error in errors {
                    println!("        - {}", error);
                }
                failed += 1;
            }
            Err(error) => {
                println!("FAIL  {}: {}", name, error);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} graph(s) failed validation", failed, args.graphs.len());
    }
    Ok(())
}
