//! Graph execution command.

use super::common::load_graph;
use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use ripple_config::BuiltGraph;

#[derive(Args)]
pub struct RunArgs {
    /// Factory graph name or path to a graph description (TOML)
    #[arg(value_name = "GRAPH")]
    graph: String,

    /// Run the whole activation script this many times
    #[arg(short, long, default_value = "1")]
    repeat: u32,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = load_graph(&args.graph)?;
    let mut built = config.build()?;

    let per_script = built.total_activations();
    if per_script == 0 {
        anyhow::bail!("Graph '{}' has no activations to run", built.name());
    }
    let total = per_script * u64::from(args.repeat);

    println!("Running graph: {}", built.name());
    if let Some(desc) = &config.description {
        println!("  {}", desc);
    }
    for activation in built.activations() {
        println!(
            "  {} {} x{}",
            activation.mode, activation.name, activation.repeat
        );
    }
    tracing::info!(graph = built.name(), activations = total, "starting run");

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(total)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    for round in 0..u64::from(args.repeat) {
        let base = round * per_script;
        built
            .run_script(|done| pb.set_position(base + done))
            .with_context(|| format!("activation {} failed", pb.position() + 1))?;
    }
    pb.finish_and_clear();

    println!();
    println!("Completed {} activation(s)", total);
    print_summary(&built);

    Ok(())
}

fn print_summary(built: &BuiltGraph) {
    let graph = built.graph();

    println!();
    println!("Sinks:");
    for (name, probe) in built.sinks() {
        match probe.last_buffer() {
            Some(buffer) => println!(
                "  {:16} received {:6} (last buffer {})",
                name,
                probe.received(),
                buffer.0
            ),
            None => println!("  {:16} received {:6}", name, probe.received()),
        }
    }

    println!();
    println!("Callbacks:");
    println!("  {:16} {:8} {:>8} {:>8}", "node", "kind", "input", "output");
    for (name, id) in built.nodes() {
        println!(
            "  {:16} {:8} {:>8} {:>8}",
            name,
            graph.node_name(id).unwrap_or("?"),
            graph.input_calls(id).unwrap_or(0),
            graph.output_calls(id).unwrap_or(0)
        );
    }

    let stats = graph.last_activation();
    println!();
    println!(
        "Last activation: {} dispatches, {} input calls, {} output calls",
        stats.dispatches, stats.input_calls, stats.output_calls
    );
}
