//! Ripple CLI - Command-line interface for the ripple graph scheduler.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ripple")]
#[command(author, version, about = "Ripple graph scheduler CLI", long_about = None)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a graph and run its activation script
    Run(commands::run::RunArgs),

    /// Check graph description files without running them
    Validate(commands::validate::ValidateArgs),

    /// Show the nodes, ports and links of a graph
    Inspect(commands::inspect::InspectArgs),

    /// List factory graphs or print one as TOML
    Graphs(commands::graphs::GraphsArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Validate(args) => commands::validate::run(args),
        Commands::Inspect(args) => commands::inspect::run(args),
        Commands::Graphs(args) => commands::graphs::run(args),
    }
}
