//! Graph inspection command.
//!
//! Builds a graph and prints its structure: nodes with their ports and
//! scheduling settings, the links between them and the activation script.

use super::common::load_graph;
use clap::Args;
use ripple_config::BuiltGraph;
use ripple_core::{Graph, NodeFlags, PortFlags, PortId};
use serde::Serialize;

#[derive(Args)]
pub struct InspectArgs {
    /// Factory graph name or path to a graph description (TOML)
    #[arg(value_name = "GRAPH")]
    graph: String,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct GraphReport {
    name: String,
    description: Option<String>,
    nodes: Vec<NodeReport>,
    links: Vec<LinkReport>,
    activations: Vec<ActivationReport>,
}

#[derive(Serialize)]
struct NodeReport {
    name: String,
    id: u32,
    kind: String,
    required_in: u32,
    #[serde(rename = "async")]
    is_async: bool,
    inputs: Vec<PortReport>,
    outputs: Vec<PortReport>,
}

#[derive(Serialize)]
struct PortReport {
    id: u32,
    optional: bool,
    peer: Option<u32>,
}

#[derive(Serialize)]
struct LinkReport {
    from: String,
    to: String,
}

#[derive(Serialize)]
struct ActivationReport {
    mode: String,
    node: String,
    repeat: u32,
}

pub fn run(args: InspectArgs) -> anyhow::Result<()> {
    let config = load_graph(&args.graph)?;
    let built = config.build()?;

    let report = GraphReport {
        name: config.name.clone(),
        description: config.description.clone(),
        nodes: node_reports(&built),
        links: config
            .links
            .iter()
            .map(|l| LinkReport {
                from: l.from.clone(),
                to: l.to.clone(),
            })
            .collect(),
        activations: built
            .activations()
            .iter()
            .map(|a| ActivationReport {
                mode: a.mode.to_string(),
                node: a.name.clone(),
                repeat: a.repeat,
            })
            .collect(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn node_reports(built: &BuiltGraph) -> Vec<NodeReport> {
    let graph = built.graph();
    built
        .nodes()
        .map(|(name, id)| NodeReport {
            name: name.to_string(),
            id: id.index(),
            kind: graph.node_name(id).unwrap_or("?").to_string(),
            required_in: graph.required_in(id).unwrap_or(0),
            is_async: graph.flags(id).is_some_and(|f| f.contains(NodeFlags::ASYNC)),
            inputs: port_reports(graph, graph.input_ports(id).unwrap_or_default()),
            outputs: port_reports(graph, graph.output_ports(id).unwrap_or_default()),
        })
        .collect()
}

fn port_reports(graph: &Graph, ports: &[PortId]) -> Vec<PortReport> {
    ports
        .iter()
        .filter_map(|&port| {
            let info = graph.port(port)?;
            Some(PortReport {
                id: port.index(),
                optional: info.flags.contains(PortFlags::OPTIONAL),
                peer: info.peer.map(PortId::index),
            })
        })
        .collect()
}

fn print_report(report: &GraphReport) {
    println!("Graph: {}", report.name);
    println!("{}", "=".repeat(7 + report.name.len()));
    if let Some(desc) = &report.description {
        println!("{}", desc);
    }

    println!();
    println!("Nodes:");
    for node in &report.nodes {
        let mut notes = Vec::new();
        if node.is_async {
            notes.push("async".to_string());
        }
        let optional = node.inputs.iter().filter(|p| p.optional).count();
        if optional > 0 {
            notes.push(format!("{} optional", optional));
        }
        println!(
            "  [{}] {:16} {:8} in {} out {} required {}{}",
            node.id,
            node.name,
            node.kind,
            node.inputs.len(),
            node.outputs.len(),
            node.required_in,
            if notes.is_empty() {
                String::new()
            } else {
                format!(" ({})", notes.join(", "))
            }
        );
    }

    println!();
    println!("Links:");
    if report.links.is_empty() {
        println!("  (none)");
    }
    for link in &report.links {
        println!("  {} -> {}", link.from, link.to);
    }

    println!();
    println!("Activations:");
    if report.activations.is_empty() {
        println!("  (none)");
    }
    for activation in &report.activations {
        println!("  {} {} x{}", activation.mode, activation.node, activation.repeat);
    }
}
