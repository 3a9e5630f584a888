// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Diagrammr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Diagrammr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Diagrammr CLI entrypoint.
//!
//! Runs the conversion layer over JSON files and prints JSON to stdout. Logs go to stderr and
//! follow `RUST_LOG` (default `warn`).

use std::error::Error;

use diagrammr::convert::{
    ai_to_graph, compute_bounds, graph_to_persistence, grid_layout, validate_graph,
};
use diagrammr::model::{
    parse_ai_response, structured_output_schema, DiagramId, GraphEdge, GraphNode,
};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} convert <ai-response.json> [--grid]\n  {program} persist <graph.json> --diagram-id <id>\n  {program} validate <graph.json>\n  {program} schema\n\nconvert   validates an AI diagram response and prints the editable graph.\n          --grid re-places nodes on a regular grid.\npersist   prints the backend rows for a graph ({{\"nodes\": [...], \"edges\": [...]}}).\nvalidate  prints structural issues of a graph; exits 1 if there are any.\nschema    prints the structured-output JSON schema for the model provider."
    );
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Convert { input: String, grid: bool },
    Persist { input: String, diagram_id: String },
    Validate { input: String },
    Schema,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<Command, ()> {
    let command = args.next().ok_or(())?;
    let mut input = None;
    let mut grid = false;
    let mut diagram_id = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--grid" if command == "convert" => {
                if grid {
                    return Err(());
                }
                grid = true;
            }
            "--diagram-id" if command == "persist" => {
                if diagram_id.is_some() {
                    return Err(());
                }
                diagram_id = Some(args.next().ok_or(())?);
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if input.is_some() {
                    return Err(());
                }
                input = Some(arg);
            }
        }
    }

    match command.as_str() {
        "convert" => Ok(Command::Convert {
            input: input.ok_or(())?,
            grid,
        }),
        "persist" => Ok(Command::Persist {
            input: input.ok_or(())?,
            diagram_id: diagram_id.ok_or(())?,
        }),
        "validate" => Ok(Command::Validate {
            input: input.ok_or(())?,
        }),
        "schema" if input.is_none() => Ok(Command::Schema),
        _ => Err(()),
    }
}

/// Graph file shape shared with the canvas.
#[derive(Debug, Deserialize)]
struct GraphDocument {
    nodes: Vec<GraphNode>,
    #[serde(default)]
    edges: Vec<GraphEdge>,
}

fn read_graph(path: &str) -> Result<GraphDocument, Box<dyn Error>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn print_json(value: &impl Serialize) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Command) -> Result<bool, Box<dyn Error>> {
    match command {
        Command::Convert { input, grid } => {
            let raw = std::fs::read_to_string(&input)?;
            let diagram = parse_ai_response(&raw)?;
            let mut conversion = ai_to_graph(&diagram);
            if grid {
                conversion.nodes = grid_layout(&conversion.nodes);
            }
            let dropped: Vec<String> =
                conversion.dropped.iter().map(ToString::to_string).collect();
            print_json(&serde_json::json!({
                "title": diagram.title,
                "nodes": conversion.nodes,
                "edges": conversion.edges,
                "bounds": compute_bounds(&conversion.nodes),
                "dropped": dropped,
            }))?;
            Ok(true)
        }
        Command::Persist { input, diagram_id } => {
            let diagram_id = DiagramId::new(diagram_id)?;
            let graph = read_graph(&input)?;
            let batch = graph_to_persistence(&graph.nodes, &graph.edges, &diagram_id);
            print_json(&batch)?;
            Ok(batch.dropped.is_empty())
        }
        Command::Validate { input } => {
            let graph = read_graph(&input)?;
            let report = validate_graph(&graph.nodes, &graph.edges);
            let errors: Vec<String> = report.errors.iter().map(ToString::to_string).collect();
            print_json(&serde_json::json!({
                "isValid": report.is_valid,
                "errors": errors,
            }))?;
            Ok(report.is_valid)
        }
        Command::Schema => {
            print_json(&structured_output_schema())?;
            Ok(true)
        }
    }
}

fn main() {
    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "diagrammr".to_owned());

    let command = match parse_options(args) {
        Ok(command) => command,
        Err(()) => {
            print_usage(&program);
            std::process::exit(2);
        }
    };

    init_tracing();
    match run(command) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("diagrammr: {err}");
            std::process::exit(1);
        }
    }
}
