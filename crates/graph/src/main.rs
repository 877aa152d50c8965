//! ferrite-graph - Entity dependency graph renderer
//!
//! Prints the entity catalog's dependency graph in DOT format, for piping
//! into graphviz:
//!
//! ```text
//! ferrite-graph | dot -Tsvg -o dependencies.svg
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use ferrite_schema::{dependency_edges, render_dot, Registry};

/// Render the entity dependency graph as DOT
#[derive(Parser)]
#[command(name = "ferrite-graph")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Write the graph to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let registry = Registry::builtin();
    let dot = render_dot(registry);
    info!(
        entities = registry.len(),
        edges = dependency_edges(registry).len(),
        "rendered dependency graph"
    );

    match cli.output {
        Some(path) => std::fs::write(&path, dot)?,
        None => print!("{dot}"),
    }
    Ok(())
}
