use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lineage_layout::{Graph, LayoutConfig, LayoutPass, related_upstream, validate};
use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "lineage-layout",
    about = "Lay out and check field-level lineage graphs."
)]
struct Cli {
    /// Log progress to stderr (overridden by RUST_LOG).
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute levels, positions and validation errors as JSON.
    Layout {
        /// Graph JSON file. Use '-' to read from stdin.
        input: String,

        /// Table to render expanded. Repeatable.
        #[arg(short = 'e', long = "expand")]
        expand: Vec<String>,

        /// Expand every table.
        #[arg(long = "expand-all", conflicts_with = "expand")]
        expand_all: bool,

        /// Layout configuration JSON file.
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,

        /// Output file (default: stdout).
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
    /// Check transformations against incoming edges. Exits 1 on discrepancies.
    Validate {
        /// Graph JSON file. Use '-' to read from stdin.
        input: String,
    },
    /// List the field and every node upstream of it.
    Upstream {
        /// Graph JSON file. Use '-' to read from stdin.
        input: String,

        field: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(command: Command) -> Result<ExitCode> {
    match command {
        Command::Layout {
            input,
            expand,
            expand_all,
            config,
            output,
        } => {
            let graph = read_graph(&input)?;
            let config = match config {
                Some(path) => {
                    let json = fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    LayoutConfig::from_json(&json)
                        .with_context(|| format!("Invalid layout config {}", path.display()))?
                }
                None => LayoutConfig::default(),
            };
            let expanded: BTreeSet<String> = if expand_all {
                graph.tables().map(|t| t.id.clone()).collect()
            } else {
                expand.into_iter().collect()
            };

            let pass = LayoutPass::compute(&graph, &expanded, &config);
            let json = serde_json::to_string_pretty(&pass)?;

            match output {
                Some(path) => fs::write(&path, json + "\n")
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{json}"),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Validate { input } => {
            let graph = read_graph(&input)?;
            let report = validate(&graph);
            println!("{}", serde_json::to_string_pretty(&report)?);

            if report.is_empty() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(1))
            }
        }
        Command::Upstream { input, field } => {
            let graph = read_graph(&input)?;
            if graph.node(&field).is_none() {
                tracing::warn!(field = %field, "field is not in the graph");
            }
            for id in related_upstream(&graph, &field) {
                println!("{id}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_graph(input: &str) -> Result<Graph> {
    let json = if input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read graph from stdin")?;
        buf
    } else {
        fs::read_to_string(input).with_context(|| format!("Failed to read {input}"))?
    };

    Graph::from_json(&json).with_context(|| format!("Failed to load graph from {input}"))
}
