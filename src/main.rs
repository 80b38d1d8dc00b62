use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use routesim::model::topology::check_capacity;
use routesim::runtime::config::{load_sim_config, OutputFormat, SimConfig};
use routesim::runtime::shell::Shell;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "routesim")]
#[command(about = "Link-state and distance-vector routing table simulator")]
struct Args {
    #[arg(long)]
    config: Option<PathBuf>,
    /// Read commands from a file instead of stdin.
    #[arg(long)]
    script: Option<PathBuf>,
    #[arg(long)]
    max_nodes: Option<u32>,
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
    #[arg(long, default_value = "WARN")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    let mut cfg = match &args.config {
        Some(path) => load_sim_config(path)?,
        None => SimConfig::default(),
    };
    if let Some(max_nodes) = args.max_nodes {
        check_capacity(max_nodes).context("invalid --max-nodes")?;
        cfg.max_nodes = max_nodes;
    }
    if let Some(format) = args.format {
        cfg.output.format = format;
    }

    let topology = cfg.build_topology()?;
    let stdout = io::stdout();
    let mut shell = Shell::new(topology, cfg.output.clone(), stdout.lock());

    match &args.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open script {}", path.display()))?;
            shell.run(BufReader::new(file))
        }
        None => shell.run(io::stdin().lock()),
    }
}

fn init_logging(level: &str) -> Result<()> {
    let level = level.parse::<Level>()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .compact()
        .init();
    Ok(())
}
