use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod workflow;

#[derive(Parser, Debug)]
#[command(name = "crobe")]
#[command(version)]
#[command(about = "Runs a bench protocol of culture transfers and beta-lactamase incubations", long_about = None)]
struct Args {
    /// Protocol file describing the cultures and the steps to run
    #[arg(short, long, default_value = "data/protocols/bla_competition.yaml")]
    protocol: PathBuf,

    /// Directory of strain definition files
    #[arg(short, long, default_value = "data/strains")]
    strains: PathBuf,

    /// Parent directory for the timestamped run directory
    #[arg(short, long, default_value = "data/runs")]
    output: PathBuf,

    /// Overrides the seed given in the protocol file
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "crobe_core=warn,crobe=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    println!("--- Crobe Protocol Runner ---");

    let library = config::StrainLibrary::load(&args.strains)?;
    let mut protocol = config::load_protocol(&args.protocol)?;
    if let Some(seed) = args.seed {
        protocol.seed = seed;
    }

    let output_dir = args.output.join(format!(
        "{}_{}",
        protocol.name.replace(char::is_whitespace, "_"),
        chrono::Utc::now().format("%Y%m%d_%H%M%S")
    ));
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    // Copy the protocol file to the output directory for traceability
    fs::copy(&args.protocol, output_dir.join("protocol.yaml"))?;

    tracing::info!(seed = protocol.seed, strains = library.len(), "Starting protocol");
    workflow::run_protocol(&protocol, &library, &output_dir)?;

    println!("\nProtocol complete. Results are in {:?}", output_dir);
    Ok(())
}
