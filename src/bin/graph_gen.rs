//! Synthetic graph generator.
//!
//! Writes `N<nodes>_D<density>_S<seed>.e` and `.v` into the output directory.

use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use graphbench::generator::{self, GeneratorConfig};
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    if let Err(err) = try_main() {
        eprintln!("graph-gen failed: {err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    ensure!(
        (0.0..=100.0).contains(&args.density),
        "density must be a percentage in [0, 100], got {}",
        args.density
    );

    let config = GeneratorConfig {
        nodes: args.nodes,
        density: args.density,
        seed: args.seed,
        undirected: args.undirected,
    };
    let edges = generator::generate(&config);
    println!("Num of edges = {}", edges.len());

    let base = generator::write(&config, &edges, &args.out)
        .with_context(|| format!("writing graph into {}", args.out.display()))?;
    println!("{}", base.display());
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "graph-gen", version, about = "Generate a seeded random graph")]
struct Args {
    /// Number of vertices
    nodes: u32,

    /// Probability of each edge, in percent
    density: f64,

    /// PRNG seed
    seed: u64,

    /// Only draw pairs i < j (load the result with --undirected)
    #[arg(short = 'U', long)]
    undirected: bool,

    /// Output directory
    #[arg(long, default_value = ".")]
    out: PathBuf,
}
