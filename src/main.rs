//! kmeans-stream
//!
//! Reads length-prefixed vector batches on stdin and writes one frame of
//! K-Means centroids per batch on stdout. Diagnostics go to stderr only.
//!
//! Exit code 0 on clean end of input, 1 on any fault.

use std::process::ExitCode;

use clap::Parser;
use kmeans_stream::{ComputeDevice, DEFAULT_ITERATIONS, ServiceConfig, run_on_device};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

/// Streaming K-Means centroid service
#[derive(Parser)]
#[command(name = "kmeans-stream")]
#[command(version)]
#[command(about = "Cluster length-prefixed f32 batches from stdin into centroids on stdout")]
struct Cli {
    /// Length of every input vector
    dimensions: usize,

    /// Number of centroids per batch
    clusters: usize,

    /// Compute device: cpu, cuda[:N], wgpu[:N]
    #[arg(default_value = "cpu")]
    device: ComputeDevice,

    /// Lloyd iterations per batch
    #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
    iterations: usize,

    /// Reject frames declaring more rows than this
    #[arg(long)]
    max_batch: Option<usize>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // stdout carries centroid frames; logs must stay off it
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = ServiceConfig::new(cli.dimensions, cli.clusters)
        .with_iterations(cli.iterations)
        .with_device(cli.device);
    if let Some(limit) = cli.max_batch {
        config = config.with_max_batch_size(limit);
    }

    let stdin = std::io::stdin().lock();
    let stdout = std::io::stdout().lock();

    match run_on_device(&config, stdin, stdout) {
        Ok(stats) => {
            info!(batches = stats.batches, vectors = stats.vectors, "done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
