// Command-line entry point. The library in lib.rs carries all solve logic.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use field_solver::{DEFAULT_SUFFIX, FieldSolver, SolveRequest, SolverConfig};

/// Plate-solve a batch of images with solve-field, one process per core.
#[derive(Debug, Parser)]
#[command(name = "field-solver", version, about)]
struct Cli {
    /// Images to solve, relative to the working directory
    #[arg(required = true)]
    images: Vec<String>,

    /// Right ascension of the field centre, e.g. 13:55:45.12
    #[arg(long, allow_hyphen_values = true)]
    ra: Option<String>,

    /// Declination of the field centre, e.g. +36:49:27.13
    #[arg(long, allow_hyphen_values = true)]
    dec: Option<String>,

    /// Search radius around ra/dec in degrees
    #[arg(long)]
    radius: Option<f64>,

    /// Pixel scale bounds in arcsec/pixel as LOW,HIGH
    #[arg(long, value_delimiter = ',')]
    scale: Option<Vec<f64>>,

    /// Suffix added to solved image names
    #[arg(long, default_value = DEFAULT_SUFFIX)]
    suffix: String,

    /// Keep the .wcs files written by the solver
    #[arg(long)]
    wcs_output: bool,

    /// JSON configuration file
    #[arg(long, env = "FIELD_SOLVER_CONFIG")]
    config: Option<PathBuf>,

    /// Per-job timeout in seconds, overrides the config file
    #[arg(long)]
    timeout: Option<u64>,

    /// Print the full report as JSON instead of one name per line
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)         // Remove file path
        .with_line_number(false)  // Remove line numbers
        .with_thread_ids(false)   // Remove thread IDs
        .with_thread_names(false) // Remove thread names
        .with_target(false)       // Remove module path
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn build_request(cli: &Cli) -> field_solver::SolverResult<SolveRequest> {
    let mut builder = SolveRequest::batch(cli.images.clone())
        .suffix(cli.suffix.clone())
        .wcs_output(cli.wcs_output);
    if let Some(ra) = &cli.ra {
        builder = builder.ra(ra.clone());
    }
    if let Some(dec) = &cli.dec {
        builder = builder.dec(dec.clone());
    }
    if let Some(radius) = cli.radius {
        builder = builder.radius(radius);
    }
    if let Some(scale) = &cli.scale {
        builder = builder.scale_values(scale.clone());
    }
    builder.build()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => SolverConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SolverConfig::default(),
    };
    if let Some(secs) = cli.timeout {
        config.job_timeout_secs = Some(secs);
    }
    debug!("Using config: {:?}", config);

    let request = build_request(&cli)?;
    let solver = FieldSolver::new(config)?;
    let report = solver.solve(&request).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for output in &report.outputs {
            println!("{}", output);
        }
    }

    if report.failed.is_empty() {
        info!("Solved all {} images", request.images().len());
    } else {
        warn!(
            "{} of {} images were not solved",
            report.failed.len(),
            request.images().len()
        );
    }
    Ok(())
}
