//! Command-line interface for the shuttle pickup planner.
//!
//! `shuttle solve <request.json>` reads a JSON `SolveRequest`, plans it with
//! the branch-and-bound solver, and prints the `SolveReport` as JSON on
//! stdout. Search settings layer from defaults, a configuration file,
//! `SHUTTLE_*` environment variables, and flags.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod error;
mod fs;
mod solve;

pub use error::CliError;
use solve::{SolveArgs, run_solve};
#[cfg(test)]
use solve::{
    SolveConfig, SolveSolverBuilder, config_from_layers_for_test, load_solve_request,
    run_solve_with,
};

const ARG_SOLVE_REQUEST: &str = "request-path";
const ARG_SOLVE_TIME_LIMIT: &str = "time-limit-secs";
const ARG_SOLVE_WORKERS: &str = "workers";
const ARG_SOLVE_TRIP_PENALTY: &str = "trip-penalty";
const ARG_SOLVE_SEED: &str = "seed";
const ENV_SOLVE_REQUEST: &str = "SHUTTLE_CMDS_SOLVE_REQUEST_PATH";

/// Log filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "warn";

/// Run the shuttle CLI with the current process arguments and environment.
///
/// # Errors
/// Returns a [`CliError`] describing the first failure.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    init_logging();
    match cli.command {
        Command::Solve(args) => run_solve(args),
    }
}

/// Install a stderr subscriber; `log` records from the library crates are
/// bridged into it.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        log::debug!("logging already initialised: {err}");
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "shuttle",
    about = "Plan shuttle pickups that minimise guest waiting",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan trips for a JSON solve request.
    Solve(SolveArgs),
}

#[cfg(test)]
mod tests;
