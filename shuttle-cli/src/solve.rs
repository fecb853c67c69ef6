//! Solve command implementation for the shuttle CLI.

use std::io::{BufReader, Write};
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use shuttle_core::{
    DEFAULT_NUM_WORKERS, DEFAULT_TIME_LIMIT, Instance, PlannerConfig, SolveReport, SolveRequest,
    Solver,
};
use shuttle_solver_bnb::{BranchAndBoundConfig, BranchAndBoundSolver};

use crate::fs::{file_is_file, open_utf8_file};
use crate::{
    ARG_SOLVE_REQUEST, ARG_SOLVE_SEED, ARG_SOLVE_TIME_LIMIT, ARG_SOLVE_TRIP_PENALTY,
    ARG_SOLVE_WORKERS, CliError, ENV_SOLVE_REQUEST,
};

/// CLI arguments for the `solve` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Plan shuttle trips for a JSON-encoded SolveRequest. The \
                 report is printed as JSON on stdout; an infeasible request \
                 still produces a report with a reason.",
    about = "Plan shuttle trips for a request"
)]
#[ortho_config(prefix = "SHUTTLE")]
pub(crate) struct SolveArgs {
    /// Path to a JSON file containing a SolveRequest.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Wall-clock search budget in seconds (default 15).
    #[arg(long = ARG_SOLVE_TIME_LIMIT, value_name = "secs")]
    #[serde(default)]
    pub(crate) time_limit_secs: Option<u64>,
    /// Number of parallel search workers (default 8).
    #[arg(long = ARG_SOLVE_WORKERS, value_name = "count")]
    #[serde(default)]
    pub(crate) workers: Option<usize>,
    /// Objective weight per trip used (default 1).
    #[arg(long = ARG_SOLVE_TRIP_PENALTY, value_name = "minutes")]
    #[serde(default)]
    pub(crate) trip_penalty: Option<i64>,
    /// Seed for the diversified workers (default 0).
    #[arg(long = ARG_SOLVE_SEED, value_name = "seed")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
}

impl SolveArgs {
    pub(crate) fn into_config(self) -> Result<SolveConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SolveConfig::try_from(merged)
    }
}

/// Resolved `solve` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SolveConfig {
    /// Path to the JSON request file.
    pub(crate) request_path: Utf8PathBuf,
    /// Planner settings.
    pub(crate) planner: PlannerConfig,
    /// Engine settings.
    pub(crate) engine: BranchAndBoundConfig,
}

impl SolveConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        let path = &self.request_path;
        match file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field: ARG_SOLVE_REQUEST,
                path: path.clone(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field: ARG_SOLVE_REQUEST,
                    path: path.clone(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field: ARG_SOLVE_REQUEST,
                path: path.clone(),
                source,
            }),
        }
    }
}

impl TryFrom<SolveArgs> for SolveConfig {
    type Error = CliError;

    fn try_from(args: SolveArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_SOLVE_REQUEST,
            env: ENV_SOLVE_REQUEST,
        })?;

        let defaults = PlannerConfig::default();
        let planner = defaults
            .with_time_limit(
                args.time_limit_secs
                    .map_or(DEFAULT_TIME_LIMIT, Duration::from_secs),
            )
            .with_num_workers(args.workers.unwrap_or(DEFAULT_NUM_WORKERS))
            .with_trip_penalty(args.trip_penalty.unwrap_or(defaults.trip_penalty));
        planner
            .validate()
            .map_err(|source| CliError::InvalidSettings { source })?;

        let engine = BranchAndBoundConfig::default().with_seed(args.seed.unwrap_or_default());

        Ok(Self {
            request_path,
            planner,
            engine,
        })
    }
}

/// Builds a solver instance for the current solve invocation.
pub(super) trait SolveSolverBuilder {
    fn build(&self, config: &SolveConfig) -> Result<Box<dyn Solver>, CliError>;
}

pub(super) struct DefaultSolveSolverBuilder;

impl SolveSolverBuilder for DefaultSolveSolverBuilder {
    fn build(&self, config: &SolveConfig) -> Result<Box<dyn Solver>, CliError> {
        Ok(Box::new(BranchAndBoundSolver::with_config(
            config.planner,
            config.engine,
        )))
    }
}

pub(super) fn run_solve(args: SolveArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    let builder = DefaultSolveSolverBuilder;
    run_solve_with(args, &builder, &mut stdout)
}

pub(super) fn run_solve_with(
    args: SolveArgs,
    builder: &dyn SolveSolverBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let report = execute_solve(args, builder)?;
    write_solve_report(writer, &report)
}

fn execute_solve(
    args: SolveArgs,
    builder: &dyn SolveSolverBuilder,
) -> Result<SolveReport, CliError> {
    let config = resolve_solve_config(args)?;
    let request = load_solve_request(&config.request_path)?;
    Instance::from_request(&request).map_err(|source| CliError::InvalidSolveRequest {
        path: config.request_path.clone(),
        source,
    })?;
    let solver = builder.build(&config)?;
    let report = solver
        .solve(&request)
        .map_err(|source| CliError::Solve { source })?;
    log::info!(
        "solved {}: {} trips, total wait {} min",
        config.request_path,
        report.num_trips_used,
        report.total_wait_min
    );
    Ok(report)
}

fn resolve_solve_config(args: SolveArgs) -> Result<SolveConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

/// Loads a JSON-encoded [`SolveRequest`] from disk.
pub(super) fn load_solve_request(path: &Utf8Path) -> Result<SolveRequest, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenSolveRequest {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseSolveRequest {
        path: path.to_path_buf(),
        source,
    })
}

fn write_solve_report(writer: &mut dyn Write, report: &SolveReport) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(report).map_err(CliError::SerializeSolveReport)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteSolveOutput)?;
    writer
        .write_all(b"\n")
        .map_err(CliError::WriteSolveOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SolveConfig, CliError> {
    let merged = SolveArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SolveConfig::try_from(merged)
}
