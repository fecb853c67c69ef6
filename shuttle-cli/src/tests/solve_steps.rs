//! Behaviour-driven step definitions driving the solve CLI scenarios.

use super::helpers::{sample_request, write_request, write_utf8};
use super::*;
use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use shuttle_core::{
    Guest, INFEASIBLE_REASON, ReportStatus, SolveReport, SolveRequest, Solver, ValidationError,
};
use crate::solve::DefaultSolveSolverBuilder;
use std::cell::RefCell;
use tempfile::TempDir;

#[derive(Debug)]
struct SolveWorld {
    _tmp: TempDir,
    request_path: Utf8PathBuf,
    include_request: RefCell<bool>,
    workers: RefCell<usize>,
    trip_penalty: RefCell<Option<i64>>,
    built_with: RefCell<Option<SolveConfig>>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl SolveWorld {
    fn new() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
        let request_path = root.join("request.json");

        Self {
            _tmp: tmp,
            request_path,
            include_request: RefCell::new(true),
            workers: RefCell::new(1),
            trip_penalty: RefCell::new(None),
            built_with: RefCell::new(None),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec!["shuttle".to_owned(), "solve".to_owned()];
        if *self.include_request.borrow() {
            argv.push(self.request_path.as_str().to_owned());
        }
        argv.extend([
            format!("--{ARG_SOLVE_TIME_LIMIT}"),
            "5".to_owned(),
            format!("--{ARG_SOLVE_WORKERS}"),
            self.workers.borrow().to_string(),
        ]);
        if let Some(penalty) = *self.trip_penalty.borrow() {
            argv.extend([format!("--{ARG_SOLVE_TRIP_PENALTY}"), penalty.to_string()]);
        }
        argv
    }

    fn error(&self) -> std::cell::Ref<'_, CliError> {
        std::cell::Ref::map(self.result.borrow(), |result| {
            result
                .as_ref()
                .expect("result recorded")
                .as_ref()
                .expect_err("expected error")
        })
    }

    fn report(&self) -> SolveReport {
        let borrowed = self.result.borrow();
        borrowed
            .as_ref()
            .expect("result recorded")
            .as_ref()
            .expect("expected success");
        let stdout = String::from_utf8(self.stdout.borrow().clone()).expect("stdout utf-8");
        assert!(stdout.ends_with('\n'), "output should end with a newline");
        serde_json::from_str(&stdout).expect("output should be a JSON solve report")
    }
}

#[fixture]
fn world() -> SolveWorld {
    SolveWorld::new()
}

/// Records the resolved configuration, then builds the real solver.
struct RecordingSolveSolverBuilder<'a> {
    seen: &'a RefCell<Option<SolveConfig>>,
}

impl SolveSolverBuilder for RecordingSolveSolverBuilder<'_> {
    fn build(&self, config: &SolveConfig) -> Result<Box<dyn Solver>, CliError> {
        self.seen.replace(Some(config.clone()));
        DefaultSolveSolverBuilder.build(config)
    }
}

#[given("I omit the solve request path")]
fn omit_solve_request_path(#[from(world)] world: &SolveWorld) {
    *world.include_request.borrow_mut() = false;
}

#[given("a valid solve request exists on disk")]
fn valid_solve_request_exists(#[from(world)] world: &SolveWorld) {
    write_request(&world.request_path, &sample_request());
}

#[given("an unsatisfiable solve request exists on disk")]
fn unsatisfiable_solve_request_exists(#[from(world)] world: &SolveWorld) {
    let request = SolveRequest::new(
        vec![Guest::new("g1", "Ada", 0), Guest::new("g2", "Brian", 0)],
        1,
        1,
        0,
    );
    write_request(&world.request_path, &request);
}

#[given("the solve request contains invalid JSON")]
fn solve_request_contains_invalid_json(#[from(world)] world: &SolveWorld) {
    write_utf8(&world.request_path, b"{ not valid json");
}

#[given("the solve request asks for no vehicles")]
fn solve_request_asks_for_no_vehicles(#[from(world)] world: &SolveWorld) {
    let mut request = sample_request();
    request.num_cars = 0;
    write_request(&world.request_path, &request);
}

#[given("I request {workers:usize} workers")]
fn request_workers(#[from(world)] world: &SolveWorld, workers: usize) {
    world.workers.replace(workers);
}

#[given("a trip penalty of {penalty:i64}")]
fn request_trip_penalty(#[from(world)] world: &SolveWorld, penalty: i64) {
    world.trip_penalty.replace(Some(penalty));
}

#[when("I run the solve command")]
fn run_solve_command(#[from(world)] world: &SolveWorld) {
    let invocation = world.build_command_line();
    let parsed = Cli::try_parse_from(invocation).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Solve(args) => {
            let builder = RecordingSolveSolverBuilder {
                seen: &world.built_with,
            };
            let mut buffer = world.stdout.borrow_mut();
            run_solve_with(args, &builder, &mut *buffer)
        }
    });

    world.result.replace(Some(outcome));
}

#[then("the command succeeds and prints a plan with {trips:usize} trips")]
fn command_prints_plan(#[from(world)] world: &SolveWorld, trips: usize) {
    let report = world.report();
    assert_eq!(report.status, ReportStatus::Ok);
    assert_eq!(report.num_trips_used, trips);
    assert_eq!(report.trips.len(), trips);
}

#[then("the printed total wait is {minutes:i64} minutes")]
fn printed_total_wait(#[from(world)] world: &SolveWorld, minutes: i64) {
    assert_eq!(world.report().total_wait_min, minutes);
}

#[then("the command succeeds and prints an infeasible report")]
fn command_prints_infeasible(#[from(world)] world: &SolveWorld) {
    let report = world.report();
    assert_eq!(report.status, ReportStatus::Infeasible);
    assert_eq!(report.reason.as_deref(), Some(INFEASIBLE_REASON));
    assert!(report.trips.is_empty());
}

#[then("the solver was built with {workers:usize} workers and trip penalty {penalty:i64}")]
fn solver_built_with(#[from(world)] world: &SolveWorld, workers: usize, penalty: i64) {
    let config = world
        .built_with
        .borrow()
        .clone()
        .expect("solver should have been built");
    assert_eq!(config.planner.limits.num_workers, workers);
    assert_eq!(config.planner.trip_penalty, penalty);
}

#[then("the command fails because the request JSON is invalid")]
fn command_fails_invalid_json(#[from(world)] world: &SolveWorld) {
    match &*world.error() {
        CliError::ParseSolveRequest { .. } => {}
        other => panic!("expected ParseSolveRequest, found {other:?}"),
    }
}

#[then("the command fails because the request is invalid")]
fn command_fails_invalid_request(#[from(world)] world: &SolveWorld) {
    match &*world.error() {
        CliError::InvalidSolveRequest { source, .. } => {
            assert_eq!(*source, ValidationError::NoVehicles);
        }
        other => panic!("expected InvalidSolveRequest, found {other:?}"),
    }
    assert!(world.built_with.borrow().is_none());
}

#[then("the command fails because the request path is missing")]
fn command_fails_missing_request_path(#[from(world)] world: &SolveWorld) {
    match &*world.error() {
        CliError::MissingArgument { field, .. } => assert_eq!(*field, ARG_SOLVE_REQUEST),
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[then("the command fails because the search settings are invalid")]
fn command_fails_invalid_settings(#[from(world)] world: &SolveWorld) {
    match &*world.error() {
        CliError::InvalidSettings { .. } => {}
        other => panic!("expected InvalidSettings, found {other:?}"),
    }
}

macro_rules! register_solve_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/solve_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: SolveWorld) {
            let _ = world;
        }
    };
}

register_solve_scenario!(solve_happy_path, "solving a request from JSON");
register_solve_scenario!(solve_infeasible_request, "reporting an unsatisfiable request");
register_solve_scenario!(solve_overrides, "passing search settings to the solver");
register_solve_scenario!(solve_invalid_settings, "rejecting unusable search settings");
register_solve_scenario!(solve_invalid_json, "rejecting invalid JSON input");
register_solve_scenario!(solve_invalid_request, "rejecting invalid solve requests");
register_solve_scenario!(solve_missing_request, "rejecting missing request paths");
