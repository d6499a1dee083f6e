//! Command-line front end: load or generate an instance, run the search and
//! report the cheapest route.

use clap::Parser;
use cvrp_exhaustive::config::{Config, Strategy};
use cvrp_exhaustive::generator::InstanceGenerator;
use cvrp_exhaustive::problem::{Problem, DEFAULT_CAPACITY};
use cvrp_exhaustive::utils::{format_duration, save_result, save_result_json};
use cvrp_exhaustive::{Error, ExhaustiveSearch, Result};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "cvrp-exhaustive",
    about = "Exhaustive CVRP route search with depot-return repair"
)]
struct Arguments {
    /// Instance file (stop count, stop/demand lines, edge count, u/v/cost lines)
    #[arg(value_name = "path", required_unless_present = "random")]
    input: Option<PathBuf>,
    /// Vehicle capacity
    #[arg(short, long, default_value_t = DEFAULT_CAPACITY)]
    capacity: u32,
    /// Maximum route length, depot visits included
    #[arg(long)]
    max_stops: Option<usize>,
    /// Cost ceiling for a route
    #[arg(long)]
    max_cost: Option<u64>,
    /// Execution strategy
    #[arg(short, long, value_enum, default_value_t = Strategy::Parallel)]
    strategy: Strategy,
    /// Shared-memory worker threads (defaults to available parallelism)
    #[arg(short, long)]
    threads: Option<usize>,
    /// Ranks in a distributed run, coordinator included
    #[arg(short, long, default_value_t = 4)]
    workers: usize,
    /// Generate a random instance with this many stops instead of reading a file
    #[arg(long, value_name = "stops", conflicts_with = "input")]
    random: Option<usize>,
    /// Seed for --random
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Write the result to this file
    #[arg(short, long, value_name = "path")]
    output: Option<PathBuf>,
    /// Write the output file as JSON
    #[arg(long, requires = "output")]
    json: bool,
    /// Enumerate even if the graph is disconnected
    #[arg(long)]
    skip_connectivity_check: bool,
}

fn load_problem(args: &Arguments) -> Result<Problem> {
    let problem = match (&args.input, args.random) {
        (_, Some(stops)) => InstanceGenerator::new(stops, args.seed)
            .with_vehicle_capacity(args.capacity)
            .generate()?,
        (Some(path), None) => Problem::from_file(path, args.capacity)?,
        (None, None) => return Err(Error::invalid_input("no instance given")),
    };

    let problem = match args.max_stops {
        Some(max_stops) => problem.with_max_stops(max_stops),
        None => problem,
    };
    Ok(match args.max_cost {
        Some(max_cost) => problem.with_max_cost(max_cost),
        None => problem,
    })
}

fn run(args: Arguments) -> Result<()> {
    let problem = load_problem(&args)?;
    log::info!(
        "loaded problem: {} with {} stops",
        problem.name,
        problem.stop_count()
    );

    let mut config = Config::new()
        .with_strategy(args.strategy)
        .with_workers(args.workers)
        .with_skip_connectivity_check(args.skip_connectivity_check);
    if let Some(threads) = args.threads {
        config = config.with_threads(threads);
    }

    let mut search = ExhaustiveSearch::new(problem, config);
    let result = search.run()?.clone();
    let statistics = search.statistics();

    println!("Search completed in {}", format_duration(statistics.runtime));
    println!("Result: {result}");
    println!("{}", statistics.format());

    if let Some(path) = &args.output {
        if args.json {
            save_result_json(&result, path)?;
        } else {
            save_result(&result, &search.problem, path)?;
        }
        println!("Saved result to: {}", path.display());
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Arguments::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
