//! Basic example of using the cvrp_exhaustive library.

use cvrp_exhaustive::config::{Config, Strategy};
use cvrp_exhaustive::problem::Problem;
use cvrp_exhaustive::utils::{format_duration, save_result};
use cvrp_exhaustive::ExhaustiveSearch;
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Get instance path from command line or use a built-in instance
    let args: Vec<String> = env::args().collect();
    let problem = if args.len() > 1 {
        println!("Loading problem from: {}", args[1]);
        Problem::from_file(&args[1], 15)?
    } else {
        Problem::from_edges(
            "demo".to_string(),
            vec![0, 4, 6, 3, 5],
            &[
                (0, 1, 5),
                (0, 2, 9),
                (0, 3, 4),
                (0, 4, 7),
                (1, 2, 3),
                (2, 3, 6),
                (3, 4, 2),
                (1, 4, 8),
            ],
            10,
        )?
    };
    println!(
        "Loaded problem: {} with {} customers",
        problem.name,
        problem.customer_count()
    );

    for strategy in [
        Strategy::Sequential,
        Strategy::Parallel,
        Strategy::Distributed,
        Strategy::NearestNeighbor,
    ] {
        let config = Config::new()
            .with_strategy(strategy)
            .with_threads(4)
            .with_workers(2);
        let mut search = ExhaustiveSearch::new(problem.clone(), config);
        let result = search.run()?.clone();

        println!(
            "{:?}: {} in {}",
            strategy,
            result,
            format_duration(search.run_time)
        );
    }

    // Save the exhaustive result
    let mut search = ExhaustiveSearch::new(problem.clone(), Config::new());
    let result = search.run()?;
    let output_path = format!("{}.sol", problem.name);
    println!("Saving solution to: {}", output_path);
    save_result(result, &problem, &output_path)?;

    Ok(())
}
