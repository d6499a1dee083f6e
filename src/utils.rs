//! Utility functions: result writers and run statistics.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use crate::config::Strategy;
use crate::error::Result;
use crate::problem::Problem;
use crate::route::SearchResult;

/// Format a duration as hours, minutes, seconds and milliseconds.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!(
        "{}h {:02}m {:02}s {:03}ms",
        hours,
        minutes,
        seconds,
        duration.subsec_millis()
    )
}

/// Write a result in the plain layout: the stops separated by spaces, then
/// ` | ` and the total cost. An empty result is written as `no feasible route`.
pub fn write_result<W: Write>(result: &SearchResult, out: &mut W) -> Result<()> {
    match result {
        SearchResult::Found(route) => {
            for stop in &route.stops {
                write!(out, "{} ", stop)?;
            }
            writeln!(out, " | {}", route.total_cost)?;
        }
        SearchResult::NoFeasibleRoute => writeln!(out, "no feasible route")?,
    }
    Ok(())
}

/// Save a result to a file, with a short header describing the instance.
pub fn save_result<P: AsRef<Path>>(result: &SearchResult, problem: &Problem, path: P) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);

    writeln!(file, "# instance: {}", problem.name)?;
    writeln!(
        file,
        "# stops: {} capacity: {}",
        problem.stop_count(),
        problem.vehicle_capacity
    )?;
    write_result(result, &mut file)?;
    file.flush()?;

    Ok(())
}

/// Save a result as JSON.
pub fn save_result_json<P: AsRef<Path>>(result: &SearchResult, path: P) -> Result<()> {
    let file = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(file, result)?;
    Ok(())
}

/// Statistics about a finished search.
#[derive(Debug, Clone)]
pub struct SearchStatistics {
    pub strategy: Strategy,
    pub stops: usize,
    pub evaluated: usize,
    pub accepted: usize,
    pub runtime: Duration,
    pub best_cost: Option<u64>,
}

impl SearchStatistics {
    /// Share of evaluated orderings that survived repair.
    pub fn acceptance_ratio(&self) -> f64 {
        if self.evaluated == 0 {
            0.0
        } else {
            self.accepted as f64 / self.evaluated as f64
        }
    }

    /// Format the statistics as a string.
    pub fn format(&self) -> String {
        let best = match self.best_cost {
            Some(cost) => cost.to_string(),
            None => "none".to_string(),
        };

        format!(
            "Search Statistics:
- Strategy: {:?}
- Stops: {}
- Evaluated: {}
- Accepted: {} ({:.1}%)
- Runtime: {}
- Best Cost: {}",
            self.strategy,
            self.stops,
            self.evaluated,
            self.accepted,
            self.acceptance_ratio() * 100.0,
            format_duration(self.runtime),
            best
        )
    }
}
