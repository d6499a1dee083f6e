//! Unit tests for the formatting helpers and run statistics.

use cvrp_exhaustive::config::Strategy;
use cvrp_exhaustive::utils::{format_duration, SearchStatistics};
use std::time::Duration;

fn create_statistics(evaluated: usize, accepted: usize) -> SearchStatistics {
    SearchStatistics {
        strategy: Strategy::Parallel,
        stops: 5,
        evaluated,
        accepted,
        runtime: Duration::from_millis(1_250),
        best_cost: Some(42),
    }
}

#[test]
fn test_format_duration() {
    assert_eq!(format_duration(Duration::from_secs(65)), "0h 01m 05s 000ms");
    assert_eq!(
        format_duration(Duration::from_secs(3600 + 120 + 5)),
        "1h 02m 05s 000ms"
    );
    assert_eq!(format_duration(Duration::from_millis(1_250)), "0h 00m 01s 250ms");
}

#[test]
fn test_acceptance_ratio() {
    assert_eq!(create_statistics(24, 6).acceptance_ratio(), 0.25);
    assert_eq!(create_statistics(0, 0).acceptance_ratio(), 0.0);
}

#[test]
fn test_statistics_format() {
    let text = create_statistics(24, 6).format();

    assert!(text.contains("Strategy: Parallel"));
    assert!(text.contains("Accepted: 6 (25.0%)"));
    assert!(text.contains("Runtime: 0h 00m 01s 250ms"));
    assert!(text.contains("Best Cost: 42"));

    let mut empty = create_statistics(24, 0);
    empty.best_cost = None;
    assert!(empty.format().contains("Best Cost: none"));
}
