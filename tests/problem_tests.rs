//! Unit tests for the problem model, the text loader and the instance generator.

use cvrp_exhaustive::generator::InstanceGenerator;
use cvrp_exhaustive::problem::{Problem, DEPOT, NO_EDGE};
use cvrp_exhaustive::Error;
use std::io::Write;

/// Creates the three-stop instance: depot, stop 1 (demand 4), stop 2 (demand 6).
fn create_test_problem() -> Problem {
    Problem::from_edges(
        "Triangle".to_string(),
        vec![0, 4, 6],
        &[(0, 1, 5), (1, 2, 3), (0, 2, 9)],
        10,
    )
    .unwrap()
}

const TRIANGLE_TEXT: &str = "3
1 4
2 6
3
0 1 5
1 2 3
0 2 9
";

#[test]
fn test_from_edges_is_symmetric() {
    let problem = create_test_problem();

    assert_eq!(problem.stop_count(), 3);
    assert_eq!(problem.customer_count(), 2);
    assert_eq!(problem.cost(0, 1), Some(5));
    assert_eq!(problem.cost(1, 0), Some(5));
    assert_eq!(problem.cost(2, 1), Some(3));
    assert_eq!(problem.cost(2, 0), Some(9));
    assert_eq!(problem.demand(DEPOT), 0);
    assert_eq!(problem.demand(2), 6);
}

#[test]
fn test_zero_cost_is_no_connection() {
    let problem = Problem::from_edges("Path".to_string(), vec![0, 1, 1], &[(0, 1, 4), (1, 2, 4)], 5)
        .unwrap();

    assert_eq!(problem.cost_matrix[0][2], NO_EDGE);
    assert_eq!(problem.cost(0, 2), None);
    assert_eq!(problem.cost(2, 0), None);
    // The diagonal is never an edge either.
    assert_eq!(problem.cost(1, 1), None);
}

#[test]
fn test_new_rejects_asymmetric_matrix() {
    let matrix = vec![vec![0, 5, 9], vec![5, 0, 3], vec![8, 3, 0]];
    let result = Problem::new("Bad".to_string(), vec![0, 4, 6], matrix, 10);

    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[test]
fn test_new_rejects_depot_demand() {
    let matrix = vec![vec![0, 5], vec![5, 0]];
    let result = Problem::new("Bad".to_string(), vec![2, 4], matrix, 10);

    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[test]
fn test_new_rejects_shape_mismatch() {
    let matrix = vec![vec![0, 5], vec![5, 0]];
    let result = Problem::new("Bad".to_string(), vec![0, 4, 6], matrix, 10);

    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[test]
fn test_new_rejects_depot_only_instance() {
    let result = Problem::new("Bad".to_string(), vec![0], vec![vec![0]], 10);

    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[test]
fn test_from_edges_rejects_unknown_stop() {
    let result = Problem::from_edges("Bad".to_string(), vec![0, 4], &[(0, 3, 5)], 10);

    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[test]
fn test_limits_builders() {
    let problem = create_test_problem().with_max_stops(5).with_max_cost(30);

    assert_eq!(problem.max_stops, Some(5));
    assert_eq!(problem.max_cost, Some(30));
}

#[test]
fn test_parse_text_format() {
    let problem = Problem::parse(TRIANGLE_TEXT.as_bytes(), "triangle".to_string(), 15).unwrap();

    assert_eq!(problem.name, "triangle");
    assert_eq!(problem.demands, vec![0, 4, 6]);
    assert_eq!(problem.vehicle_capacity, 15);
    assert_eq!(problem.cost(0, 1), Some(5));
    assert_eq!(problem.cost(2, 1), Some(3));
    assert_eq!(problem.cost(0, 2), Some(9));
}

#[test]
fn test_parse_absent_edges_default_to_sentinel() {
    let text = "3\n1 4\n2 6\n2\n0 1 5\n1 2 3\n";
    let problem = Problem::parse(text.as_bytes(), "partial".to_string(), 15).unwrap();

    assert_eq!(problem.cost(0, 2), None);
}

#[test]
fn test_parse_truncated_input() {
    let text = "3\n1 4\n2 6\n3\n0 1 5\n";
    let result = Problem::parse(text.as_bytes(), "truncated".to_string(), 15);

    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[test]
fn test_parse_bad_token() {
    let text = "3\n1 four\n2 6\n0\n";
    let result = Problem::parse(text.as_bytes(), "bad".to_string(), 15);

    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[test]
fn test_parse_demand_for_depot_is_rejected() {
    let text = "3\n0 4\n2 6\n0\n";
    let result = Problem::parse(text.as_bytes(), "bad".to_string(), 15);

    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[test]
fn test_from_file() {
    let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    file.write_all(TRIANGLE_TEXT.as_bytes()).unwrap();

    let problem = Problem::from_file(file.path(), 10).unwrap();

    assert_eq!(problem.stop_count(), 3);
    assert_eq!(problem.vehicle_capacity, 10);
    assert!(!problem.name.is_empty());
}

#[test]
fn test_from_missing_file() {
    let result = Problem::from_file("/definitely/not/here.txt", 10);

    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_is_connected() {
    assert!(create_test_problem().is_connected());

    // Stop 3 has no edges at all.
    let problem = Problem::from_edges(
        "Island".to_string(),
        vec![0, 1, 1, 1],
        &[(0, 1, 2), (1, 2, 2)],
        5,
    )
    .unwrap();
    assert!(!problem.is_connected());

    // A path through the depot is connected even without a full matrix.
    let problem = Problem::from_edges(
        "Path".to_string(),
        vec![0, 1, 1, 1],
        &[(0, 1, 2), (1, 2, 2), (2, 3, 2)],
        5,
    )
    .unwrap();
    assert!(problem.is_connected());
}

#[test]
fn test_generator_is_reproducible() {
    let first = InstanceGenerator::new(7, 42).generate().unwrap();
    let second = InstanceGenerator::new(7, 42).generate().unwrap();
    let other = InstanceGenerator::new(7, 43).generate().unwrap();

    assert_eq!(first.demands, second.demands);
    assert_eq!(first.cost_matrix, second.cost_matrix);
    assert!(first.demands != other.demands || first.cost_matrix != other.cost_matrix);
}

#[test]
fn test_generator_respects_ranges() {
    let problem = InstanceGenerator::new(8, 3)
        .with_demand_range(2, 5)
        .with_cost_range(10, 12)
        .with_edge_probability(1.0)
        .with_vehicle_capacity(20)
        .generate()
        .unwrap();

    assert_eq!(problem.stop_count(), 8);
    assert_eq!(problem.vehicle_capacity, 20);
    assert_eq!(problem.demand(DEPOT), 0);
    for stop in 1..8 {
        assert!((2..=5).contains(&problem.demand(stop)));
    }
    for i in 0..8 {
        for j in 0..8 {
            if i != j {
                let cost = problem.cost(i, j).unwrap();
                assert!((10..=12).contains(&cost));
                assert_eq!(problem.cost(j, i), Some(cost));
            }
        }
    }
}

#[test]
fn test_generator_rejects_bad_parameters() {
    assert!(InstanceGenerator::new(5, 0)
        .with_edge_probability(1.5)
        .generate()
        .is_err());
    assert!(InstanceGenerator::new(5, 0)
        .with_demand_range(6, 2)
        .generate()
        .is_err());
    assert!(InstanceGenerator::new(1, 0).generate().is_err());
}
