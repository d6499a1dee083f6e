//! Unit tests for depot-return repair and batch filtering.

use cvrp_exhaustive::generator::InstanceGenerator;
use cvrp_exhaustive::permutation::Permutations;
use cvrp_exhaustive::problem::Problem;
use cvrp_exhaustive::repair::{filter_routes, repair, Rejection};
use cvrp_exhaustive::route::RepairedRoute;

/// Depot plus two stops: demands 4 and 6, costs 0-1 = 5, 1-2 = 3, 0-2 = 9.
fn create_triangle(capacity: u32) -> Problem {
    Problem::from_edges(
        "Triangle".to_string(),
        vec![0, 4, 6],
        &[(0, 1, 5), (1, 2, 3), (0, 2, 9)],
        capacity,
    )
    .unwrap()
}

/// Depot plus three stops on a complete graph.
fn create_square(capacity: u32) -> Problem {
    Problem::from_edges(
        "Square".to_string(),
        vec![0, 4, 6, 5],
        &[
            (0, 1, 5),
            (0, 2, 9),
            (0, 3, 4),
            (1, 2, 3),
            (1, 3, 7),
            (2, 3, 6),
        ],
        capacity,
    )
    .unwrap()
}

#[test]
fn test_repair_keeps_feasible_permutation() {
    let problem = create_triangle(10);

    let forward = repair(&[0, 1, 2, 0], &problem).unwrap();
    let backward = repair(&[0, 2, 1, 0], &problem).unwrap();

    assert_eq!(forward.stops, vec![0, 1, 2, 0]);
    assert_eq!(forward.total_cost, 17);
    assert_eq!(backward.stops, vec![0, 2, 1, 0]);
    assert_eq!(backward.total_cost, 17);
    assert_eq!(forward.trip_count(), 1);
}

#[test]
fn test_repair_inserts_depot_on_capacity_violation() {
    let problem = create_triangle(8);

    let route = repair(&[0, 1, 2, 0], &problem).unwrap();

    assert_eq!(route.stops, vec![0, 1, 0, 2, 0]);
    // 0->1, 1->0 detour, 0->2, 2->0
    assert_eq!(route.total_cost, 5 + 5 + 9 + 9);
    assert_eq!(route.trip_count(), 2);
    assert!(route.is_feasible(&problem));

    let route = repair(&[0, 2, 1, 0], &problem).unwrap();
    assert_eq!(route.stops, vec![0, 2, 0, 1, 0]);
    assert_eq!(route.total_cost, 28);
}

#[test]
fn test_repair_rejects_when_detour_edge_missing() {
    let problem = Problem::from_edges(
        "NoDepotLink".to_string(),
        vec![0, 4, 6],
        &[(0, 1, 5), (1, 2, 3)],
        8,
    )
    .unwrap();

    assert_eq!(
        repair(&[0, 1, 2, 0], &problem),
        Err(Rejection::Unrepairable { from: 1, to: 2 })
    );
    assert_eq!(
        repair(&[0, 2, 1, 0], &problem),
        Err(Rejection::Unrepairable { from: 0, to: 2 })
    );
}

#[test]
fn test_repair_inserts_depot_on_missing_edge() {
    // 1-2 is absent but both stops link to the depot.
    let problem = Problem::from_edges(
        "NoCrossLink".to_string(),
        vec![0, 4, 6],
        &[(0, 1, 5), (0, 2, 9)],
        100,
    )
    .unwrap();

    let route = repair(&[0, 1, 2, 0], &problem).unwrap();

    assert_eq!(route.stops, vec![0, 1, 0, 2, 0]);
    assert_eq!(route.total_cost, 28);
}

#[test]
fn test_repair_splits_long_trip() {
    let problem = create_square(10);

    let route = repair(&[0, 1, 2, 3, 0], &problem).unwrap();

    // 4 + 6 fills the vehicle, stop 3 needs a second trip.
    assert_eq!(route.stops, vec![0, 1, 2, 0, 3, 0]);
    assert_eq!(route.total_cost, 5 + 3 + 9 + 4 + 4);
    assert!(route.is_feasible(&problem));
}

#[test]
fn test_repair_can_split_more_than_once() {
    let problem = create_square(6);

    let route = repair(&[0, 1, 2, 3, 0], &problem).unwrap();

    assert_eq!(route.stops, vec![0, 1, 0, 2, 0, 3, 0]);
    assert_eq!(route.total_cost, 5 + 5 + 9 + 9 + 4 + 4);
    assert_eq!(route.trip_count(), 3);
}

#[test]
fn test_repair_rejects_stop_heavier_than_vehicle() {
    let problem = create_triangle(5);

    // Stop 2 needs 6 and the vehicle holds 5, even fresh from the depot.
    assert_eq!(
        repair(&[0, 1, 2, 0], &problem),
        Err(Rejection::Unrepairable { from: 1, to: 2 })
    );
    assert_eq!(
        repair(&[0, 2, 1, 0], &problem),
        Err(Rejection::Unrepairable { from: 0, to: 2 })
    );
}

#[test]
fn test_repair_rejects_missing_return_edge() {
    // Stop 2 cannot get back to the depot.
    let problem = Problem::from_edges(
        "NoReturn".to_string(),
        vec![0, 4, 6],
        &[(0, 1, 5), (1, 2, 3)],
        10,
    )
    .unwrap();

    assert_eq!(
        repair(&[0, 1, 2, 0], &problem),
        Err(Rejection::Unrepairable { from: 2, to: 0 })
    );
}

#[test]
fn test_repair_enforces_max_stops() {
    let problem = create_triangle(8).with_max_stops(4);
    assert_eq!(
        repair(&[0, 1, 2, 0], &problem),
        Err(Rejection::TooManyStops { len: 5 })
    );

    let problem = create_triangle(8).with_max_stops(5);
    assert!(repair(&[0, 1, 2, 0], &problem).is_ok());
}

#[test]
fn test_repair_enforces_cost_ceiling() {
    let problem = create_triangle(10).with_max_cost(17);
    assert_eq!(repair(&[0, 1, 2, 0], &problem).unwrap().total_cost, 17);

    let problem = create_triangle(10).with_max_cost(16);
    assert_eq!(repair(&[0, 1, 2, 0], &problem), Err(Rejection::OverBudget));

    // The detour back to the depot already exceeds the ceiling.
    let problem = create_triangle(8).with_max_cost(9);
    assert_eq!(repair(&[0, 1, 2, 0], &problem), Err(Rejection::OverBudget));
}

#[test]
fn test_repair_rejects_invalid_input() {
    let problem = create_triangle(10);

    assert_eq!(
        repair(&[0, 1, 5, 0], &problem),
        Err(Rejection::InvalidStop { stop: 5 })
    );
    assert_eq!(repair(&[1, 2, 0], &problem), Err(Rejection::Malformed));
    assert_eq!(repair(&[0], &problem), Err(Rejection::Malformed));
}

#[test]
fn test_repair_is_deterministic() {
    let problem = InstanceGenerator::new(6, 11).generate().unwrap();

    for permutation in Permutations::new(6).iter() {
        assert_eq!(repair(&permutation, &problem), repair(&permutation, &problem));
    }
}

#[test]
fn test_repaired_routes_satisfy_invariants() {
    for seed in 0..6 {
        let problem = InstanceGenerator::new(6, seed)
            .with_edge_probability(0.7)
            .generate()
            .unwrap();

        for permutation in Permutations::new(6).iter() {
            if let Ok(route) = repair(&permutation, &problem) {
                assert!(route.is_feasible(&problem), "seed {seed}: {route}");
                assert_eq!(route.stops.first(), Some(&0));
                assert_eq!(route.stops.last(), Some(&0));
            }
        }
    }
}

#[test]
fn test_filter_routes_counts() {
    let problem = create_triangle(8);
    let outcome = filter_routes(Permutations::new(3).iter(), &problem);
    assert_eq!(outcome.evaluated, 2);
    assert_eq!(outcome.accepted(), 2);
    assert_eq!(outcome.rejected, 0);
    assert_eq!(outcome.routes[0].stops, vec![0, 1, 0, 2, 0]);

    let problem = Problem::from_edges(
        "NoDepotLink".to_string(),
        vec![0, 4, 6],
        &[(0, 1, 5), (1, 2, 3)],
        8,
    )
    .unwrap();
    let outcome = filter_routes(Permutations::new(3).iter(), &problem);
    assert_eq!(outcome.evaluated, 2);
    assert_eq!(outcome.accepted(), 0);
    assert_eq!(outcome.rejected, 2);
}

#[test]
fn test_repair_rejects_huge_demand_after_loaded_stop() {
    let text = "3\n1 1\n2 4294967295\n3\n0 1 5\n1 2 3\n0 2 9\n";
    let problem = Problem::parse(text.as_bytes(), "huge".to_string(), 15).unwrap();

    assert_eq!(problem.demand(2), u32::MAX);
    assert_eq!(
        repair(&[0, 1, 2, 0], &problem),
        Err(Rejection::Unrepairable { from: 1, to: 2 })
    );
    assert_eq!(
        repair(&[0, 2, 1, 0], &problem),
        Err(Rejection::Unrepairable { from: 0, to: 2 })
    );
}

#[test]
fn test_feasibility_check_catches_huge_load() {
    let problem = Problem::from_edges(
        "huge".to_string(),
        vec![0, 1, u32::MAX],
        &[(0, 1, 5), (1, 2, 3), (0, 2, 9)],
        15,
    )
    .unwrap();

    let route = RepairedRoute::new(vec![0, 1, 2, 0], 17);
    assert!(!route.is_feasible(&problem));
}
