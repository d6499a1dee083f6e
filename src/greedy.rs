//! Nearest-neighbour baseline: one ordering built by always moving to the
//! cheapest connected unvisited stop, then passed through the same repair.

use crate::permutation::Permutation;
use crate::problem::{Problem, DEPOT};
use crate::repair::repair;
use crate::route::SearchResult;

/// Build the nearest-neighbour ordering. Ties go to the lower stop id.
///
/// Returns `None` when the walk reaches a stop with no edge to any unvisited stop.
pub fn nearest_neighbor_order(problem: &Problem) -> Option<Permutation> {
    let n = problem.stop_count();
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n + 1);
    let mut current = DEPOT;

    visited[DEPOT] = true;
    order.push(DEPOT);

    for _ in 1..n {
        let (_, next) = (1..n)
            .filter(|&stop| !visited[stop])
            .filter_map(|stop| problem.cost(current, stop).map(|cost| (cost, stop)))
            .min()?;
        visited[next] = true;
        order.push(next);
        current = next;
    }

    order.push(DEPOT);
    Some(order)
}

/// Repair the nearest-neighbour ordering into a route.
pub fn search(problem: &Problem) -> SearchResult {
    let Some(order) = nearest_neighbor_order(problem) else {
        log::debug!("greedy: walk dead-ended before visiting every stop");
        return SearchResult::NoFeasibleRoute;
    };

    match repair(&order, problem) {
        Ok(route) => SearchResult::Found(route),
        Err(rejection) => {
            log::debug!("greedy: order {order:?} rejected reason={rejection:?}");
            SearchResult::NoFeasibleRoute
        }
    }
}
