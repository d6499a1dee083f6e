//! Route representations produced by the repair pass and reduced by the selector.

use crate::problem::{Problem, Stop, DEPOT};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A permutation after depot-return repair, with its accumulated cost.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepairedRoute {
    /// Visiting order; starts and ends at the depot, which may also appear in between
    pub stops: Vec<Stop>,
    /// Sum of the edge costs along `stops`
    pub total_cost: u64,
}

impl RepairedRoute {
    /// Create a route from a stop sequence and its cost.
    pub fn new(stops: Vec<Stop>, total_cost: u64) -> Self {
        RepairedRoute { stops, total_cost }
    }

    /// Number of depot-anchored trips the vehicle makes.
    pub fn trip_count(&self) -> usize {
        self.stops
            .windows(2)
            .filter(|pair| pair[1] == DEPOT && pair[0] != DEPOT)
            .count()
    }

    /// Recompute the cost from the matrix. `None` if a leg uses a missing edge.
    pub fn recompute_cost(&self, problem: &Problem) -> Option<u64> {
        self.stops.windows(2).try_fold(0u64, |acc, pair| {
            problem
                .cost(pair[0], pair[1])
                .map(|cost| acc + u64::from(cost))
        })
    }

    /// Check every route invariant against the problem: depot at both ends,
    /// real edges only, load since the last depot visit within capacity,
    /// and the recorded cost matching the matrix.
    pub fn is_feasible(&self, problem: &Problem) -> bool {
        if self.stops.len() < 2
            || self.stops.first() != Some(&DEPOT)
            || self.stops.last() != Some(&DEPOT)
            || self.stops.iter().any(|&stop| stop >= problem.stop_count())
        {
            return false;
        }

        let mut load = 0u64;
        for &stop in &self.stops[1..] {
            if stop == DEPOT {
                load = 0;
                continue;
            }
            load += u64::from(problem.demand(stop));
            if load > u64::from(problem.vehicle_capacity) {
                return false;
            }
        }

        if let Some(max_stops) = problem.max_stops {
            if self.stops.len() > max_stops {
                return false;
            }
        }

        self.recompute_cost(problem) == Some(self.total_cost)
    }
}

impl fmt::Display for RepairedRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path: Vec<String> = self.stops.iter().map(|stop| stop.to_string()).collect();
        write!(f, "{} (cost {})", path.join(" -> "), self.total_cost)
    }
}

/// Outcome of a search: the cheapest surviving route, or an explicit empty marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchResult {
    Found(RepairedRoute),
    NoFeasibleRoute,
}

impl SearchResult {
    /// The selected route, if any survived.
    pub fn route(&self) -> Option<&RepairedRoute> {
        match self {
            SearchResult::Found(route) => Some(route),
            SearchResult::NoFeasibleRoute => None,
        }
    }

    /// Total cost of the selected route.
    pub fn total_cost(&self) -> Option<u64> {
        self.route().map(|route| route.total_cost)
    }

    pub fn is_found(&self) -> bool {
        matches!(self, SearchResult::Found(_))
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchResult::Found(route) => write!(f, "{route}"),
            SearchResult::NoFeasibleRoute => write!(f, "no feasible route"),
        }
    }
}
