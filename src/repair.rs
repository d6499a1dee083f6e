//! Route repair and filtering.
//!
//! A permutation is walked edge by edge. Whenever the next edge is missing or
//! would overload the vehicle, a depot return is inserted between the two
//! stops and the walk continues on the two new edges. Permutations that cannot
//! be fixed that way are rejected whole.

use crate::problem::{Problem, Stop, DEPOT};
use crate::route::RepairedRoute;

/// Why a permutation was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The leg `from -> to` violates a constraint and no depot detour fixes it.
    Unrepairable { from: Stop, to: Stop },
    /// The accumulated cost passed the problem's cost ceiling.
    OverBudget,
    /// The repaired route is longer than the problem allows.
    TooManyStops { len: usize },
    /// The permutation names a stop that does not exist.
    InvalidStop { stop: Stop },
    /// The permutation is not bracketed by the depot.
    Malformed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VehicleState {
    AtDepot,
    InTransit,
}

/// Repair one permutation, or reject it.
///
/// Pure function of its inputs: the same permutation and problem always give
/// the same route and cost. A detour charges both `from -> depot` and
/// `depot -> to`.
pub fn repair(permutation: &[Stop], problem: &Problem) -> Result<RepairedRoute, Rejection> {
    if permutation.len() < 2
        || permutation.first() != Some(&DEPOT)
        || permutation.last() != Some(&DEPOT)
    {
        return Err(Rejection::Malformed);
    }
    if let Some(&stop) = permutation.iter().find(|&&stop| stop >= problem.stop_count()) {
        return Err(Rejection::InvalidStop { stop });
    }

    let capacity = problem.vehicle_capacity;
    let mut stops = Vec::with_capacity(permutation.len() * 2);
    let mut state = VehicleState::AtDepot;
    let mut load = 0u32;
    let mut cost = 0u64;
    stops.push(DEPOT);

    for &next in &permutation[1..] {
        let current = stops[stops.len() - 1];
        let demand = problem.demand(next);
        let direct = problem.cost(current, next);
        let fits = load.checked_add(demand).is_some_and(|total| total <= capacity);

        let edge = match direct {
            Some(edge) if fits => edge,
            _ => {
                // Already at the depot: a detour would change nothing.
                if state == VehicleState::AtDepot || demand > capacity {
                    return Err(Rejection::Unrepairable { from: current, to: next });
                }
                let (back, out) = match (problem.cost(current, DEPOT), problem.cost(DEPOT, next)) {
                    (Some(back), Some(out)) => (back, out),
                    _ => return Err(Rejection::Unrepairable { from: current, to: next }),
                };

                cost += u64::from(back);
                if exceeds_budget(problem, cost) {
                    return Err(Rejection::OverBudget);
                }
                stops.push(DEPOT);
                load = 0;
                out
            }
        };

        cost += u64::from(edge);
        if next == DEPOT {
            load = 0;
            state = VehicleState::AtDepot;
        } else {
            load += demand;
            state = VehicleState::InTransit;
        }
        stops.push(next);

        if exceeds_budget(problem, cost) {
            return Err(Rejection::OverBudget);
        }
    }

    if let Some(max_stops) = problem.max_stops {
        if stops.len() > max_stops {
            return Err(Rejection::TooManyStops { len: stops.len() });
        }
    }

    Ok(RepairedRoute::new(stops, cost))
}

fn exceeds_budget(problem: &Problem, cost: u64) -> bool {
    problem.max_cost.is_some_and(|ceiling| cost > ceiling)
}

/// Survivors of a batch of permutations, in input order, with counters.
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub routes: Vec<RepairedRoute>,
    pub evaluated: usize,
    pub rejected: usize,
}

impl FilterOutcome {
    /// Append another outcome after this one.
    pub fn merge(&mut self, other: FilterOutcome) {
        self.routes.extend(other.routes);
        self.evaluated += other.evaluated;
        self.rejected += other.rejected;
    }

    pub fn accepted(&self) -> usize {
        self.routes.len()
    }
}

/// Repair every permutation and keep the survivors.
pub fn filter_routes<I, P>(permutations: I, problem: &Problem) -> FilterOutcome
where
    I: IntoIterator<Item = P>,
    P: AsRef<[Stop]>,
{
    let mut outcome = FilterOutcome::default();

    for permutation in permutations {
        outcome.evaluated += 1;
        match repair(permutation.as_ref(), problem) {
            Ok(route) => outcome.routes.push(route),
            Err(rejection) => {
                outcome.rejected += 1;
                log::trace!("repair: rejected {:?} reason={rejection:?}", permutation.as_ref());
            }
        }
    }

    outcome
}
