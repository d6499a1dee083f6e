//! Reduction of surviving routes to the single cheapest one.

use crate::route::{RepairedRoute, SearchResult};

/// Picks the minimum-cost route. Ties keep the first route seen.
pub struct Selector;

impl Selector {
    /// Select the cheapest route from a collection.
    pub fn select<I>(routes: I) -> SearchResult
    where
        I: IntoIterator<Item = RepairedRoute>,
    {
        let mut best: Option<RepairedRoute> = None;

        for route in routes {
            let cheaper = best
                .as_ref()
                .map_or(true, |current| route.total_cost < current.total_cost);
            if cheaper {
                best = Some(route);
            }
        }

        match best {
            Some(route) => SearchResult::Found(route),
            None => SearchResult::NoFeasibleRoute,
        }
    }
}
