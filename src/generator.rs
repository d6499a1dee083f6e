//! Seeded random instances for tests, benchmarks and quick experiments.

use crate::error::{Error, Result};
use crate::problem::{Problem, DEPOT, NO_EDGE};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Parameters of a random instance. The same parameters always give the same problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceGenerator {
    /// Stops including the depot
    pub stops: usize,
    /// Inclusive demand range for non-depot stops
    pub demand_range: (u32, u32),
    /// Inclusive cost range for existing edges; the lower bound is raised to 1
    pub cost_range: (u32, u32),
    /// Probability that a pair of stops is connected
    pub edge_probability: f64,
    pub vehicle_capacity: u32,
    pub seed: u64,
}

impl Default for InstanceGenerator {
    fn default() -> Self {
        InstanceGenerator {
            stops: 6,
            demand_range: (1, 8),
            cost_range: (1, 20),
            edge_probability: 0.8,
            vehicle_capacity: 15,
            seed: 0,
        }
    }
}

impl InstanceGenerator {
    pub fn new(stops: usize, seed: u64) -> Self {
        InstanceGenerator {
            stops,
            seed,
            ..Default::default()
        }
    }

    pub fn with_demand_range(mut self, min: u32, max: u32) -> Self {
        self.demand_range = (min, max);
        self
    }

    pub fn with_cost_range(mut self, min: u32, max: u32) -> Self {
        self.cost_range = (min, max);
        self
    }

    pub fn with_edge_probability(mut self, probability: f64) -> Self {
        self.edge_probability = probability;
        self
    }

    pub fn with_vehicle_capacity(mut self, capacity: u32) -> Self {
        self.vehicle_capacity = capacity;
        self
    }

    /// Draw the instance.
    pub fn generate(&self) -> Result<Problem> {
        let (demand_min, demand_max) = self.demand_range;
        let (cost_min, cost_max) = (self.cost_range.0.max(1), self.cost_range.1);
        if demand_min > demand_max || cost_min > cost_max {
            return Err(Error::invalid_input("generator range has min above max"));
        }
        if !(0.0..=1.0).contains(&self.edge_probability) {
            return Err(Error::invalid_input(format!(
                "edge probability {} is outside [0, 1]",
                self.edge_probability
            )));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let n = self.stops;

        let demands: Vec<u32> = (0..n)
            .map(|stop| {
                if stop == DEPOT {
                    0
                } else {
                    rng.gen_range(demand_min..=demand_max)
                }
            })
            .collect();

        let mut cost_matrix = vec![vec![NO_EDGE; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                if rng.gen_bool(self.edge_probability) {
                    let cost = rng.gen_range(cost_min..=cost_max);
                    cost_matrix[i][j] = cost;
                    cost_matrix[j][i] = cost;
                }
            }
        }

        Problem::new(
            format!("random-{n}-{}", self.seed),
            demands,
            cost_matrix,
            self.vehicle_capacity,
        )
    }
}
