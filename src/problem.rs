//! Problem definition: the symmetric cost matrix, the demand vector and the
//! vehicle limits every search strategy reads.

use crate::error::{Error, Result};
use petgraph::algo::connected_components;
use petgraph::graph::UnGraph;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Read;
use std::path::Path;

/// Identifier of a stop, in `[0, N)`.
pub type Stop = usize;

/// The fixed start and end stop of every route.
pub const DEPOT: Stop = 0;

/// Cost-matrix value meaning "no direct connection". Never a free edge.
pub const NO_EDGE: u32 = 0;

/// Capacity used by the text loader when none is given.
pub const DEFAULT_CAPACITY: u32 = 15;

/// A CVRP instance: demands, symmetric costs and the limits a route must respect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub name: String,
    /// Demand per stop, indexed by stop id. The depot entry is always zero.
    pub demands: Vec<u32>,
    /// `N×N` symmetric cost table; `NO_EDGE` marks an absent connection.
    pub cost_matrix: Vec<Vec<u32>>,
    /// Maximum load carried between two depot visits.
    pub vehicle_capacity: u32,
    /// Optional bound on the length of a repaired route, depot visits included.
    pub max_stops: Option<usize>,
    /// Optional ceiling on the total cost of a route.
    pub max_cost: Option<u64>,
}

impl Problem {
    /// Create a new problem, checking the shape of the matrix and the depot demand.
    pub fn new(
        name: String,
        demands: Vec<u32>,
        cost_matrix: Vec<Vec<u32>>,
        vehicle_capacity: u32,
    ) -> Result<Self> {
        let n = demands.len();

        if n < 2 {
            return Err(Error::invalid_input(format!(
                "an instance needs the depot and at least one stop, found {n} stops"
            )));
        }
        if demands[DEPOT] != 0 {
            return Err(Error::invalid_input(format!(
                "depot demand must be 0, found {}",
                demands[DEPOT]
            )));
        }
        if cost_matrix.len() != n || cost_matrix.iter().any(|row| row.len() != n) {
            return Err(Error::invalid_input(format!(
                "cost matrix must be {n}x{n} to match the demand vector"
            )));
        }
        for i in 0..n {
            for j in (i + 1)..n {
                if cost_matrix[i][j] != cost_matrix[j][i] {
                    return Err(Error::invalid_input(format!(
                        "cost matrix is not symmetric at ({i}, {j}): {} != {}",
                        cost_matrix[i][j], cost_matrix[j][i]
                    )));
                }
            }
        }

        Ok(Problem {
            name,
            demands,
            cost_matrix,
            vehicle_capacity,
            max_stops: None,
            max_cost: None,
        })
    }

    /// Build a problem from undirected `(source, destination, cost)` triples.
    /// Pairs that are not listed keep the `NO_EDGE` sentinel.
    pub fn from_edges(
        name: String,
        demands: Vec<u32>,
        edges: &[(Stop, Stop, u32)],
        vehicle_capacity: u32,
    ) -> Result<Self> {
        let n = demands.len();
        let mut cost_matrix = vec![vec![NO_EDGE; n]; n];

        for &(u, v, cost) in edges {
            if u >= n || v >= n {
                return Err(Error::invalid_input(format!(
                    "edge ({u}, {v}) references a stop outside [0, {n})"
                )));
            }
            cost_matrix[u][v] = cost;
            cost_matrix[v][u] = cost;
        }

        Problem::new(name, demands, cost_matrix, vehicle_capacity)
    }

    /// Set the maximum route length.
    pub fn with_max_stops(mut self, max_stops: usize) -> Self {
        self.max_stops = Some(max_stops);
        self
    }

    /// Set the cost ceiling.
    pub fn with_max_cost(mut self, max_cost: u64) -> Self {
        self.max_cost = Some(max_cost);
        self
    }

    /// Number of stops, depot included.
    pub fn stop_count(&self) -> usize {
        self.demands.len()
    }

    /// Number of stops excluding the depot.
    pub fn customer_count(&self) -> usize {
        self.demands.len() - 1
    }

    /// Cost of the direct edge, or `None` when the pair is not connected.
    pub fn cost(&self, from: Stop, to: Stop) -> Option<u32> {
        match self.cost_matrix[from][to] {
            NO_EDGE => None,
            cost => Some(cost),
        }
    }

    /// Demand of a stop.
    pub fn demand(&self, stop: Stop) -> u32 {
        self.demands[stop]
    }

    /// Whether every stop can reach every other one over existing edges.
    ///
    /// A route walks through all stops over real edges, so a disconnected
    /// instance has no feasible route whatever the capacity.
    pub fn is_connected(&self) -> bool {
        let n = self.stop_count();
        let mut graph = UnGraph::<Stop, u32>::with_capacity(n, n * (n - 1) / 2);
        let nodes: Vec<_> = (0..n).map(|stop| graph.add_node(stop)).collect();

        for i in 0..n {
            for j in (i + 1)..n {
                if let Some(cost) = self.cost(i, j) {
                    graph.add_edge(nodes[i], nodes[j], cost);
                }
            }
        }

        connected_components(&graph) == 1
    }

    /// Load a problem from a file in the stop/demand/edge text format.
    pub fn from_file<P: AsRef<Path>>(path: P, vehicle_capacity: u32) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "instance".to_string());
        let file = fs::File::open(path)?;

        Self::parse(file, name, vehicle_capacity)
    }

    /// Parse the text format:
    ///
    /// ```text
    /// N              # stops including the depot
    /// stop demand    # N-1 lines
    /// K              # number of edges
    /// u v cost       # K lines, undirected
    /// ```
    pub fn parse<R: Read>(mut reader: R, name: String, vehicle_capacity: u32) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        let mut tokens = Tokens::new(&text);

        let n = tokens.next_usize("stop count")?;
        if n < 2 {
            return Err(Error::invalid_input(format!(
                "stop count must include the depot and at least one stop, found {n}"
            )));
        }

        let mut demands = vec![0u32; n];
        for _ in 1..n {
            let stop = tokens.next_usize("stop id")?;
            let demand = tokens.next_u32("demand")?;
            if stop == DEPOT || stop >= n {
                return Err(Error::invalid_input(format!(
                    "demand line references stop {stop}, expected 1..{n}"
                )));
            }
            demands[stop] = demand;
        }

        let edge_count = tokens.next_usize("edge count")?;
        let mut edges = Vec::with_capacity(edge_count);
        for _ in 0..edge_count {
            let u = tokens.next_usize("edge source")?;
            let v = tokens.next_usize("edge destination")?;
            let cost = tokens.next_u32("edge cost")?;
            edges.push((u, v, cost));
        }

        log::debug!(
            "problem: parsed name={name} stops={n} edges={edge_count} capacity={vehicle_capacity}"
        );

        Problem::from_edges(name, demands, &edges, vehicle_capacity)
    }
}

/// Whitespace tokenizer that reports which field was missing or malformed.
struct Tokens<'a> {
    inner: std::str::SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Tokens {
            inner: text.split_whitespace(),
        }
    }

    fn next_token(&mut self, what: &str) -> Result<&'a str> {
        self.inner
            .next()
            .ok_or_else(|| Error::invalid_input(format!("unexpected end of input reading {what}")))
    }

    fn next_usize(&mut self, what: &str) -> Result<usize> {
        let token = self.next_token(what)?;
        token
            .parse()
            .map_err(|_| Error::invalid_input(format!("{what}: '{token}' is not a valid index")))
    }

    fn next_u32(&mut self, what: &str) -> Result<u32> {
        let token = self.next_token(what)?;
        token.parse().map_err(|_| {
            Error::invalid_input(format!("{what}: '{token}' is not a non-negative integer"))
        })
    }
}
