// Route types
// Multi-hop route and per-route quote shapes produced by the search
// and consumed by the selection policy
//
// Numan Thabit 2025 Nov

use crate::pools::Pool;
use alloy_primitives::{Address, U256};
use serde::Serialize;

/// An ordered multi-hop path: `pools[i]` connects `path[i]` to
/// `path[i + 1]`, so `path` is always one longer than `pools`.
#[derive(Debug, Clone, Serialize)]
pub struct Route {
    pub path: Vec<Address>,
    pub pools: Vec<Pool>,
}

impl Route {
    pub fn hops(&self) -> usize {
        self.pools.len()
    }

    /// Summed USD liquidity across the route, the discovery-order metric.
    pub fn liquidity_sum(&self) -> f64 {
        self.pools.iter().map(|pool| pool.liquidity_usd()).sum()
    }

    /// Sum of log10 of each pool's USD liquidity. Pools reporting under
    /// one dollar are clamped so the term never goes negative.
    pub fn liquidity_score(&self) -> f64 {
        self.pools
            .iter()
            .map(|pool| pool.liquidity_usd().max(1.0).log10())
            .sum()
    }
}

/// One route's simulated outcome
#[derive(Debug, Clone)]
pub struct RouteQuote {
    pub route: Route,
    pub amount_out: U256,
    pub gas_estimate: U256,
}

impl RouteQuote {
    pub fn liquidity_score(&self) -> f64 {
        self.route.liquidity_score()
    }
}
