// Route builder
// Depth-bounded search over the candidate pool set, enumerating every
// viable multi-hop route between the swap pair
//
// Numan Thabit 2025 Nov

use crate::pools::Pool;
use crate::router::routes::Route;
use alloy_primitives::Address;
use std::cmp::Ordering;
use tracing::debug;

pub struct RouteBuilder {
    max_hops: usize,
}

impl RouteBuilder {
    pub fn new(max_hops: usize) -> Self {
        Self { max_hops }
    }

    /// Enumerate routes from `token_in` to `token_out` at most `max_hops`
    /// pools long, never reusing a pool within one route. Pools are
    /// explored highest-liquidity first so the deepest paths are
    /// discovered first, and the result is sorted by summed pool
    /// liquidity, highest first.
    pub fn build(&self, candidates: &[Pool], token_in: Address, token_out: Address) -> Vec<Route> {
        let mut pools = candidates.to_vec();
        pools.sort_by(|a, b| {
            b.liquidity_usd()
                .partial_cmp(&a.liquidity_usd())
                .unwrap_or(Ordering::Equal)
        });

        let mut search = Search {
            pools: &pools,
            token_out,
            max_hops: self.max_hops,
            token_path: Vec::with_capacity(self.max_hops + 1),
            pool_path: Vec::with_capacity(self.max_hops),
            routes: Vec::new(),
        };
        search.token_path.push(token_in);
        search.descend(token_in);

        let mut routes = search.routes;
        routes.sort_by(|a, b| {
            b.liquidity_sum()
                .partial_cmp(&a.liquidity_sum())
                .unwrap_or(Ordering::Equal)
        });
        debug!(routes = routes.len(), max_hops = self.max_hops, "route search complete");
        routes
    }
}

struct Search<'a> {
    pools: &'a [Pool],
    token_out: Address,
    max_hops: usize,
    token_path: Vec<Address>,
    pool_path: Vec<usize>,
    routes: Vec<Route>,
}

impl Search<'_> {
    /// The path itself is the visited set: pool indices are pushed on
    /// descent and popped on backtrack, so sibling branches never see
    /// each other's state.
    fn descend(&mut self, current: Address) {
        if current == self.token_out && !self.pool_path.is_empty() {
            self.routes.push(Route {
                path: self.token_path.clone(),
                pools: self.pool_path.iter().map(|&i| self.pools[i].clone()).collect(),
            });
            return;
        }
        if self.pool_path.len() >= self.max_hops {
            return;
        }

        let final_hop = self.pool_path.len() + 1 == self.max_hops;
        for index in 0..self.pools.len() {
            let pool = &self.pools[index];
            if self.pool_path.iter().any(|&used| self.pools[used].id == pool.id) {
                continue;
            }
            let Some(next) = pool.counterpart(current) else {
                continue;
            };
            if final_hop && next != self.token_out {
                continue;
            }
            self.token_path.push(next);
            self.pool_path.push(index);
            self.descend(next);
            self.pool_path.pop();
            self.token_path.pop();
        }
    }
}
