// Pool catalog
// Fetches both pool generations from the indexer for a swap pair,
// normalizes the raw records and applies the per-generation
// liquidity rules
//
// Numan Thabit 2025 Nov

use crate::config::ChainSettings;
use crate::errors::RouteError;
use crate::pools::{Pool, PoolKind};
use crate::transport::SubgraphClient;
use alloy_primitives::Address;
use std::cmp::Ordering;
use tracing::debug;

/// Concentrated-liquidity TVL overstates tradeable depth, so v3 pools
/// clear a stricter USD bar than v2 pools.
const V3_TVL_MULTIPLIER: f64 = 2.0;

pub struct PoolCatalog {
    v2: SubgraphClient,
    v3: SubgraphClient,
    min_liquidity_usd: f64,
}

impl PoolCatalog {
    pub fn new(settings: &ChainSettings) -> Result<Self, RouteError> {
        Ok(Self {
            v2: SubgraphClient::new(settings.v2_subgraph.clone())?,
            v3: SubgraphClient::new(settings.v3_subgraph.clone())?,
            min_liquidity_usd: settings.min_liquidity_usd,
        })
    }

    /// All usable pools connecting the swap pair and the chain's base
    /// tokens, sorted ready for candidate selection. Both generations are
    /// queried concurrently.
    #[tracing::instrument(skip_all)]
    pub async fn fetch(
        &self,
        token_in: Address,
        token_out: Address,
        base_tokens: &[Address],
    ) -> Result<Vec<Pool>, RouteError> {
        let tokens = candidate_tokens(token_in, token_out, base_tokens);
        let (pairs, v3_pools) =
            futures::try_join!(self.v2.v2_pairs(&tokens), self.v3.v3_pools(&tokens))?;
        debug!(v2 = pairs.len(), v3 = v3_pools.len(), "fetched pool records");

        let mut pools: Vec<Pool> = pairs
            .iter()
            .filter_map(Pool::from_pair_record)
            .chain(v3_pools.iter().filter_map(Pool::from_pool_record))
            .collect();
        pools.retain(|pool| usable(pool, self.min_liquidity_usd));
        sort_by_liquidity(&mut pools, self.min_liquidity_usd);
        debug!(pools = pools.len(), "catalog ready");
        Ok(pools)
    }
}

/// Lowercase hex address strings for the indexer where-clause: the swap
/// pair first, then the chain's base tokens, deduplicated.
fn candidate_tokens(token_in: Address, token_out: Address, base_tokens: &[Address]) -> Vec<String> {
    let mut tokens = vec![token_in, token_out];
    for &base in base_tokens {
        if !tokens.contains(&base) {
            tokens.push(base);
        }
    }
    tokens.iter().map(|token| format!("{token:#x}")).collect()
}

/// Per-generation liquidity rules. A v2 pool needs both reserves non-zero
/// and USD reserves at the chain floor; a v3 pool needs non-zero in-range
/// liquidity, a defined tick and TVL at twice the floor.
pub(crate) fn usable(pool: &Pool, min_liquidity_usd: f64) -> bool {
    match &pool.kind {
        PoolKind::V2 {
            reserve0,
            reserve1,
            reserve_usd,
        } => *reserve_usd >= min_liquidity_usd && *reserve0 > 0.0 && *reserve1 > 0.0,
        PoolKind::V3 {
            liquidity,
            tick,
            total_value_locked_usd,
            ..
        } => {
            *liquidity > 0
                && tick.is_some()
                && *total_value_locked_usd >= min_liquidity_usd * V3_TVL_MULTIPLIER
        }
    }
}

/// Descending USD liquidity. v3 pools within one chain floor of each
/// other are materially equivalent and order by ascending fee tier
/// instead, so the cheaper tier is tried first. The fee reorder runs as
/// a second pass over adjacent runs; folding it into one comparator
/// would not be a total order.
pub(crate) fn sort_by_liquidity(pools: &mut [Pool], min_liquidity_usd: f64) {
    pools.sort_by(|a, b| {
        b.liquidity_usd()
            .partial_cmp(&a.liquidity_usd())
            .unwrap_or(Ordering::Equal)
    });
    let mut start = 0;
    while start < pools.len() {
        let mut end = start;
        while end + 1 < pools.len()
            && near_tied_v3(&pools[end], &pools[end + 1], min_liquidity_usd)
        {
            end += 1;
        }
        if end > start {
            pools[start..=end].sort_by_key(|pool| match &pool.kind {
                PoolKind::V3 { fee_tier, .. } => *fee_tier,
                PoolKind::V2 { .. } => 0,
            });
        }
        start = end + 1;
    }
}

fn near_tied_v3(a: &Pool, b: &Pool, min_liquidity_usd: f64) -> bool {
    matches!(&a.kind, PoolKind::V3 { .. })
        && matches!(&b.kind, PoolKind::V3 { .. })
        && (a.liquidity_usd() - b.liquidity_usd()).abs() < min_liquidity_usd
}
