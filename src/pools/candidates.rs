// Candidate pool selection
// Partitions the filtered pool set into capped priority buckets so the
// route search runs over a bounded working set
//
// Numan Thabit 2025 Nov

use crate::pools::Pool;
use alloy_primitives::Address;
use std::collections::HashSet;
use tracing::debug;

const DIRECT_CAP: usize = 2;
const BASE_LINK_CAP: usize = 5;
const TOP_TVL_CAP: usize = 5;
const TOKEN_TVL_CAP: usize = 3;
const SECOND_HOPS_PER_POOL: usize = 2;

/// Heavily traded pools qualify for the overall-TVL bucket even when
/// they touch neither side of the swap pair.
const TOP_TVL_MULTIPLIER: f64 = 3.0;

/// One request's working set, partitioned in fixed priority order.
/// Every pool appears in at most one bucket.
#[derive(Debug, Clone, Default)]
pub struct CandidatePools {
    pub direct_swap: Vec<Pool>,
    pub base_with_token_in: Vec<Pool>,
    pub base_with_token_out: Vec<Pool>,
    pub top_by_tvl: Vec<Pool>,
    pub tvl_using_token_in: Vec<Pool>,
    pub tvl_using_token_out: Vec<Pool>,
    pub second_hop_from_token_in: Vec<Pool>,
    pub second_hop_to_token_out: Vec<Pool>,
}

impl CandidatePools {
    /// Union of all buckets in priority order.
    pub fn all(&self) -> Vec<Pool> {
        let mut pools = Vec::with_capacity(self.len());
        for bucket in self.buckets() {
            pools.extend(bucket.iter().cloned());
        }
        pools
    }

    pub fn len(&self) -> usize {
        self.buckets().iter().map(|bucket| bucket.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn buckets(&self) -> [&Vec<Pool>; 8] {
        [
            &self.direct_swap,
            &self.base_with_token_in,
            &self.base_with_token_out,
            &self.top_by_tvl,
            &self.tvl_using_token_in,
            &self.tvl_using_token_out,
            &self.second_hop_from_token_in,
            &self.second_hop_to_token_out,
        ]
    }
}

/// Partition `pools` into the eight priority buckets. The slice must
/// already be sorted descending by liquidity, so each bucket takes the
/// most liquid matches up to its cap. Assignment is first-match-wins:
/// a pool claimed by one bucket is invisible to every later rule.
pub fn select_candidates(
    pools: &[Pool],
    token_in: Address,
    token_out: Address,
    base_tokens: &[Address],
    min_liquidity_usd: f64,
) -> CandidatePools {
    let mut taken: HashSet<&str> = HashSet::new();
    let links_base = |pool: &Pool, token: Address| {
        pool.involves(token) && base_tokens.iter().any(|&base| pool.involves(base))
    };

    let direct_swap = take(pools, &mut taken, DIRECT_CAP, |pool| {
        pool.involves(token_in) && pool.involves(token_out)
    });
    let base_with_token_in = take(pools, &mut taken, BASE_LINK_CAP, |pool| {
        links_base(pool, token_in)
    });
    let base_with_token_out = take(pools, &mut taken, BASE_LINK_CAP, |pool| {
        links_base(pool, token_out)
    });
    let top_by_tvl = take(pools, &mut taken, TOP_TVL_CAP, |pool| {
        pool.liquidity_usd() >= min_liquidity_usd * TOP_TVL_MULTIPLIER
    });
    let tvl_using_token_in = take(pools, &mut taken, TOKEN_TVL_CAP, |pool| {
        pool.involves(token_in)
    });
    let tvl_using_token_out = take(pools, &mut taken, TOKEN_TVL_CAP, |pool| {
        pool.involves(token_out)
    });
    let second_hop_from_token_in = second_hops(pools, &mut taken, &tvl_using_token_in, token_in);
    let second_hop_to_token_out = second_hops(pools, &mut taken, &tvl_using_token_out, token_out);

    let selected = CandidatePools {
        direct_swap,
        base_with_token_in,
        base_with_token_out,
        top_by_tvl,
        tvl_using_token_in,
        tvl_using_token_out,
        second_hop_from_token_in,
        second_hop_to_token_out,
    };
    debug!(
        direct = selected.direct_swap.len(),
        base_in = selected.base_with_token_in.len(),
        base_out = selected.base_with_token_out.len(),
        top_tvl = selected.top_by_tvl.len(),
        tvl_in = selected.tvl_using_token_in.len(),
        tvl_out = selected.tvl_using_token_out.len(),
        second_in = selected.second_hop_from_token_in.len(),
        second_out = selected.second_hop_to_token_out.len(),
        total = selected.len(),
        "partitioned candidate pools"
    );
    selected
}

fn take<'a>(
    pools: &'a [Pool],
    taken: &mut HashSet<&'a str>,
    cap: usize,
    matches: impl Fn(&Pool) -> bool,
) -> Vec<Pool> {
    let mut bucket = Vec::new();
    for pool in pools {
        if bucket.len() == cap {
            break;
        }
        if taken.contains(pool.id.as_str()) || !matches(pool) {
            continue;
        }
        taken.insert(&pool.id);
        bucket.push(pool.clone());
    }
    bucket
}

/// For each first-hop pool, up to two onward pools containing the token
/// on the far side of that hop.
fn second_hops<'a>(
    pools: &'a [Pool],
    taken: &mut HashSet<&'a str>,
    first_hops: &[Pool],
    token: Address,
) -> Vec<Pool> {
    let mut bucket = Vec::new();
    for hop in first_hops {
        let Some(far_side) = hop.counterpart(token) else {
            continue;
        };
        let mut added = 0;
        for pool in pools {
            if added == SECOND_HOPS_PER_POOL {
                break;
            }
            if taken.contains(pool.id.as_str()) || !pool.involves(far_side) {
                continue;
            }
            taken.insert(&pool.id);
            bucket.push(pool.clone());
            added += 1;
        }
    }
    bucket
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pools::{PoolKind, Token};

    const FLOOR: f64 = 10_000.0;

    const TOKEN_IN: u8 = 0x11;
    const TOKEN_OUT: u8 = 0x22;
    const BASE: u8 = 0xBB;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    fn v2(id: &str, a: u8, b: u8, usd: f64) -> Pool {
        Pool {
            id: id.to_string(),
            token0: Token::bare(addr(a)),
            token1: Token::bare(addr(b)),
            kind: PoolKind::V2 {
                reserve0: 100.0,
                reserve1: 100.0,
                reserve_usd: usd,
            },
        }
    }

    fn select(pools: &[Pool]) -> CandidatePools {
        select_candidates(pools, addr(TOKEN_IN), addr(TOKEN_OUT), &[addr(BASE)], FLOOR)
    }

    #[test]
    fn direct_bucket_keeps_the_two_most_liquid() {
        // Pre-sorted descending, as the catalog hands them over
        let pools = vec![
            v2("direct-big", TOKEN_IN, TOKEN_OUT, 900_000.0),
            v2("direct-mid", TOKEN_IN, TOKEN_OUT, 500_000.0),
            v2("direct-small", TOKEN_IN, TOKEN_OUT, 100_000.0),
        ];
        let selected = select(&pools);
        let ids: Vec<&str> = selected.direct_swap.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["direct-big", "direct-mid"]);
        // The third direct pool still matches bucket 4 (>= 3x floor)
        assert_eq!(selected.top_by_tvl.len(), 1);
    }

    #[test]
    fn every_pool_lands_in_at_most_one_bucket() {
        let pools = vec![
            v2("direct", TOKEN_IN, TOKEN_OUT, 900_000.0),
            v2("in-base", TOKEN_IN, BASE, 800_000.0),
            v2("out-base", TOKEN_OUT, BASE, 700_000.0),
            v2("whale", 0x77, 0x88, 600_000.0),
        ];
        let selected = select(&pools);
        let all = selected.all();
        let mut ids: Vec<&str> = all.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(all.len(), selected.len());
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), all.len());
        // The direct pool involves token_in but was claimed by bucket 1
        assert!(selected.tvl_using_token_in.iter().all(|p| p.id != "direct"));
    }

    #[test]
    fn union_preserves_priority_order() {
        let pools = vec![
            v2("in-base", TOKEN_IN, BASE, 900_000.0),
            v2("direct", TOKEN_IN, TOKEN_OUT, 50_000.0),
        ];
        let selected = select(&pools);
        let all = selected.all();
        let ids: Vec<&str> = all.iter().map(|p| p.id.as_str()).collect();
        // Direct bucket comes first even though the base-link pool is bigger
        assert_eq!(ids, ["direct", "in-base"]);
    }

    #[test]
    fn top_tvl_bucket_requires_triple_the_floor() {
        let pools = vec![
            v2("whale", 0x77, 0x88, 31_000.0),
            v2("minnow", 0x77, 0x99, 29_000.0),
        ];
        let selected = select(&pools);
        let ids: Vec<&str> = selected.top_by_tvl.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["whale"]);
        assert!(selected.all().iter().all(|p| p.id != "minnow"));
    }

    #[test]
    fn second_hops_expand_the_far_side_token() {
        // token_in trades only against 0x33; three onward pools carry 0x33
        let pools = vec![
            v2("first-hop", TOKEN_IN, 0x33, 20_000.0),
            v2("onward-1", 0x33, 0x44, 18_000.0),
            v2("onward-2", 0x33, 0x55, 16_000.0),
            v2("onward-3", 0x33, 0x66, 14_000.0),
        ];
        let selected = select(&pools);
        assert_eq!(selected.tvl_using_token_in.len(), 1);
        let ids: Vec<&str> = selected
            .second_hop_from_token_in
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        // Capped at two onward pools per first-hop pool
        assert_eq!(ids, ["onward-1", "onward-2"]);
    }

    #[test]
    fn below_floor_pools_never_reach_a_bucket() {
        let mut pools = vec![
            v2("direct-thin", TOKEN_IN, TOKEN_OUT, 5_000.0),
            v2("in-base", TOKEN_IN, BASE, 40_000.0),
            v2("out-base", TOKEN_OUT, BASE, 35_000.0),
        ];
        pools.retain(|pool| crate::pools::catalog::usable(pool, FLOOR));
        let selected = select(&pools);
        // The thin direct pool is gone before selection, so the direct
        // bucket is empty and the base-link buckets carry the flow
        assert!(selected.direct_swap.is_empty());
        assert_eq!(selected.base_with_token_in.len(), 1);
        assert_eq!(selected.base_with_token_out.len(), 1);
    }

    #[test]
    fn zero_liquidity_v3_pool_is_unusable_everywhere() {
        let dead = Pool {
            id: "dead".to_string(),
            token0: Token::bare(addr(TOKEN_IN)),
            token1: Token::bare(addr(TOKEN_OUT)),
            kind: PoolKind::V3 {
                fee_tier: 3000,
                liquidity: 0,
                tick: Some(0),
                total_value_locked_usd: 5_000_000.0,
            },
        };
        let mut pools = vec![dead, v2("live", TOKEN_IN, TOKEN_OUT, 60_000.0)];
        pools.retain(|pool| crate::pools::catalog::usable(pool, FLOOR));
        let selected = select(&pools);
        assert!(selected.all().iter().all(|p| p.id != "dead"));
        assert_eq!(selected.direct_swap.len(), 1);
    }
}
