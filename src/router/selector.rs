// Route selection policy
// Folds the quote batch into a single winner: a materially larger
// output wins outright, near-ties fall through liquidity, gas and
// hop-count comparisons
//
// Numan Thabit 2025 Nov

use crate::router::routes::RouteQuote;
use alloy_primitives::U256;
use std::cmp::Ordering;
use tracing::info;

/// Outputs within one part in a thousand of each other count as tied.
const OUTPUT_TIE_DENOMINATOR: u64 = 1000;

/// Pick the winning quote. Quotes are considered strictly left to right
/// against the incumbent, so identical input always yields the same
/// winner. `None` when no quote decoded to a positive output.
pub fn select_best_quote(quotes: Vec<RouteQuote>) -> Option<RouteQuote> {
    let mut valid = quotes.into_iter().filter(|q| q.amount_out > U256::ZERO);
    let first = valid.next()?;
    let best = valid.fold(first, |best, challenger| {
        if displaces(&challenger, &best) {
            challenger
        } else {
            best
        }
    });
    info!(
        amount_out = %best.amount_out,
        gas_estimate = %best.gas_estimate,
        hops = best.route.hops(),
        liquidity_score = best.liquidity_score(),
        "selected best route"
    );
    Some(best)
}

/// Asymmetric pairwise policy: the challenger displaces the incumbent
/// only on a materially larger output or on one of the tie-breaks.
fn displaces(challenger: &RouteQuote, best: &RouteQuote) -> bool {
    if differs_materially(challenger.amount_out, best.amount_out) {
        return challenger.amount_out > best.amount_out;
    }
    // Outputs are effectively tied from here down.
    if challenger.liquidity_score() > best.liquidity_score() * 1.2 {
        return true;
    }
    // NOTE: this awards the tie to the route whose gas estimate is more
    // than 30% HIGHER. The direction is suspect but load-bearing:
    // flipping it changes winner selection for near-tied quotes.
    if scaled_cmp(challenger.gas_estimate, best.gas_estimate, 13, 10) == Ordering::Greater {
        return true;
    }
    challenger.route.hops() < best.route.hops()
        && scaled_cmp(challenger.gas_estimate, best.gas_estimate, 19, 20) == Ordering::Less
}

/// True when the outputs differ by at least 0.1% of the incumbent.
/// Saturation only fires for astronomically different amounts, which
/// are decisive anyway.
fn differs_materially(challenger: U256, best: U256) -> bool {
    challenger
        .abs_diff(best)
        .saturating_mul(U256::from(OUTPUT_TIE_DENOMINATOR))
        >= best
}

/// Compare `a` against `b * num / den` without dividing.
fn scaled_cmp(a: U256, b: U256, num: u64, den: u64) -> Ordering {
    a.saturating_mul(U256::from(den))
        .cmp(&b.saturating_mul(U256::from(num)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pools::{Pool, PoolKind, Token};
    use crate::router::routes::Route;
    use alloy_primitives::Address;

    fn pool(id: &str, usd: f64) -> Pool {
        Pool {
            id: id.to_string(),
            token0: Token::bare(Address::repeat_byte(1)),
            token1: Token::bare(Address::repeat_byte(2)),
            kind: PoolKind::V2 {
                reserve0: 1.0,
                reserve1: 1.0,
                reserve_usd: usd,
            },
        }
    }

    /// One pool per hop, each at `pool_usd`, so the liquidity score is
    /// hops * log10(pool_usd).
    fn quote(tag: &str, amount_out: u64, gas: u64, hops: usize, pool_usd: f64) -> RouteQuote {
        let pools: Vec<Pool> = (0..hops)
            .map(|i| pool(&format!("{tag}-{i}"), pool_usd))
            .collect();
        let path = (0..=hops as u8).map(Address::repeat_byte).collect();
        RouteQuote {
            route: Route { path, pools },
            amount_out: U256::from(amount_out),
            gas_estimate: U256::from(gas),
        }
    }

    fn winner_tag(quotes: Vec<RouteQuote>) -> String {
        let best = select_best_quote(quotes).expect("a winner");
        best.route.pools[0].id.clone()
    }

    #[test]
    fn empty_batch_yields_none() {
        assert!(select_best_quote(Vec::new()).is_none());
    }

    #[test]
    fn zero_output_quotes_are_discarded() {
        let quotes = vec![
            quote("a", 0, 100, 1, 10_000.0),
            quote("b", 0, 100, 1, 10_000.0),
        ];
        assert!(select_best_quote(quotes).is_none());
    }

    #[test]
    fn materially_larger_output_wins_from_either_side() {
        let small = || quote("small", 1_000_000, 100, 1, 10_000.0);
        let big = || quote("big", 1_002_000, 100, 1, 10_000.0);
        assert_eq!(winner_tag(vec![small(), big()]), "big-0");
        assert_eq!(winner_tag(vec![big(), small()]), "big-0");
    }

    #[test]
    fn output_difference_threshold_is_one_per_mille() {
        // 1000 over 1_000_000 is exactly 0.1%: decisive
        let base = || quote("base", 1_000_000, 100, 1, 10_000.0);
        let at_edge = quote("edge", 1_001_000, 100, 1, 10_000.0);
        assert_eq!(winner_tag(vec![base(), at_edge]), "edge-0");
        // 999 over 1_000_000 is under the threshold: tied, and with no
        // tie-break firing the incumbent stays
        let under_edge = quote("under", 1_000_999, 100, 1, 10_000.0);
        assert_eq!(winner_tag(vec![base(), under_edge]), "base-0");
    }

    #[test]
    fn near_tie_prefers_markedly_deeper_liquidity() {
        // 0.05% apart; the deep route's score 10 beats 8 by 25%
        let shallow = quote("shallow", 1_000_500, 100, 2, 10_000.0);
        let deep = quote("deep", 1_000_000, 100, 2, 100_000.0);
        assert_eq!(winner_tag(vec![shallow.clone(), deep.clone()]), "deep-0");
        // And as the incumbent the deep route is kept
        assert_eq!(winner_tag(vec![deep, shallow]), "deep-0");
    }

    #[test]
    fn near_tie_awards_the_higher_gas_estimate() {
        let frugal = || quote("frugal", 1_000_000, 100_000, 2, 10_000.0);
        let hungry = || quote("hungry", 1_000_200, 140_000, 2, 10_000.0);
        // Challenger with 40% more gas displaces the incumbent
        assert_eq!(winner_tag(vec![frugal(), hungry()]), "hungry-0");
        // As incumbent it survives: the frugal challenger fires no rule
        assert_eq!(winner_tag(vec![hungry(), frugal()]), "hungry-0");
    }

    #[test]
    fn gas_within_thirty_percent_does_not_displace() {
        let base = quote("base", 1_000_000, 100_000, 2, 10_000.0);
        let slightly_hungry = quote("warm", 1_000_100, 125_000, 2, 10_000.0);
        assert_eq!(winner_tag(vec![base, slightly_hungry]), "base-0");
    }

    #[test]
    fn fewer_hops_with_cheaper_gas_displaces() {
        // Same pool depth per hop keeps liquidity scores within 1.2x
        let long = quote("long", 1_000_000, 100_000, 2, 10_000.0);
        let short = quote("short", 1_000_100, 90_000, 1, 10_000.0);
        assert_eq!(winner_tag(vec![long, short]), "short-0");
    }

    #[test]
    fn fewer_hops_alone_is_not_enough() {
        // 98k gas is above the 95% bar, so the short route stays behind
        let long = quote("long", 1_000_000, 100_000, 2, 10_000.0);
        let short = quote("short", 1_000_100, 98_000, 1, 10_000.0);
        assert_eq!(winner_tag(vec![long, short]), "long-0");
    }

    #[test]
    fn fold_is_deterministic_over_identical_input() {
        let batch = || {
            vec![
                quote("a", 1_000_000, 100_000, 2, 10_000.0),
                quote("b", 1_000_400, 110_000, 1, 10_000.0),
                quote("c", 1_000_200, 150_000, 3, 100_000.0),
                quote("d", 999_900, 90_000, 1, 10_000.0),
            ]
        };
        assert_eq!(winner_tag(batch()), winner_tag(batch()));
    }

    #[test]
    fn slightly_better_output_loses_to_much_deeper_route() {
        // 0.05% more output but a quarter of the liquidity depth: the
        // deep incumbent is kept
        let deep = quote("deep", 1_000_000, 150_000, 2, 100_000.0);
        let thin = quote("thin", 1_000_500, 150_000, 2, 10_000.0);
        assert_eq!(winner_tag(vec![deep, thin]), "deep-0");
    }
}
