// Batch quoter
// Encodes candidate routes as mixed-route byte paths and simulates all
// of them in one aggregated read call; also batches the ERC-20 metadata
// lookups for the swap pair
//
// Numan Thabit 2025 Nov

use crate::errors::RouteError;
use crate::metrics::QUOTE_DROPS;
use crate::pools::Token;
use crate::router::routes::{Route, RouteQuote};
use crate::transport::EvmRpc;
use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};
use tracing::{debug, warn};

sol! {
    interface IMulticall3 {
        struct Call {
            address target;
            bytes callData;
        }

        struct Result {
            bool success;
            bytes returnData;
        }

        function tryAggregate(bool requireSuccess, Call[] calldata calls)
            external
            payable
            returns (Result[] memory returnData);
    }

    interface IMixedRouteQuoterV1 {
        function quoteExactInput(bytes path, uint256 amountIn)
            external
            returns (
                uint256 amountOut,
                uint160[] v3SqrtPriceX96AfterList,
                uint32[] v3InitializedTicksCrossedList,
                uint256 gasEstimate
            );
    }

    interface IERC20Metadata {
        function symbol() external view returns (string);
        function name() external view returns (string);
        function decimals() external view returns (uint8);
    }
}

/// Binary mixed-route path: for each hop the 20-byte current token
/// followed by the pool's 3-byte fee marker, closed by the final token.
/// `None` for a route whose path and pools disagree.
pub fn encode_path(route: &Route) -> Option<Vec<u8>> {
    if route.pools.is_empty() || route.path.len() != route.pools.len() + 1 {
        return None;
    }
    let mut path = Vec::with_capacity(route.path.len() * 20 + route.pools.len() * 3);
    for (i, pool) in route.pools.iter().enumerate() {
        path.extend_from_slice(route.path[i].as_slice());
        path.extend_from_slice(&pool.fee_marker());
    }
    path.extend_from_slice(route.path[route.pools.len()].as_slice());
    Some(path)
}

/// Read-side client for the quoter contract, always going through the
/// aggregator so a request costs one round trip regardless of how many
/// routes it evaluates.
pub struct BatchQuoter {
    rpc: EvmRpc,
    multicall: Address,
    quoter: Address,
}

impl BatchQuoter {
    pub fn new(rpc: EvmRpc, multicall: Address, quoter: Address) -> Self {
        Self {
            rpc,
            multicall,
            quoter,
        }
    }

    /// Simulate the exact-input swap on every route in one aggregated
    /// call. A route whose sub-call reverts or returns an undecodable
    /// blob is dropped; the rest of the batch stands.
    #[tracing::instrument(skip_all, fields(routes = routes.len()))]
    pub async fn quote_routes(
        &self,
        routes: Vec<Route>,
        amount_in: U256,
    ) -> Result<Vec<RouteQuote>, RouteError> {
        let mut calls = Vec::with_capacity(routes.len());
        let mut encoded = Vec::with_capacity(routes.len());
        for route in routes {
            let Some(path) = encode_path(&route) else {
                warn!(hops = route.hops(), "skipping malformed route");
                continue;
            };
            let calldata = IMixedRouteQuoterV1::quoteExactInputCall {
                path: path.into(),
                amountIn: amount_in,
            }
            .abi_encode();
            calls.push(IMulticall3::Call {
                target: self.quoter,
                callData: calldata.into(),
            });
            encoded.push(route);
        }
        if calls.is_empty() {
            return Ok(Vec::new());
        }
        debug!(calls = calls.len(), "issuing aggregated quote call");
        let results = self.try_aggregate(calls).await?;
        Ok(decode_quotes(encoded, results))
    }

    /// On-chain ERC-20 metadata for `tokens`. A token whose sub-call
    /// reverts or misdecodes keeps `None` for that field; non-standard
    /// tokens must not fail the quote.
    pub async fn token_metadata(&self, tokens: &[Address]) -> Result<Vec<Token>, RouteError> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }
        let mut calls = Vec::with_capacity(tokens.len() * 3);
        for &token in tokens {
            calls.push(IMulticall3::Call {
                target: token,
                callData: IERC20Metadata::symbolCall {}.abi_encode().into(),
            });
            calls.push(IMulticall3::Call {
                target: token,
                callData: IERC20Metadata::nameCall {}.abi_encode().into(),
            });
            calls.push(IMulticall3::Call {
                target: token,
                callData: IERC20Metadata::decimalsCall {}.abi_encode().into(),
            });
        }
        let results = self.try_aggregate(calls).await?;
        let tokens = tokens
            .iter()
            .zip(results.chunks(3))
            .map(|(&address, chunk)| Token {
                address,
                symbol: decode_if_ok::<IERC20Metadata::symbolCall>(&chunk[0]),
                name: decode_if_ok::<IERC20Metadata::nameCall>(&chunk[1]),
                decimals: decode_if_ok::<IERC20Metadata::decimalsCall>(&chunk[2]),
            })
            .collect();
        Ok(tokens)
    }

    async fn try_aggregate(
        &self,
        calls: Vec<IMulticall3::Call>,
    ) -> Result<Vec<IMulticall3::Result>, RouteError> {
        let expected = calls.len();
        let payload = IMulticall3::tryAggregateCall {
            requireSuccess: false,
            calls,
        }
        .abi_encode();
        let raw = self.rpc.eth_call(self.multicall, &payload).await?;
        let results = IMulticall3::tryAggregateCall::abi_decode_returns(&raw)
            .map_err(|err| RouteError::Rpc(format!("decode aggregated response: {err}")))?;
        if results.len() != expected {
            return Err(RouteError::Rpc(format!(
                "aggregated response carries {} results for {} calls",
                results.len(),
                expected
            )));
        }
        Ok(results)
    }
}

fn decode_if_ok<C: SolCall>(result: &IMulticall3::Result) -> Option<C::Return> {
    if !result.success {
        return None;
    }
    C::abi_decode_returns(&result.returnData).ok()
}

/// Pair each route with its positional result, dropping failures.
fn decode_quotes(routes: Vec<Route>, results: Vec<IMulticall3::Result>) -> Vec<RouteQuote> {
    let mut quotes = Vec::with_capacity(routes.len());
    for (route, result) in routes.into_iter().zip(results) {
        if !result.success {
            QUOTE_DROPS.with_label_values(&["reverted"]).inc();
            debug!(hops = route.hops(), "quote sub-call reverted, dropping route");
            continue;
        }
        match IMixedRouteQuoterV1::quoteExactInputCall::abi_decode_returns(&result.returnData) {
            Ok(ret) => quotes.push(RouteQuote {
                route,
                amount_out: ret.amountOut,
                gas_estimate: ret.gasEstimate,
            }),
            Err(err) => {
                QUOTE_DROPS.with_label_values(&["undecodable"]).inc();
                debug!(error = %err, hops = route.hops(), "undecodable quote blob, dropping route");
            }
        }
    }
    quotes
}
