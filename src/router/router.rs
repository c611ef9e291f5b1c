// Router facade
// Ties the pipeline together: pool catalog, candidate buckets, route
// search, batched quoting and the selection policy
//
// Numan Thabit 2025 Nov

use crate::config::{ChainId, ChainRegistry};
use crate::errors::RouteError;
use crate::metrics::ROUTES_DISCOVERED;
use crate::pools::{select_candidates, PoolCatalog, Token};
use crate::router::builder::RouteBuilder;
use crate::router::quoter::BatchQuoter;
use crate::router::routes::{Route, RouteQuote};
use crate::router::selector::select_best_quote;
use crate::transport::EvmRpc;
use alloy_primitives::{Address, U256};
use serde::Serialize;
use tracing::debug;

/// Stateless facade over the quoting pipeline. Every call reads fresh
/// upstream data; nothing is cached or shared across requests.
pub struct Router {
    registry: ChainRegistry,
    max_hops: usize,
}

impl Router {
    pub fn new(registry: ChainRegistry, max_hops: usize) -> Self {
        Self { registry, max_hops }
    }

    /// The winning route with its simulated output and gas estimate.
    #[tracing::instrument(skip_all, fields(chain = %chain, token_in = %token_in, token_out = %token_out))]
    pub async fn best_route(
        &self,
        chain: ChainId,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<RouteQuote, RouteError> {
        let (quoter, routes) = self.prepare(chain, token_in, token_out).await?;
        let quotes = quoter.quote_routes(routes, amount_in).await?;
        select_best_quote(quotes).ok_or(RouteError::NoRoute)
    }

    /// Full quote envelope including the swap pair's on-chain metadata.
    /// The quote batch and the metadata lookups run concurrently.
    #[tracing::instrument(skip_all, fields(chain = %chain, token_in = %token_in, token_out = %token_out))]
    pub async fn quote(
        &self,
        chain: ChainId,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<SwapQuote, RouteError> {
        let (quoter, routes) = self.prepare(chain, token_in, token_out).await?;
        let pair = [token_in, token_out];
        let (quotes, metadata) = futures::try_join!(
            quoter.quote_routes(routes, amount_in),
            quoter.token_metadata(&pair),
        )?;
        let best = select_best_quote(quotes).ok_or(RouteError::NoRoute)?;
        let mut metadata = metadata.into_iter();
        let src_token = metadata.next().unwrap_or_else(|| Token::bare(token_in));
        let dst_token = metadata.next().unwrap_or_else(|| Token::bare(token_out));
        Ok(SwapQuote {
            provider: "uniswap",
            chain_id: chain.id(),
            src_token,
            dst_token,
            from_amount: amount_in.to_string(),
            dst_amount: best.amount_out.to_string(),
            gas: best.gas_estimate.to_string(),
            protocols: vec![best.route],
        })
    }

    /// Shared discovery stage: catalog fetch, candidate buckets, route
    /// search. Fails with `NoRoute` when the search comes back empty.
    async fn prepare(
        &self,
        chain: ChainId,
        token_in: Address,
        token_out: Address,
    ) -> Result<(BatchQuoter, Vec<Route>), RouteError> {
        let settings = self.registry.get(chain)?;
        let catalog = PoolCatalog::new(settings)?;
        let pools = catalog
            .fetch(token_in, token_out, &settings.base_tokens)
            .await?;
        let candidates = select_candidates(
            &pools,
            token_in,
            token_out,
            &settings.base_tokens,
            settings.min_liquidity_usd,
        );
        let routes = RouteBuilder::new(self.max_hops).build(&candidates.all(), token_in, token_out);
        ROUTES_DISCOVERED.observe(routes.len() as f64);
        debug!(
            pools = pools.len(),
            candidates = candidates.len(),
            routes = routes.len(),
            "prepared candidate routes"
        );
        if routes.is_empty() {
            return Err(RouteError::NoRoute);
        }
        let rpc = EvmRpc::new(settings.rpc_url.clone());
        Ok((
            BatchQuoter::new(rpc, settings.multicall, settings.quoter),
            routes,
        ))
    }
}

/// Quote envelope returned to the calling layer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapQuote {
    pub provider: &'static str,
    pub chain_id: u64,
    pub src_token: Token,
    pub dst_token: Token,
    pub from_amount: String,
    pub dst_amount: String,
    pub gas: String,
    pub protocols: Vec<Route>,
}
