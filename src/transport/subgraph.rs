// Pool indexer integration
// This file implements the GraphQL client for the pool indexer and the
// two per-generation pool queries the catalog is built from
//
// Numan Thabit 2025 Nov

use crate::errors::RouteError;
use crate::metrics::{REQ_ERRORS, REQ_LATENCY};
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;
use url::Url;

/// Indexer pages are capped at 1000 records per query.
const PAGE_SIZE: u32 = 1000;

/// GraphQL client for one pool indexer endpoint
#[derive(Clone)]
pub struct SubgraphClient {
    endpoint: Url,
    client: reqwest::Client,
}

impl SubgraphClient {
    pub fn new(endpoint: Url) -> Result<Self, RouteError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| RouteError::Indexer(format!("build subgraph http client: {e}")))?;

        Ok(Self { endpoint, client })
    }

    /// Execute a GraphQL query
    async fn execute_query<T: for<'de> Deserialize<'de>>(
        &self,
        query: &str,
        variables: serde_json::Value,
        operation_name: &str,
    ) -> Result<T, RouteError> {
        let _timer = REQ_LATENCY
            .with_label_values(&["subgraph", operation_name])
            .start_timer();

        let request_body = serde_json::json!({
            "query": query,
            "variables": variables,
            "operationName": operation_name,
        });

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request_body)
            .send()
            .await
            .map_err(|e| RouteError::Indexer(format!("send subgraph request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            REQ_ERRORS
                .with_label_values(&["subgraph", operation_name])
                .inc();
            return Err(RouteError::Indexer(format!(
                "subgraph request failed with status: {status}"
            )));
        }

        let response_body: GraphQLResponse<T> = response
            .json()
            .await
            .map_err(|e| RouteError::Indexer(format!("parse subgraph response JSON: {e}")))?;

        if let Some(errors) = &response_body.errors {
            REQ_ERRORS
                .with_label_values(&["subgraph", operation_name])
                .inc();
            warn!(
                operation = operation_name,
                errors = ?errors,
                "subgraph query returned errors"
            );
            return Err(RouteError::Indexer(format!(
                "subgraph errors: {}",
                errors
                    .iter()
                    .map(|e| e.message.clone())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        response_body
            .data
            .ok_or_else(|| RouteError::Indexer("missing subgraph response data".to_string()))
    }

    /// Constant-product pairs whose two sides are both in `tokens`,
    /// ordered by USD reserves descending.
    pub async fn v2_pairs(&self, tokens: &[String]) -> Result<Vec<PairRecord>, RouteError> {
        let query = r#"
            query V2Pairs($tokens: [String!], $first: Int!) {
                pairs(
                    first: $first,
                    orderBy: reserveUSD,
                    orderDirection: desc,
                    where: { token0_in: $tokens, token1_in: $tokens }
                ) {
                    id
                    token0 { id symbol name decimals }
                    token1 { id symbol name decimals }
                    reserve0
                    reserve1
                    reserveUSD
                }
            }
        "#;

        let variables = serde_json::json!({
            "tokens": tokens,
            "first": PAGE_SIZE,
        });

        let data: PairsData = self.execute_query(query, variables, "V2Pairs").await?;
        Ok(data.pairs)
    }

    /// Concentrated-liquidity pools whose two sides are both in `tokens`,
    /// ordered by USD TVL descending.
    pub async fn v3_pools(&self, tokens: &[String]) -> Result<Vec<PoolRecord>, RouteError> {
        let query = r#"
            query V3Pools($tokens: [String!], $first: Int!) {
                pools(
                    first: $first,
                    orderBy: totalValueLockedUSD,
                    orderDirection: desc,
                    where: { token0_in: $tokens, token1_in: $tokens }
                ) {
                    id
                    token0 { id symbol name decimals }
                    token1 { id symbol name decimals }
                    feeTier
                    liquidity
                    tick
                    totalValueLockedUSD
                }
            }
        "#;

        let variables = serde_json::json!({
            "tokens": tokens,
            "first": PAGE_SIZE,
        });

        let data: PoolsData = self.execute_query(query, variables, "V3Pools").await?;
        Ok(data.pools)
    }
}

// GraphQL response wrappers

#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)] // Part of GraphQL error response structure
struct GraphQLError {
    message: String,
    #[serde(default)]
    locations: Option<Vec<GraphQLLocation>>,
    #[serde(default)]
    path: Option<Vec<serde_json::Value>>,
}

#[allow(dead_code)] // Part of GraphQL error response structure
#[derive(Debug, Deserialize)]
struct GraphQLLocation {
    line: u32,
    column: u32,
}

#[derive(Debug, Deserialize)]
struct PairsData {
    pairs: Vec<PairRecord>,
}

#[derive(Debug, Deserialize)]
struct PoolsData {
    pools: Vec<PoolRecord>,
}

// Raw indexer records; numeric fields arrive as decimal strings

#[derive(Debug, Clone, Deserialize)]
pub struct TokenRecord {
    pub id: String,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub decimals: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairRecord {
    pub id: String,
    pub token0: TokenRecord,
    pub token1: TokenRecord,
    pub reserve0: Option<String>,
    pub reserve1: Option<String>,
    #[serde(rename = "reserveUSD")]
    pub reserve_usd: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolRecord {
    pub id: String,
    pub token0: TokenRecord,
    pub token1: TokenRecord,
    pub fee_tier: String,
    pub liquidity: Option<String>,
    /// Null for pools that have never been initialized
    pub tick: Option<String>,
    #[serde(rename = "totalValueLockedUSD")]
    pub total_value_locked_usd: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_record_deserializes_indexer_shape() {
        let body = r#"{
            "id": "0xb4e16d0168e52d35cacd2c6185b44281ec28c9dc",
            "token0": { "id": "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", "symbol": "USDC", "name": "USD Coin", "decimals": "6" },
            "token1": { "id": "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", "symbol": "WETH", "name": "Wrapped Ether", "decimals": "18" },
            "reserve0": "31278901.123",
            "reserve1": "9921.5",
            "reserveUSD": "62557802.25"
        }"#;
        let record: PairRecord = serde_json::from_str(body).unwrap();
        assert_eq!(record.token0.symbol.as_deref(), Some("USDC"));
        assert_eq!(record.reserve_usd.as_deref(), Some("62557802.25"));
    }

    #[test]
    fn pool_record_tolerates_null_tick() {
        let body = r#"{
            "id": "0x88e6a0c2ddd26feeb64f039a2c41296fcb3f5640",
            "token0": { "id": "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", "symbol": "USDC", "name": "USD Coin", "decimals": "6" },
            "token1": { "id": "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", "symbol": "WETH", "name": "Wrapped Ether", "decimals": "18" },
            "feeTier": "500",
            "liquidity": "27020497172813389732",
            "tick": null,
            "totalValueLockedUSD": "280544291.8"
        }"#;
        let record: PoolRecord = serde_json::from_str(body).unwrap();
        assert_eq!(record.fee_tier, "500");
        assert!(record.tick.is_none());
        assert_eq!(record.total_value_locked_usd.as_deref(), Some("280544291.8"));
    }
}
