// Configuration management module
// This file handles loading of engine settings from environment variables
// and optional config files, and holds the per-chain registry of endpoints,
// contract addresses, base tokens and liquidity floors
//
// Numan Thabit 2025 Nov

use crate::errors::RouteError;
use alloy_primitives::{address, Address};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use url::Url;

/// Default bound on route length, in pools.
pub const DEFAULT_MAX_HOPS: usize = 4;

/// Multicall3 is deployed at the same address on every supported chain.
const MULTICALL3: Address = address!("cA11bde05977b3631167028862bE2a173976CA11");

/// Chains the engine can route on. A closed set: any other chain id is
/// rejected up front instead of being half-supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainId {
    Ethereum,
    Optimism,
    Bnb,
    Polygon,
    Base,
    Arbitrum,
}

impl ChainId {
    pub fn from_id(id: u64) -> Result<Self, RouteError> {
        match id {
            1 => Ok(Self::Ethereum),
            10 => Ok(Self::Optimism),
            56 => Ok(Self::Bnb),
            137 => Ok(Self::Polygon),
            8453 => Ok(Self::Base),
            42161 => Ok(Self::Arbitrum),
            other => Err(RouteError::UnsupportedChain(other)),
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            Self::Ethereum => 1,
            Self::Optimism => 10,
            Self::Bnb => 56,
            Self::Polygon => 137,
            Self::Base => 8453,
            Self::Arbitrum => 42161,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ethereum => "ethereum",
            Self::Optimism => "optimism",
            Self::Bnb => "bnb",
            Self::Polygon => "polygon",
            Self::Base => "base",
            Self::Arbitrum => "arbitrum",
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything the engine needs to know about one chain.
#[derive(Debug, Clone)]
pub struct ChainSettings {
    pub chain: ChainId,
    /// JSON-RPC endpoint for batched read calls
    pub rpc_url: Url,
    /// Indexer endpoint for constant-product pools
    pub v2_subgraph: Url,
    /// Indexer endpoint for concentrated-liquidity pools
    pub v3_subgraph: Url,
    /// Mixed-route quoter contract
    pub quoter: Address,
    /// Read-batching aggregator contract
    pub multicall: Address,
    /// Canonical high-liquidity tokens used to bridge multi-hop routes
    pub base_tokens: Vec<Address>,
    /// Minimum pool liquidity in USD
    pub min_liquidity_usd: f64,
}

fn ethereum_mainnet() -> ChainSettings {
    ChainSettings {
        chain: ChainId::Ethereum,
        rpc_url: Url::parse("https://eth.llamarpc.com").expect("valid default rpc url"),
        v2_subgraph: Url::parse("https://api.thegraph.com/subgraphs/name/uniswap/uniswap-v2")
            .expect("valid default v2 subgraph url"),
        v3_subgraph: Url::parse("https://api.thegraph.com/subgraphs/name/uniswap/uniswap-v3")
            .expect("valid default v3 subgraph url"),
        quoter: address!("84E44095eeBfEC7793Cd7d5b57B7e401D7f1cA2E"),
        multicall: MULTICALL3,
        base_tokens: vec![
            // WETH
            address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
            // USDC
            address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
            // USDT
            address!("dAC17F958D2ee523a2206206994597C13D831ec7"),
            // DAI
            address!("6B175474E89094C44Da98b954EedeAC495271d0F"),
            // WBTC
            address!("2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599"),
        ],
        min_liquidity_usd: 10_000.0,
    }
}

/// Per-chain lookup table. A request for a chain without an entry is a
/// configuration error, not an engine defect.
#[derive(Debug, Clone, Default)]
pub struct ChainRegistry {
    chains: HashMap<ChainId, ChainSettings>,
}

impl ChainRegistry {
    /// Registry preloaded with the built-in mainnet entry. Other chains
    /// must be supplied through configuration.
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        registry.insert(ethereum_mainnet());
        registry
    }

    pub fn insert(&mut self, settings: ChainSettings) {
        self.chains.insert(settings.chain, settings);
    }

    pub fn get(&self, chain: ChainId) -> Result<&ChainSettings, RouteError> {
        self.chains
            .get(&chain)
            .ok_or_else(|| RouteError::Config(format!("chain {chain} is not configured")))
    }

    /// Built-in entries merged with (and overridden by) configured ones.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let mut registry = Self::builtin();
        for entry in config.chains.as_deref().unwrap_or_default() {
            registry.insert(entry.parse()?);
        }
        Ok(registry)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Bound on route length in pools (APP__MAX_HOPS)
    pub max_hops: Option<usize>,
    /// Chain entries overriding or extending the built-in registry
    pub chains: Option<Vec<ChainEntry>>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name("router").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;
        Ok(cfg.try_deserialize()?)
    }

    pub fn max_hops(&self) -> usize {
        self.max_hops.unwrap_or(DEFAULT_MAX_HOPS)
    }
}

/// One chain as written in a config file.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainEntry {
    pub chain_id: u64,
    pub rpc_url: Url,
    pub v2_subgraph: Url,
    pub v3_subgraph: Url,
    pub quoter: String,
    /// Defaults to the canonical Multicall3 deployment when omitted
    pub multicall: Option<String>,
    pub base_tokens: Vec<String>,
    pub min_liquidity_usd: f64,
}

impl ChainEntry {
    fn parse(&self) -> Result<ChainSettings> {
        let chain = ChainId::from_id(self.chain_id)
            .with_context(|| format!("chain entry {}", self.chain_id))?;
        let quoter: Address = self
            .quoter
            .parse()
            .with_context(|| format!("invalid quoter address: {}", self.quoter))?;
        let multicall = match &self.multicall {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("invalid multicall address: {raw}"))?,
            None => MULTICALL3,
        };
        let mut base_tokens = Vec::with_capacity(self.base_tokens.len());
        for raw in &self.base_tokens {
            base_tokens.push(
                raw.parse::<Address>()
                    .with_context(|| format!("invalid base token address: {raw}"))?,
            );
        }
        Ok(ChainSettings {
            chain,
            rpc_url: self.rpc_url.clone(),
            v2_subgraph: self.v2_subgraph.clone(),
            v3_subgraph: self.v3_subgraph.clone(),
            quoter,
            multicall,
            base_tokens,
            min_liquidity_usd: self.min_liquidity_usd,
        })
    }
}
