// Pool domain model
// This file defines the token and pool types shared by the catalog,
// candidate selection and route search, and the parsing of raw
// indexer records into them
//
// Numan Thabit 2025 Nov

pub mod candidates;
pub mod catalog;

pub use candidates::{select_candidates, CandidatePools};
pub use catalog::PoolCatalog;

use crate::transport::subgraph::{PairRecord, PoolRecord, TokenRecord};
use alloy_primitives::Address;
use serde::Serialize;

/// Token identity plus whatever metadata the indexer or chain reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub address: Address,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub decimals: Option<u8>,
}

impl Token {
    pub fn bare(address: Address) -> Self {
        Self {
            address,
            symbol: None,
            name: None,
            decimals: None,
        }
    }

    fn from_record(record: &TokenRecord) -> Option<Self> {
        Some(Self {
            address: record.id.parse().ok()?,
            symbol: record.symbol.clone(),
            name: record.name.clone(),
            decimals: record.decimals.as_deref().and_then(|d| d.parse().ok()),
        })
    }
}

/// A liquidity venue between exactly two tokens
#[derive(Debug, Clone, Serialize)]
pub struct Pool {
    pub id: String,
    pub token0: Token,
    pub token1: Token,
    #[serde(flatten)]
    pub kind: PoolKind,
}

/// Protocol generation, each variant carrying only its own fields
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum PoolKind {
    V2 {
        reserve0: f64,
        reserve1: f64,
        reserve_usd: f64,
    },
    V3 {
        fee_tier: u32,
        liquidity: u128,
        /// None for pools that have never been initialized
        tick: Option<i32>,
        total_value_locked_usd: f64,
    },
}

impl Pool {
    /// USD liquidity metric: reserves for v2, TVL for v3.
    pub fn liquidity_usd(&self) -> f64 {
        match &self.kind {
            PoolKind::V2 { reserve_usd, .. } => *reserve_usd,
            PoolKind::V3 {
                total_value_locked_usd,
                ..
            } => *total_value_locked_usd,
        }
    }

    pub fn involves(&self, token: Address) -> bool {
        self.token0.address == token || self.token1.address == token
    }

    /// The other side of the pool relative to `token`.
    pub fn counterpart(&self, token: Address) -> Option<Address> {
        if self.token0.address == token {
            Some(self.token1.address)
        } else if self.token1.address == token {
            Some(self.token0.address)
        } else {
            None
        }
    }

    /// 3-byte fee marker for the binary path encoding: v2 hops use the
    /// fixed sentinel 0x800000, v3 hops the fee tier big-endian.
    pub fn fee_marker(&self) -> [u8; 3] {
        match &self.kind {
            PoolKind::V2 { .. } => [0x80, 0x00, 0x00],
            PoolKind::V3 { fee_tier, .. } => [
                (fee_tier >> 16) as u8,
                (fee_tier >> 8) as u8,
                *fee_tier as u8,
            ],
        }
    }

    /// Normalize a raw pair record. Unparseable addresses fail the whole
    /// record; missing numeric fields default to zero and are left to the
    /// liquidity filter.
    pub fn from_pair_record(record: &PairRecord) -> Option<Self> {
        let number =
            |field: &Option<String>| field.as_deref().and_then(|v| v.parse().ok()).unwrap_or(0.0);
        Some(Self {
            id: record.id.clone(),
            token0: Token::from_record(&record.token0)?,
            token1: Token::from_record(&record.token1)?,
            kind: PoolKind::V2 {
                reserve0: number(&record.reserve0),
                reserve1: number(&record.reserve1),
                reserve_usd: number(&record.reserve_usd),
            },
        })
    }

    /// Normalize a raw v3 pool record, same conventions as
    /// [`Pool::from_pair_record`]. A missing or malformed tick stays
    /// `None` and marks the pool inactive.
    pub fn from_pool_record(record: &PoolRecord) -> Option<Self> {
        Some(Self {
            id: record.id.clone(),
            token0: Token::from_record(&record.token0)?,
            token1: Token::from_record(&record.token1)?,
            kind: PoolKind::V3 {
                fee_tier: record.fee_tier.parse().ok()?,
                liquidity: record
                    .liquidity
                    .as_deref()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0),
                tick: record.tick.as_deref().and_then(|v| v.parse().ok()),
                total_value_locked_usd: record
                    .total_value_locked_usd
                    .as_deref()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0.0),
            },
        })
    }
}
