// Error types and error handling module
// This file defines the error taxonomy for the routing engine
// and the transient/terminal split callers map onto retry policy
//
// Numan Thabit 2025 Nov

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("unsupported chain id: {0}")]
    UnsupportedChain(u64),
    #[error("chain configuration error: {0}")]
    Config(String),
    #[error("indexer error: {0}")]
    Indexer(String),
    #[error("rpc error: {0}")]
    Rpc(String),
    #[error("no viable route")]
    NoRoute,
}

impl RouteError {
    /// Upstream network failures are retryable by the caller; the engine
    /// itself never retries.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Indexer(_) | Self::Rpc(_))
    }
}
