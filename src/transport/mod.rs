// Transport module - upstream I/O plane
// This file wires the indexer and JSON-RPC clients used by the
// routing engine for all network reads
//
// Numan Thabit 2025 Nov

pub mod jsonrpc;
pub mod subgraph;

pub use jsonrpc::EvmRpc;
pub use subgraph::SubgraphClient;
