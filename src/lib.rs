// Library root module for swap-router
// This file defines the public API and module structure for the swap-router library
// It exports the main functionality that can be used by other crates
//
// Numan Thabit 2025 Nov

pub mod config;
pub mod errors;
pub mod metrics;
pub mod pools;
pub mod router;
pub mod transport;
