// Router module - routing and quoting plane
// This file wires the route search, batch quoting and selection policy
// into the pipeline facade
//
// Numan Thabit 2025 Nov

pub mod builder;
pub mod quoter;
pub mod routes;
pub mod selector;

#[allow(clippy::module_inception)]
pub mod router;

pub use builder::RouteBuilder;
pub use quoter::{encode_path, BatchQuoter};
pub use router::{Router, SwapQuote};
pub use routes::{Route, RouteQuote};
pub use selector::select_best_quote;
