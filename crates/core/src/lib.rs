//! Stockfolio Core - portfolio performance pipeline.
//!
//! Turns each portfolio's transaction history into a daily series of
//! invested capital and market value. Prices come from a live provider
//! (see `stockfolio-market-data`) behind a shared rate limiter and a TTL
//! quote cache.
//!
//! Persistence is abstracted behind the traits in [`quotes::store`] and
//! [`portfolio::portfolio_traits`]; storage crates implement them.

pub mod config;
pub mod context;
pub mod errors;
pub mod portfolio;
pub mod quotes;
pub mod scheduler;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use config::{PerformanceConfig, TickerFailurePolicy};
pub use context::PerformanceContext;
pub use portfolio::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
