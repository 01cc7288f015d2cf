//! Stockfolio Market Data Crate
//!
//! Provider access for the portfolio performance pipeline:
//! - [`PriceProvider`] - the live spot/daily-series capability
//! - [`AlphaVantageProvider`] - HTTP implementation against Alpha Vantage
//! - [`RateLimiter`] - sliding-window limiter shared by every external fetch
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+     +------------------+
//! |  Price service   | --> |   RateLimiter    | --> |  PriceProvider   |
//! |  (core crate)    |     | (sliding window) |     | (Alpha Vantage)  |
//! +------------------+     +------------------+     +------------------+
//! ```

pub mod errors;
pub mod models;
pub mod provider;
pub mod rate_limiter;

pub use errors::MarketDataError;
pub use models::{DailyPrice, SpotPrice, Ticker};
pub use provider::alpha_vantage::{AlphaVantageProvider, OutputSize};
pub use provider::PriceProvider;
pub use rate_limiter::{RateLimiter, DEFAULT_WINDOW};
