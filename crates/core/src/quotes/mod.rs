//! Quote management module.
//!
//! - [`model`] - Cached spot quotes and daily series
//! - [`store`] - Storage trait for the quote cache
//! - [`service`] - Live and cached price services
//!
//! ```text
//! CachedPriceService → QuoteStore (cache)
//!        ↓ miss / expired
//! LivePriceService → RateLimiter → PriceProvider (market-data crate)
//! ```

pub mod model;
pub mod service;
pub mod store;


pub use model::{HistoricalQuote, Quote};
pub use service::{CachedPriceService, LivePriceService, PriceServiceTrait};
pub use store::QuoteStore;
