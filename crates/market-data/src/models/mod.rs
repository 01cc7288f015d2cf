//! Market data models
//!
//! - `types` - Type aliases for common identifiers (Ticker)
//! - `quote` - Price data points returned by providers (SpotPrice, DailyPrice)

mod quote;
mod types;

pub use quote::{DailyPrice, SpotPrice};
pub use types::Ticker;
