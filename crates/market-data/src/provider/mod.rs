//! Market data provider abstractions and implementations.
//!
//! This module contains:
//! - The `PriceProvider` trait the performance pipeline fetches prices through
//! - Concrete provider implementations (Alpha Vantage)
//!
//! Providers are deliberately unthrottled; callers share a
//! [`RateLimiter`](crate::rate_limiter::RateLimiter) in front of them.

mod traits;

pub mod alpha_vantage;

pub use traits::PriceProvider;
