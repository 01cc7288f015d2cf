pub mod performance_calculator;
pub mod performance_model;
pub mod performance_updater;
pub mod price_cache;


pub use performance_calculator::calculate_performance;
pub use performance_model::*;
pub use performance_updater::{PerformanceUpdater, PerformanceUpdaterTrait, UpdateSummary};
pub use price_cache::TickerPriceCache;
