//! Portfolios, their transactions, and the performance pipeline built on them.

pub mod performance;
pub mod portfolio_model;
pub mod portfolio_traits;

pub use portfolio_model::{Portfolio, Transaction, User};
pub use portfolio_traits::{PortfolioRepositoryTrait, UserRepositoryTrait};
