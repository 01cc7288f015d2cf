//! Repository traits for users, portfolios and their performance series.
//!
//! These traits define the contract without any database-specific types,
//! allowing for different storage implementations.

use async_trait::async_trait;

use super::performance::{DatedPortfolioPerformance, HistoricalPortfolioPerformance};
use super::portfolio_model::{Portfolio, User};
use crate::errors::Result;

/// Read access to users.
pub trait UserRepositoryTrait: Send + Sync {
    /// Lists every user.
    fn all_users(&self) -> Result<Vec<User>>;
}

/// Portfolio persistence used by the performance pipeline.
#[async_trait]
pub trait PortfolioRepositoryTrait: Send + Sync {
    /// Lists a user's portfolios with their transactions loaded.
    fn all_portfolios(&self, user_id: &str) -> Result<Vec<Portfolio>>;

    /// Lists every ticker that appears in at least one transaction.
    fn all_tickers(&self) -> Result<Vec<String>>;

    /// Replaces the whole series of an existing historical performance.
    async fn update_historical_performance(
        &self,
        historical_performance_id: &str,
        performances: &[DatedPortfolioPerformance],
    ) -> Result<HistoricalPortfolioPerformance>;

    /// Creates the historical performance of a portfolio that has none yet.
    async fn create_historical_performance(
        &self,
        portfolio_id: &str,
        performances: &[DatedPortfolioPerformance],
    ) -> Result<HistoricalPortfolioPerformance>;
}
