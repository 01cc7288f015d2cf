//! Core error types for the performance pipeline.
//!
//! This module defines storage-agnostic error types. Storage crates convert
//! their own errors into [`DatabaseError`] before handing them back.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use stockfolio_market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the performance pipeline.
///
/// Nothing inside the calculator or updater converts one of these into a
/// default value; they bubble up to whoever triggered the run.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Invalid price {price} for {ticker}")]
    InvalidPrice { ticker: String, price: Decimal },

    #[error("Performance calculation failed: {0}")]
    Calculation(#[from] CalculatorError),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Missing configuration key: {0}")]
    MissingConfigKey(String),

    #[error("Performance update was cancelled")]
    Cancelled,

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Storage-agnostic error type for cache and repository operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a connection to the store.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// A query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A write was rejected by the store.
    #[error("Database write failed: {0}")]
    WriteFailed(String),

    /// Internal/unexpected storage error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Errors that occur while computing a performance series.
#[derive(Error, Debug)]
pub enum CalculatorError {
    #[error("Invalid transaction {transaction_id}: {reason}")]
    InvalidTransaction {
        transaction_id: String,
        reason: String,
    },

    #[error("No price available for {ticker} on {date}")]
    MissingPrice { ticker: String, date: NaiveDate },
}

impl Error {
    /// Builds the error for a price that is zero or negative.
    pub fn invalid_price(ticker: impl Into<String>, price: Decimal) -> Self {
        Error::InvalidPrice {
            ticker: ticker.into(),
            price,
        }
    }
}
