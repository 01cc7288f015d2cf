//! Portfolio domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{CalculatorError, Result};

/// Owner of portfolios.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
}

/// A single purchase (or, with negative shares, a sale) of a ticker.
///
/// Transactions are never edited; deleting one removes it from every later
/// recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub ticker: String,
    pub purchase_date: NaiveDate,
    pub shares: Decimal,
    pub price_per_share: Decimal,
    pub fees: Decimal,
    pub currency: String,
    pub portfolio_id: String,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

impl Transaction {
    /// Cost basis including fees.
    pub fn cost(&self) -> Decimal {
        self.shares * self.price_per_share + self.fees
    }

    /// Whether the transaction counts towards a given calendar day.
    pub fn is_held_on(&self, date: NaiveDate) -> bool {
        self.purchase_date <= date
    }

    pub fn validate(&self) -> Result<()> {
        let reason = if self.ticker.trim().is_empty() {
            Some("ticker is empty")
        } else if self.price_per_share < Decimal::ZERO {
            Some("price per share is negative")
        } else if self.fees < Decimal::ZERO {
            Some("fees are negative")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(CalculatorError::InvalidTransaction {
                transaction_id: self.id.clone(),
                reason: reason.to_string(),
            }
            .into()),
            None => Ok(()),
        }
    }
}

/// A user's portfolio with its transactions loaded.
///
/// Owns at most one historical performance series, referenced by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub currency: String,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub historical_performance_id: Option<String>,
}

impl Portfolio {
    /// Purchase date of the earliest transaction.
    pub fn earliest_transaction_date(&self) -> Option<NaiveDate> {
        self.transactions.iter().map(|t| t.purchase_date).min()
    }

    /// Distinct tickers traded in this portfolio, sorted.
    pub fn tickers(&self) -> Vec<String> {
        let mut tickers: Vec<String> = self.transactions.iter().map(|t| t.ticker.clone()).collect();
        tickers.sort();
        tickers.dedup();
        tickers
    }
}
