//! Record types shared by every transform.

use serde::{Deserialize, Serialize};

/// One closing-price observation for a single symbol on a single day.
///
/// `date` is kept as text. Every ordering in the crate compares it
/// byte-wise, which matches calendar order for ISO `YYYY-MM-DD` dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub date: String,
    pub symbol: String,
    pub closing_price: f64,
}

impl Record {
    pub fn new(date: impl Into<String>, symbol: impl Into<String>, closing_price: f64) -> Self {
        Self {
            date: date.into(),
            symbol: symbol.into(),
            closing_price,
        }
    }

    /// Promote this record by attaching its change against the symbol's
    /// previous observation.
    pub fn extend(self, price_change: f64, price_change_percent: f64) -> ExtendedRecord {
        ExtendedRecord {
            date: self.date,
            symbol: self.symbol,
            closing_price: self.closing_price,
            price_change,
            price_change_percent,
        }
    }
}

/// A record plus its price change relative to the previous observation of
/// the same symbol. `price_change_percent` is in percentage units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendedRecord {
    pub date: String,
    pub symbol: String,
    pub closing_price: f64,
    pub price_change: f64,
    pub price_change_percent: f64,
}

impl ExtendedRecord {
    /// Magnitude of the move, the top-K ranking key.
    pub fn abs_change(&self) -> f64 {
        self.price_change.abs()
    }

    /// Drop the derived fields.
    pub fn base(&self) -> Record {
        Record::new(self.date.clone(), self.symbol.clone(), self.closing_price)
    }
}

/// Risk-adjusted return summary for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolStats {
    pub symbol: String,
    pub average_return: f64,
    /// Population standard deviation (divisor = count).
    pub std_deviation: f64,
    /// `average_return / std_deviation`, 0 when the deviation is exactly 0.
    pub sharpe_ratio: f64,
}
