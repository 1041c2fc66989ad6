//! Risk statistics: per-symbol mean return, population standard deviation
//! and Sharpe ratio over percent changes.
//!
//! Every statistic is a pure function over a slice of returns. The
//! aggregator only groups values by symbol before calling them.

use std::collections::BTreeMap;

use crate::domain::{ExtendedRecord, SymbolStats};

/// Groups percent changes by symbol. Input order is irrelevant; output is
/// sorted by symbol (byte-wise), one entry per distinct symbol.
#[derive(Debug, Default)]
pub struct SymbolStatsAggregator {
    returns: BTreeMap<String, Vec<f64>>,
}

impl SymbolStatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: &ExtendedRecord) {
        self.push_return(&record.symbol, record.price_change_percent);
    }

    pub fn push_return(&mut self, symbol: &str, value: f64) {
        match self.returns.get_mut(symbol) {
            Some(values) => values.push(value),
            None => {
                self.returns.insert(symbol.to_string(), vec![value]);
            }
        }
    }

    pub fn symbol_count(&self) -> usize {
        self.returns.len()
    }

    pub fn finish(self) -> Vec<SymbolStats> {
        self.returns
            .into_iter()
            .map(|(symbol, values)| SymbolStats::from_returns(symbol, &values))
            .collect()
    }
}

impl SymbolStats {
    /// Summarize one symbol's return series.
    ///
    /// A series of identical values has exactly zero deviation and a zero
    /// Sharpe ratio, even when summing it would leave a rounding residue.
    pub fn from_returns(symbol: impl Into<String>, returns: &[f64]) -> Self {
        if let Some(&first) = returns.first() {
            if returns.iter().all(|v| v.to_bits() == first.to_bits()) {
                return Self {
                    symbol: symbol.into(),
                    average_return: first,
                    std_deviation: 0.0,
                    sharpe_ratio: 0.0,
                };
            }
        }

        let average_return = mean(returns);
        let std_deviation = population_std_dev(returns, average_return);
        Self {
            symbol: symbol.into(),
            average_return,
            std_deviation,
            sharpe_ratio: sharpe_ratio(average_return, std_deviation),
        }
    }
}

/// Batch form over any sequence of extended records.
pub fn compute_symbol_statistics<'a, I>(records: I) -> Vec<SymbolStats>
where
    I: IntoIterator<Item = &'a ExtendedRecord>,
{
    let mut agg = SymbolStatsAggregator::new();
    for record in records {
        agg.push(record);
    }
    agg.finish()
}

// ─── Individual statistic functions ─────────────────────────────────

/// Arithmetic mean. 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation around a precomputed mean
/// (divisor = count, not count - 1). 0.0 for an empty slice.
pub fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance =
        values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Mean return over standard deviation, no risk-free rate.
///
/// Returns 0.0 when the deviation is exactly zero.
pub fn sharpe_ratio(mean: f64, std_deviation: f64) -> f64 {
    if std_deviation == 0.0 {
        return 0.0;
    }
    mean / std_deviation
}
