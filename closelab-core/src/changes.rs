//! Change calculator: per-record price delta against the symbol's
//! previous observation in file order.
//!
//! "Previous" is defined by arrival order, not by date. The last-price map
//! belongs to one calculator instance; a fresh pass needs a fresh instance.

use std::collections::HashMap;

use crate::domain::{ExtendedRecord, Record};

/// Streaming change calculator.
#[derive(Debug, Default)]
pub struct PriceChangeCalculator {
    last_prices: HashMap<String, f64>,
}

impl PriceChangeCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extend one record and remember its closing price for the symbol.
    ///
    /// The first occurrence of a symbol yields `(0, 0)`. The stored price is
    /// overwritten on every call, whichever branch was taken.
    pub fn push(&mut self, record: Record) -> ExtendedRecord {
        let previous = self
            .last_prices
            .insert(record.symbol.clone(), record.closing_price);

        let (change, percent) = match previous {
            Some(last) => {
                let change = record.closing_price - last;
                (change, price_change_percent(change, last))
            }
            None => (0.0, 0.0),
        };

        record.extend(change, percent)
    }

    /// Number of distinct symbols observed so far.
    pub fn symbols_seen(&self) -> usize {
        self.last_prices.len()
    }
}

/// Percent change relative to `reference`; 0 when the reference is exactly 0.
pub fn price_change_percent(change: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        return 0.0;
    }
    (change / reference) * 100.0
}

/// Batch form: same length and order as the input.
pub fn compute_changes<I>(records: I) -> Vec<ExtendedRecord>
where
    I: IntoIterator<Item = Record>,
{
    let mut calc = PriceChangeCalculator::new();
    records.into_iter().map(|r| calc.push(r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(date: &str, symbol: &str, close: f64) -> Record {
        Record::new(date, symbol, close)
    }

    #[test]
    fn first_occurrence_is_zero() {
        let out = compute_changes(vec![rec("2020-06-01", "AAA", 100.0)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].price_change, 0.0);
        assert_eq!(out[0].price_change_percent, 0.0);
    }

    #[test]
    fn two_symbols_interleaved() {
        let out = compute_changes(vec![
            rec("2020-06-01", "AAA", 100.0),
            rec("2020-06-02", "AAA", 110.0),
            rec("2020-06-01", "BBB", 50.0),
            rec("2020-06-02", "BBB", 45.0),
        ]);
        let pairs: Vec<(f64, f64)> = out
            .iter()
            .map(|r| (r.price_change, r.price_change_percent))
            .collect();
        assert_eq!(pairs, vec![(0.0, 0.0), (10.0, 10.0), (0.0, 0.0), (-5.0, -10.0)]);
    }

    #[test]
    fn previous_is_file_order_not_date_order() {
        // Second row is earlier by date but later in the file.
        let out = compute_changes(vec![
            rec("2020-06-05", "AAA", 120.0),
            rec("2020-06-01", "AAA", 100.0),
        ]);
        assert_eq!(out[1].price_change, -20.0);
        let expected = (-20.0 / 120.0) * 100.0;
        assert_eq!(out[1].price_change_percent, expected);
    }

    #[test]
    fn zero_reference_price_gives_zero_percent() {
        let out = compute_changes(vec![
            rec("2020-06-01", "ZZZ", 0.0),
            rec("2020-06-02", "ZZZ", 5.0),
        ]);
        assert_eq!(out[1].price_change, 5.0);
        assert_eq!(out[1].price_change_percent, 0.0);
    }

    #[test]
    fn last_price_overwritten_after_zero() {
        let out = compute_changes(vec![
            rec("2020-06-01", "ZZZ", 0.0),
            rec("2020-06-02", "ZZZ", 4.0),
            rec("2020-06-03", "ZZZ", 5.0),
        ]);
        assert_eq!(out[2].price_change, 1.0);
        assert_eq!(out[2].price_change_percent, 25.0);
    }

    #[test]
    fn symbols_are_case_sensitive() {
        let mut calc = PriceChangeCalculator::new();
        calc.push(rec("2020-06-01", "aaa", 10.0));
        let upper = calc.push(rec("2020-06-02", "AAA", 20.0));
        assert_eq!(upper.price_change, 0.0);
        assert_eq!(calc.symbols_seen(), 2);
    }

    #[test]
    fn fresh_calculator_has_no_memory() {
        let first = compute_changes(vec![rec("2020-06-01", "AAA", 100.0)]);
        let second = compute_changes(vec![rec("2020-06-02", "AAA", 110.0)]);
        assert_eq!(first[0].price_change, 0.0);
        assert_eq!(second[0].price_change, 0.0);
    }

    #[test]
    fn empty_input() {
        assert!(compute_changes(Vec::<Record>::new()).is_empty());
    }

    #[test]
    fn percent_helper() {
        assert_eq!(price_change_percent(10.0, 100.0), 10.0);
        assert_eq!(price_change_percent(-5.0, 50.0), -10.0);
        assert_eq!(price_change_percent(7.0, 0.0), 0.0);
        assert_eq!(price_change_percent(7.0, -0.0), 0.0);
    }
}
