//! Ranking sorter: total order over extended records.
//!
//! Primary key: date, descending, compared byte-wise.
//! Secondary key: percent change, descending.
//! Requires the full input in memory.

use std::cmp::Ordering;

use crate::domain::ExtendedRecord;

/// Comparator for the ranking order. `Less` means `a` comes first.
///
/// Percent changes are compared with `f64::total_cmp`, so a NaN read from
/// a hand-edited file sorts deterministically instead of poisoning the sort.
pub fn ranking_order(a: &ExtendedRecord, b: &ExtendedRecord) -> Ordering {
    b.date
        .cmp(&a.date)
        .then_with(|| b.price_change_percent.total_cmp(&a.price_change_percent))
}

/// Sort in place. Stable: records equal on both keys keep input order.
pub fn sort_by_date_and_change(records: &mut [ExtendedRecord]) {
    records.sort_by(ranking_order);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Record;

    fn ext(date: &str, symbol: &str, pct: f64) -> ExtendedRecord {
        Record::new(date, symbol, 100.0).extend(pct, pct)
    }

    fn symbols(records: &[ExtendedRecord]) -> Vec<&str> {
        records.iter().map(|r| r.symbol.as_str()).collect()
    }

    #[test]
    fn newest_date_first_then_largest_gain() {
        let mut records = vec![
            ext("2020-06-01", "AAA", 0.0),
            ext("2020-06-02", "AAA", 10.0),
            ext("2020-06-01", "BBB", 0.0),
            ext("2020-06-02", "BBB", -10.0),
        ];
        sort_by_date_and_change(&mut records);
        let order: Vec<(&str, &str)> = records
            .iter()
            .map(|r| (r.date.as_str(), r.symbol.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("2020-06-02", "AAA"),
                ("2020-06-02", "BBB"),
                ("2020-06-01", "AAA"),
                ("2020-06-01", "BBB"),
            ]
        );
    }

    #[test]
    fn full_ties_keep_input_order() {
        let mut records = vec![
            ext("2020-06-01", "CCC", 1.5),
            ext("2020-06-01", "AAA", 1.5),
            ext("2020-06-01", "BBB", 1.5),
        ];
        sort_by_date_and_change(&mut records);
        assert_eq!(symbols(&records), vec!["CCC", "AAA", "BBB"]);
    }

    #[test]
    fn dates_compare_lexically() {
        // Non-padded dates sort as strings, not as calendar dates.
        let mut records = vec![ext("2020-6-9", "A", 0.0), ext("2020-6-10", "B", 0.0)];
        sort_by_date_and_change(&mut records);
        assert_eq!(symbols(&records), vec!["A", "B"]);
    }

    #[test]
    fn nan_percent_does_not_panic() {
        let mut records = vec![
            ext("2020-06-01", "A", 1.0),
            ext("2020-06-01", "N", f64::NAN),
            ext("2020-06-01", "B", 2.0),
        ];
        sort_by_date_and_change(&mut records);
        assert_eq!(records.len(), 3);
        // total_cmp puts positive NaN above every number.
        assert_eq!(symbols(&records), vec!["N", "B", "A"]);
    }

    #[test]
    fn comparator_is_antisymmetric() {
        let a = ext("2020-06-02", "A", 1.0);
        let b = ext("2020-06-01", "B", 9.0);
        assert_eq!(ranking_order(&a, &b), Ordering::Less);
        assert_eq!(ranking_order(&b, &a), Ordering::Greater);
        assert_eq!(ranking_order(&a, &a), Ordering::Equal);
    }
}
