//! CloseLab Core: domain records and the four batch transforms.
//!
//! This crate holds everything that does not touch the filesystem:
//! - Domain types (raw records, extended records, per-symbol statistics)
//! - Change calculator with a per-invocation last-price map
//! - Ranking sorter (date descending, percent change descending)
//! - Risk statistics aggregator (mean, population std dev, Sharpe ratio)
//! - Bounded top-K selector with an approximate memory ceiling
//!
//! File formats, configuration and reporting live in `closelab-runner`.

pub mod changes;
pub mod domain;
pub mod error;
pub mod ranking;
pub mod stats;
pub mod topk;

pub use changes::{compute_changes, PriceChangeCalculator};
pub use domain::{ExtendedRecord, Record, SymbolStats};
pub use error::ParseError;
pub use ranking::{ranking_order, sort_by_date_and_change};
pub use stats::{compute_symbol_statistics, SymbolStatsAggregator};
pub use topk::{select_top_k, Admission, BoundedBuffer, MemoryBudget, TopKSelection};
