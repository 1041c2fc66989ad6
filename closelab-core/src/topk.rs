//! Bounded top-K selector: largest absolute price moves under an
//! approximate memory ceiling.
//!
//! Records are buffered until `count * record_size_bytes` reaches the
//! ceiling. The record that reaches it is kept; everything after it is never
//! read. The estimate is a fixed per-record size, not measured memory, so
//! the cut-off point is deterministic for a given budget.
//!
//! Ranking: `|price_change|` descending. Equal magnitudes keep arrival
//! order (earlier record first).

use std::cmp::Ordering;
use std::mem::size_of;

use serde::{Deserialize, Serialize};

use crate::domain::ExtendedRecord;

/// 10 MiB.
pub const DEFAULT_MEMORY_CEILING_BYTES: usize = 10 * 1024 * 1024;

/// Per-record estimate used when none is configured.
pub const DEFAULT_RECORD_SIZE_BYTES: usize = size_of::<ExtendedRecord>();

/// Approximate memory budget for the top-K buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryBudget {
    pub ceiling_bytes: usize,
    /// Fixed cost charged per buffered record. Zero disables the ceiling.
    pub record_size_bytes: usize,
}

impl Default for MemoryBudget {
    fn default() -> Self {
        Self {
            ceiling_bytes: DEFAULT_MEMORY_CEILING_BYTES,
            record_size_bytes: DEFAULT_RECORD_SIZE_BYTES,
        }
    }
}

impl MemoryBudget {
    pub fn new(ceiling_bytes: usize) -> Self {
        Self {
            ceiling_bytes,
            ..Self::default()
        }
    }

    pub fn with_record_size(mut self, record_size_bytes: usize) -> Self {
        self.record_size_bytes = record_size_bytes;
        self
    }

    /// How many records fit before buffering stops, or `None` if unbounded.
    ///
    /// Always at least 1: the ceiling is checked after a record is appended.
    pub fn record_capacity(&self) -> Option<usize> {
        if self.record_size_bytes == 0 {
            return None;
        }
        let n = self.ceiling_bytes / self.record_size_bytes
            + usize::from(self.ceiling_bytes % self.record_size_bytes != 0);
        Some(n.max(1))
    }
}

/// Outcome of offering a record to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Buffered; keep reading.
    Accepted,
    /// Buffered, and the ceiling is now reached. Stop reading.
    Full,
    /// Dropped: the buffer was already full.
    Rejected,
}

/// Result of a top-K selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopKSelection {
    /// At most `k` records, `|price_change|` descending.
    pub records: Vec<ExtendedRecord>,
    /// Records held in the buffer when selection ran.
    pub buffered: usize,
    /// The memory ceiling stopped buffering. Any input after the last
    /// buffered record was ignored, so the result may be partial.
    pub limit_reached: bool,
}

/// Memory-bounded record buffer.
#[derive(Debug)]
pub struct BoundedBuffer {
    budget: MemoryBudget,
    records: Vec<ExtendedRecord>,
    estimated_bytes: usize,
    full: bool,
}

impl BoundedBuffer {
    pub fn new(budget: MemoryBudget) -> Self {
        let initial = budget.record_capacity().unwrap_or(0).min(4096);
        Self {
            budget,
            records: Vec::with_capacity(initial),
            estimated_bytes: 0,
            full: false,
        }
    }

    /// Append a record and charge its estimated size against the ceiling.
    pub fn offer(&mut self, record: ExtendedRecord) -> Admission {
        if self.full {
            return Admission::Rejected;
        }

        self.records.push(record);

        if self.budget.record_size_bytes == 0 {
            return Admission::Accepted;
        }
        self.estimated_bytes = self
            .estimated_bytes
            .saturating_add(self.budget.record_size_bytes);
        if self.estimated_bytes >= self.budget.ceiling_bytes {
            self.full = true;
            Admission::Full
        } else {
            Admission::Accepted
        }
    }

    pub fn is_full(&self) -> bool {
        self.full
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn estimated_bytes(&self) -> usize {
        self.estimated_bytes
    }

    /// Rank the buffered records and keep the first `k`.
    ///
    /// `k = 0` yields an empty list. `k` larger than the buffer yields every
    /// buffered record, ranked.
    pub fn select(self, k: usize) -> TopKSelection {
        let buffered = self.records.len();
        let mut records = self.records;
        records.sort_by(abs_change_order);
        records.truncate(k);
        TopKSelection {
            records,
            buffered,
            limit_reached: self.full,
        }
    }
}

/// `|price_change|` descending, IEEE total order.
pub fn abs_change_order(a: &ExtendedRecord, b: &ExtendedRecord) -> Ordering {
    b.abs_change().total_cmp(&a.abs_change())
}

/// Buffer `records` under `budget`, stopping at the ceiling, then select.
pub fn select_top_k<I>(records: I, k: usize, budget: MemoryBudget) -> TopKSelection
where
    I: IntoIterator<Item = ExtendedRecord>,
{
    let mut buffer = BoundedBuffer::new(budget);
    for record in records {
        if buffer.offer(record) == Admission::Full {
            break;
        }
    }
    buffer.select(k)
}
