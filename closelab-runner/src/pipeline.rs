//! File-level operations: each reads one file format and writes another.
//!
//! Entry points:
//! - `compute_changes()`: raw rows → extended records, streamed row by row
//! - `sort_by_date_and_change()`: extended records → ranked extended records
//! - `compute_symbol_statistics()`: extended records → per-symbol statistics
//! - `top_k_by_absolute_change()`: extended records → top-K report on a sink
//! - `extract_month()`: extended records → one month's extended records
//! - `run_pipeline()`: all of the above in dependency order
//!
//! Every operation owns its file handles and transform state; nothing is
//! shared between calls. Handles are closed on every return path.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use closelab_core::topk::{Admission, BoundedBuffer, MemoryBudget, TopKSelection};
use closelab_core::{ranking, PriceChangeCalculator, SymbolStats, SymbolStatsAggregator};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::codec::{
    write_symbol_stats, ExtendedRecordReader, ExtendedRecordWriter, HeaderPolicy,
    RawRecordReader,
};
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::month::Month;
use crate::report::write_top_k_report;

/// Options for reading raw input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeOptions {
    pub header: HeaderPolicy,
}

/// Counts from a change-calculator pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
    pub records: usize,
    pub symbols: usize,
}

fn open_input(path: &Path) -> Result<File, PipelineError> {
    File::open(path).map_err(|e| PipelineError::io(path, e))
}

/// Streaming operations write while still reading, so creating the output
/// over the input would truncate it first.
fn ensure_distinct(input: &Path, output: &Path) -> Result<(), PipelineError> {
    let (Ok(a), Ok(b)) = (input.canonicalize(), output.canonicalize()) else {
        return Ok(());
    };
    if a == b {
        return Err(PipelineError::SamePath { path: a });
    }
    Ok(())
}

fn create_output(path: &Path) -> Result<BufWriter<File>, PipelineError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| PipelineError::io(path, e))
}

fn create_writer(path: &Path) -> Result<ExtendedRecordWriter<BufWriter<File>>, PipelineError> {
    ExtendedRecordWriter::new(create_output(path)?).map_err(|e| PipelineError::codec(path, e))
}

/// Stream raw records through the change calculator into an extended-record file.
pub fn compute_changes(
    input: &Path,
    output: &Path,
    opts: &ChangeOptions,
) -> Result<ChangeSummary, PipelineError> {
    debug!(input = %input.display(), header = ?opts.header, "computing price changes");

    let mut reader = RawRecordReader::new(open_input(input)?, opts.header);
    ensure_distinct(input, output)?;
    let mut writer = create_writer(output)?;

    let mut calc = PriceChangeCalculator::new();
    let mut records = 0;
    while let Some(record) = reader
        .next_record()
        .map_err(|e| PipelineError::codec(input, e))?
    {
        writer
            .write(&calc.push(record))
            .map_err(|e| PipelineError::codec(output, e))?;
        records += 1;
    }
    writer.flush().map_err(|e| PipelineError::codec(output, e))?;

    let summary = ChangeSummary {
        records,
        symbols: calc.symbols_seen(),
    };
    info!(
        records = summary.records,
        symbols = summary.symbols,
        output = %output.display(),
        "price changes written"
    );
    Ok(summary)
}

/// Load every extended record, rank by date then percent change (both
/// descending), and write the result. Returns the record count.
pub fn sort_by_date_and_change(input: &Path, output: &Path) -> Result<usize, PipelineError> {
    debug!(input = %input.display(), "sorting by date and percent change");

    let mut records = ExtendedRecordReader::new(open_input(input)?)
        .read_all()
        .map_err(|e| PipelineError::codec(input, e))?;

    ranking::sort_by_date_and_change(&mut records);

    let mut writer = create_writer(output)?;
    for record in &records {
        writer
            .write(record)
            .map_err(|e| PipelineError::codec(output, e))?;
    }
    writer.flush().map_err(|e| PipelineError::codec(output, e))?;

    info!(records = records.len(), output = %output.display(), "sorted records written");
    Ok(records.len())
}

/// Group percent changes by symbol and write one statistics row per symbol,
/// ordered by symbol.
pub fn compute_symbol_statistics(
    input: &Path,
    output: &Path,
) -> Result<Vec<SymbolStats>, PipelineError> {
    debug!(input = %input.display(), "computing symbol statistics");

    let mut reader = ExtendedRecordReader::new(open_input(input)?);
    let mut agg = SymbolStatsAggregator::new();
    while let Some(record) = reader
        .next_record()
        .map_err(|e| PipelineError::codec(input, e))?
    {
        agg.push(&record);
    }
    drop(reader);
    debug!(symbols = agg.symbol_count(), "returns grouped by symbol");

    let stats = agg.finish();
    write_symbol_stats(create_output(output)?, &stats)
        .map_err(|e| PipelineError::codec(output, e))?;

    info!(symbols = stats.len(), output = %output.display(), "symbol statistics written");
    Ok(stats)
}

/// Select the `k` largest absolute price moves and write a report to `sink`.
///
/// Reading stops as soon as the buffer reaches the memory ceiling; the rest
/// of the file is ignored and the selection is marked `limit_reached`. A
/// warning is logged only when rows were actually left unread. Neither case
/// is an error.
pub fn top_k_by_absolute_change<W: Write>(
    input: &Path,
    k: usize,
    budget: &MemoryBudget,
    sink: &mut W,
) -> Result<TopKSelection, PipelineError> {
    debug!(
        input = %input.display(),
        k,
        ceiling_bytes = budget.ceiling_bytes,
        record_size_bytes = budget.record_size_bytes,
        "selecting top-k by absolute change"
    );

    let mut buffer = BoundedBuffer::new(*budget);
    {
        let mut reader = ExtendedRecordReader::new(open_input(input)?);
        let input_left = fill_buffer(&mut reader, &mut buffer, input)?;
        if input_left {
            warn!(
                buffered = buffer.len(),
                ceiling_bytes = budget.ceiling_bytes,
                input = %input.display(),
                "memory ceiling reached; remaining input ignored"
            );
        } else if buffer.is_full() {
            info!(
                buffered = buffer.len(),
                ceiling_bytes = budget.ceiling_bytes,
                "memory ceiling reached on the last record"
            );
        }
    }
    if buffer.is_empty() {
        debug!(input = %input.display(), "no records to rank");
    }

    let selection = buffer.select(k);
    write_top_k_report(sink, k, &selection.records).map_err(PipelineError::Report)?;

    info!(
        selected = selection.records.len(),
        buffered = selection.buffered,
        limit_reached = selection.limit_reached,
        "top-k report written"
    );
    Ok(selection)
}

/// Offer records until the input ends or the buffer fills. Returns `true`
/// when the ceiling stopped reading with at least one row still unread.
/// An unreadable row after the ceiling counts as unread input.
fn fill_buffer<R: Read>(
    reader: &mut ExtendedRecordReader<R>,
    buffer: &mut BoundedBuffer,
    input: &Path,
) -> Result<bool, PipelineError> {
    while let Some(record) = reader
        .next_record()
        .map_err(|e| PipelineError::codec(input, e))?
    {
        if buffer.offer(record) == Admission::Full {
            return Ok(!matches!(reader.next_record(), Ok(None)));
        }
    }
    Ok(false)
}

/// Copy the extended records dated within `month` (`YYYY-MM`) to `output`.
/// Returns the number of rows kept.
pub fn extract_month(input: &Path, output: &Path, month: &str) -> Result<usize, PipelineError> {
    let month = Month::parse(month).map_err(PipelineError::InvalidMonth)?;
    debug!(input = %input.display(), %month, "extracting month");

    let mut reader = ExtendedRecordReader::new(open_input(input)?);
    ensure_distinct(input, output)?;
    let mut writer = create_writer(output)?;

    let mut kept = 0;
    while let Some(record) = reader
        .next_record()
        .map_err(|e| PipelineError::codec(input, e))?
    {
        if month.contains(&record.date) {
            writer
                .write(&record)
                .map_err(|e| PipelineError::codec(output, e))?;
            kept += 1;
        }
    }
    writer.flush().map_err(|e| PipelineError::codec(output, e))?;

    info!(%month, rows = kept, output = %output.display(), "month subset written");
    Ok(kept)
}

// ─── Full pipeline ──────────────────────────────────────────────────

/// File locations for a full pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelinePaths {
    pub raw_input: PathBuf,
    pub changes: PathBuf,
    pub sorted: PathBuf,
    pub stats: PathBuf,
    /// Month subset file; used only when a month filter is configured.
    pub month: Option<PathBuf>,
}

impl PipelinePaths {
    /// Conventional file names under `output_dir`.
    pub fn in_dir(raw_input: impl Into<PathBuf>, output_dir: &Path, month: Option<&Month>) -> Self {
        Self {
            raw_input: raw_input.into(),
            changes: output_dir.join("market_data_with_changes.csv"),
            sorted: output_dir.join("sorted_market_data.csv"),
            stats: output_dir.join("sharpe_ratios.csv"),
            month: month.map(|m| output_dir.join(m.file_name())),
        }
    }
}

/// Outcome of a full pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineSummary {
    pub changes: ChangeSummary,
    pub sorted: usize,
    pub stats: Vec<SymbolStats>,
    pub month_rows: Option<usize>,
    pub top_k: TopKSelection,
}

/// Run every operation in dependency order: changes first, then ranking,
/// statistics, the optional month subset, and top-K (over the month subset
/// when one is configured, otherwise over all changes).
pub fn run_pipeline<W: Write>(
    config: &PipelineConfig,
    paths: &PipelinePaths,
    sink: &mut W,
) -> Result<PipelineSummary, PipelineError> {
    let changes = compute_changes(
        &paths.raw_input,
        &paths.changes,
        &ChangeOptions {
            header: config.raw_input.header,
        },
    )?;
    let sorted = sort_by_date_and_change(&paths.changes, &paths.sorted)?;
    let stats = compute_symbol_statistics(&paths.changes, &paths.stats)?;

    let (top_k_input, month_rows) = match &config.month.filter {
        Some(month) => {
            let month_path = paths
                .month
                .clone()
                .unwrap_or_else(|| paths.changes.with_file_name(month.file_name()));
            let rows = extract_month(&paths.changes, &month_path, month.as_str())?;
            (month_path, Some(rows))
        }
        None => (paths.changes.clone(), None),
    };

    let budget = config.top_k.budget();
    let top_k = top_k_by_absolute_change(&top_k_input, config.top_k.k, &budget, sink)?;

    Ok(PipelineSummary {
        changes,
        sorted,
        stats,
        month_rows,
        top_k,
    })
}
