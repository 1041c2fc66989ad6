//! CSV codec for the three record files.
//!
//! - Raw input: `date,symbol,closingPrice`, header optional (see [`HeaderPolicy`])
//! - Extended records: `Date,StockSymbol,ClosingPrice,PriceChange,PriceChangePercent`
//! - Symbol statistics: `StockSymbol,AverageReturn,StdDeviation,SharpeRatio`
//!
//! Fields are split on commas with no quoting or escaping. Numbers are
//! written with the shortest representation that parses back to the same
//! `f64`; no fixed precision.

use std::io::{Read, Write};

use closelab_core::error::parse_f64;
use closelab_core::{ExtendedRecord, ParseError, Record, SymbolStats};
use serde::{Deserialize, Serialize};

use crate::error::CodecError;

pub const EXTENDED_HEADER: [&str; 5] = [
    "Date",
    "StockSymbol",
    "ClosingPrice",
    "PriceChange",
    "PriceChangePercent",
];

pub const STATS_HEADER: [&str; 4] = ["StockSymbol", "AverageReturn", "StdDeviation", "SharpeRatio"];

const RAW_FIELDS: [&str; 3] = ["date", "symbol", "closingPrice"];

/// Whether the raw input starts with a header row.
///
/// Raw files are read without a header by default. A header in a file read
/// with `Absent` fails to parse as a price and aborts the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderPolicy {
    #[default]
    Absent,
    Present,
}

impl HeaderPolicy {
    fn has_header(self) -> bool {
        matches!(self, Self::Present)
    }
}

fn reader_for<R: Read>(rdr: R, has_headers: bool) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .quoting(false)
        .from_reader(rdr)
}

fn writer_for<W: Write>(wtr: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(wtr)
}

fn line_of(row: &csv::StringRecord) -> u64 {
    row.position().map(|p| p.line()).unwrap_or(0)
}

/// Check the column count against the fixed layout.
fn expect_fields(row: &csv::StringRecord, names: &[&'static str]) -> Result<(), ParseError> {
    let line = line_of(row);
    if row.len() < names.len() {
        return Err(ParseError::missing(line, names[row.len()]));
    }
    if row.len() > names.len() {
        return Err(ParseError::new(
            line,
            names[names.len() - 1],
            &row[names.len()],
            format!("expected {} fields, found {}", names.len(), row.len()),
        ));
    }
    Ok(())
}

// ─── Readers ────────────────────────────────────────────────────────

/// Streaming reader for raw `date,symbol,closingPrice` rows.
pub struct RawRecordReader<R: Read> {
    inner: csv::Reader<R>,
    row: csv::StringRecord,
}

impl<R: Read> RawRecordReader<R> {
    pub fn new(rdr: R, header: HeaderPolicy) -> Self {
        Self {
            inner: reader_for(rdr, header.has_header()),
            row: csv::StringRecord::new(),
        }
    }

    /// Next record, or `None` at end of input.
    pub fn next_record(&mut self) -> Result<Option<Record>, CodecError> {
        if !self.inner.read_record(&mut self.row)? {
            return Ok(None);
        }
        Ok(Some(decode_raw(&self.row)?))
    }
}

fn decode_raw(row: &csv::StringRecord) -> Result<Record, ParseError> {
    expect_fields(row, &RAW_FIELDS)?;
    let line = line_of(row);
    Ok(Record {
        date: row[0].to_string(),
        symbol: row[1].to_string(),
        closing_price: parse_f64(line, RAW_FIELDS[2], &row[2])?,
    })
}

/// Streaming reader for extended-record files. The first line is always
/// treated as the header and skipped.
pub struct ExtendedRecordReader<R: Read> {
    inner: csv::Reader<R>,
    row: csv::StringRecord,
}

impl<R: Read> ExtendedRecordReader<R> {
    pub fn new(rdr: R) -> Self {
        Self {
            inner: reader_for(rdr, true),
            row: csv::StringRecord::new(),
        }
    }

    pub fn next_record(&mut self) -> Result<Option<ExtendedRecord>, CodecError> {
        if !self.inner.read_record(&mut self.row)? {
            return Ok(None);
        }
        Ok(Some(decode_extended(&self.row)?))
    }

    /// Materialize the rest of the file.
    pub fn read_all(&mut self) -> Result<Vec<ExtendedRecord>, CodecError> {
        let mut out = Vec::new();
        while let Some(record) = self.next_record()? {
            out.push(record);
        }
        Ok(out)
    }
}

fn decode_extended(row: &csv::StringRecord) -> Result<ExtendedRecord, ParseError> {
    expect_fields(row, &EXTENDED_HEADER)?;
    let line = line_of(row);
    Ok(ExtendedRecord {
        date: row[0].to_string(),
        symbol: row[1].to_string(),
        closing_price: parse_f64(line, EXTENDED_HEADER[2], &row[2])?,
        price_change: parse_f64(line, EXTENDED_HEADER[3], &row[3])?,
        price_change_percent: parse_f64(line, EXTENDED_HEADER[4], &row[4])?,
    })
}

/// Read a complete symbol-statistics file.
pub fn read_symbol_stats<R: Read>(rdr: R) -> Result<Vec<SymbolStats>, CodecError> {
    let mut inner = reader_for(rdr, true);
    let mut row = csv::StringRecord::new();
    let mut out = Vec::new();
    while inner.read_record(&mut row)? {
        expect_fields(&row, &STATS_HEADER)?;
        let line = line_of(&row);
        out.push(SymbolStats {
            symbol: row[0].to_string(),
            average_return: parse_f64(line, STATS_HEADER[1], &row[1])?,
            std_deviation: parse_f64(line, STATS_HEADER[2], &row[2])?,
            sharpe_ratio: parse_f64(line, STATS_HEADER[3], &row[3])?,
        });
    }
    Ok(out)
}

// ─── Writers ────────────────────────────────────────────────────────

/// Writes the extended-record header on construction, then one row per record.
pub struct ExtendedRecordWriter<W: Write> {
    inner: csv::Writer<W>,
}

impl<W: Write> ExtendedRecordWriter<W> {
    pub fn new(wtr: W) -> Result<Self, CodecError> {
        let mut inner = writer_for(wtr);
        inner.write_record(EXTENDED_HEADER)?;
        Ok(Self { inner })
    }

    pub fn write(&mut self, r: &ExtendedRecord) -> Result<(), CodecError> {
        self.inner.write_record([
            &r.date,
            &r.symbol,
            &r.closing_price.to_string(),
            &r.price_change.to_string(),
            &r.price_change_percent.to_string(),
        ])?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), CodecError> {
        self.inner.flush()?;
        Ok(())
    }
}

/// Write a complete symbol-statistics file.
pub fn write_symbol_stats<W: Write>(wtr: W, stats: &[SymbolStats]) -> Result<(), CodecError> {
    let mut inner = writer_for(wtr);
    inner.write_record(STATS_HEADER)?;
    for s in stats {
        inner.write_record([
            &s.symbol,
            &s.average_return.to_string(),
            &s.std_deviation.to_string(),
            &s.sharpe_ratio.to_string(),
        ])?;
    }
    inner.flush()?;
    Ok(())
}
