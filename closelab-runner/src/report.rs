//! Human-readable top-K report.
//!
//! ```text
//! Top 3 stocks with largest daily increase/decrease:
//! Date,StockSymbol,ClosingPrice,PriceChange,PriceChangePercent
//! 2020-06-02,BBB,45,-5,-10
//! ...
//! ```
//! Rows use the extended-record layout, so everything after the title line
//! can be read back as an extended-record file.

use std::io::Write;

use closelab_core::ExtendedRecord;

use crate::codec::ExtendedRecordWriter;
use crate::error::CodecError;

pub fn write_top_k_report<W: Write>(
    sink: &mut W,
    k: usize,
    records: &[ExtendedRecord],
) -> Result<(), CodecError> {
    writeln!(sink, "Top {k} stocks with largest daily increase/decrease:")?;
    let mut writer = ExtendedRecordWriter::new(&mut *sink)?;
    for record in records {
        writer.write(record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use closelab_core::Record;

    #[test]
    fn report_layout() {
        let records = vec![
            Record::new("2020-06-02", "BBB", 45.0).extend(-5.0, -10.0),
            Record::new("2020-06-02", "AAA", 104.0).extend(4.0, 4.0),
        ];
        let mut out = Vec::new();
        write_top_k_report(&mut out, 2, &records).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Top 2 stocks with largest daily increase/decrease:\n\
             Date,StockSymbol,ClosingPrice,PriceChange,PriceChangePercent\n\
             2020-06-02,BBB,45,-5,-10\n\
             2020-06-02,AAA,104,4,4\n"
        );
    }

    #[test]
    fn empty_report_still_has_header() {
        let mut out = Vec::new();
        write_top_k_report(&mut out, 0, &[]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("Top 0 stocks"));
    }
}
