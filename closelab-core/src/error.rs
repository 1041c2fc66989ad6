//! Parse failures for persisted records.

use thiserror::Error;

/// A field could not be interpreted as the expected type.
///
/// Every operation aborts on the first `ParseError` rather than skipping
/// the line, so aggregate statistics are never computed over a silently
/// shortened input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: field '{field}' has invalid value '{value}': {reason}")]
pub struct ParseError {
    /// 1-based line number in the source file.
    pub line: u64,
    pub field: &'static str,
    pub value: String,
    pub reason: String,
}

impl ParseError {
    pub fn new(line: u64, field: &'static str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            line,
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// A required column is absent from the row.
    pub fn missing(line: u64, field: &'static str) -> Self {
        Self::new(line, field, "", "missing field")
    }
}

/// Parse a numeric field, attaching the line and field name on failure.
pub fn parse_f64(line: u64, field: &'static str, raw: &str) -> Result<f64, ParseError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| ParseError::new(line, field, raw, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_f64_trims_whitespace() {
        assert_eq!(parse_f64(1, "ClosingPrice", " 100.5 ").unwrap(), 100.5);
    }

    #[test]
    fn parse_f64_reports_location() {
        let err = parse_f64(7, "ClosingPrice", "abc").unwrap_err();
        assert_eq!(err.line, 7);
        assert_eq!(err.field, "ClosingPrice");
        assert_eq!(err.value, "abc");
        let msg = err.to_string();
        assert!(msg.contains("line 7"), "{msg}");
        assert!(msg.contains("ClosingPrice"), "{msg}");
    }

    #[test]
    fn missing_field_message() {
        let err = ParseError::missing(3, "StockSymbol");
        assert_eq!(err.reason, "missing field");
        assert!(err.to_string().starts_with("line 3"));
    }
}
