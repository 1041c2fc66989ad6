//! Calendar month selector for month-subset files (e.g. `2020-06.csv`).

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A validated `YYYY-MM` month.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Month(String);

impl Month {
    /// Parse `YYYY-MM`. Returns the offending text on failure.
    pub fn parse(text: &str) -> Result<Self, String> {
        let t = text.trim();
        let shape_ok = t.len() == 7
            && t.as_bytes()[4] == b'-'
            && t.bytes().enumerate().all(|(i, b)| i == 4 || b.is_ascii_digit());
        if !shape_ok || NaiveDate::parse_from_str(&format!("{t}-01"), "%Y-%m-%d").is_err() {
            return Err(text.to_string());
        }
        Ok(Self(t.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `date` (`YYYY-MM-DD`, compared as text) falls in this month.
    pub fn contains(&self, date: &str) -> bool {
        date.strip_prefix(self.0.as_str())
            .map(|rest| rest.is_empty() || rest.starts_with('-'))
            .unwrap_or(false)
    }

    /// Conventional file name for the month subset.
    pub fn file_name(&self) -> String {
        format!("{}.csv", self.0)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Month {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Month::parse(&value).map_err(|bad| format!("invalid month '{bad}' (expected YYYY-MM)"))
    }
}

impl From<Month> for String {
    fn from(m: Month) -> Self {
        m.0
    }
}
