//! The reference period the extraction prompt anchors relative dates to.
//!
//! The original intake flow hard-coded "abril 2025" into the prompt, which
//! silently skews every relative date once that month has passed. Here the
//! period is an explicit runtime value: derived from the clock per request
//! by default, overridable from configuration for reproducible runs.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A month/year anchor for interpreting relative date phrases ("el lunes",
/// "fin de mes") in inbound messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferencePeriod {
    pub year: i32,
    /// 1-based month.
    pub month: u32,
}

#[derive(Debug, Error)]
pub enum PeriodParseError {
    #[error("reference period must be YYYY-MM, got {0:?}")]
    Format(String),
    #[error("month out of range: {0}")]
    Month(u32),
}

impl ReferencePeriod {
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodParseError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodParseError::Month(month));
        }
        Ok(Self { year, month })
    }

    /// The period containing the given date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Spanish month name, as the prompt expects ("abril", "mayo", ...).
    pub fn month_name(&self) -> &'static str {
        match self.month {
            1 => "enero",
            2 => "febrero",
            3 => "marzo",
            4 => "abril",
            5 => "mayo",
            6 => "junio",
            7 => "julio",
            8 => "agosto",
            9 => "septiembre",
            10 => "octubre",
            11 => "noviembre",
            _ => "diciembre",
        }
    }
}

impl fmt::Display for ReferencePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month_name(), self.year)
    }
}

impl FromStr for ReferencePeriod {
    type Err = PeriodParseError;

    /// Parses `"YYYY-MM"`, the shape taken by the `--reference-period` flag.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| PeriodParseError::Format(s.to_string()))?;
        let year: i32 = year
            .parse()
            .map_err(|_| PeriodParseError::Format(s.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| PeriodParseError::Format(s.to_string()))?;
        Self::new(year, month)
    }
}
