//! Date period selection
//!
//! A period is written `YYYYMM-YYYYMM`, `YYYYMM-` or `-YYYYMM`. A missing
//! half is unbounded; a present end month covers the whole month.

use crate::error::{ChartError, ChartResult};
use chrono::{Datelike, NaiveDate};
use std::fmt;

/// Inclusive date interval; unbounded ends use the `NaiveDate` extremes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    /// Sentinel for an unbounded past
    pub const UNBOUNDED_START: NaiveDate = NaiveDate::MIN;
    /// Sentinel for an unbounded future
    pub const UNBOUNDED_END: NaiveDate = NaiveDate::MAX;

    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn has_start(&self) -> bool {
        self.start != Self::UNBOUNDED_START
    }

    pub fn has_end(&self) -> bool {
        self.end != Self::UNBOUNDED_END
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = |present: bool, date: NaiveDate| {
            if present {
                date.to_string()
            } else {
                "…".to_string()
            }
        };
        write!(
            f,
            "{} – {}",
            bound(self.has_start(), self.start),
            bound(self.has_end(), self.end)
        )
    }
}

/// Parse a period expression.
///
/// Exactly one `-` separator is required; either half may be empty.
pub fn parse_period(text: &str) -> ChartResult<Period> {
    let invalid = || ChartError::InvalidPeriod {
        input: text.to_string(),
    };

    let mut halves = text.split('-');
    let (start, end) = match (halves.next(), halves.next(), halves.next()) {
        (Some(start), Some(end), None) => (start, end),
        _ => return Err(invalid()),
    };

    let start = if start.is_empty() {
        Period::UNBOUNDED_START
    } else {
        let (year, month) = parse_year_month(start).ok_or_else(invalid)?;
        NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?
    };

    let end = if end.is_empty() {
        Period::UNBOUNDED_END
    } else {
        let (year, month) = parse_year_month(end).ok_or_else(invalid)?;
        last_day_of_month(year, month).ok_or_else(invalid)?
    };

    Ok(Period { start, end })
}

fn parse_year_month(text: &str) -> Option<(i32, u32)> {
    if text.len() != 6 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = text[..4].parse().ok()?;
    let month = text[4..].parse().ok()?;
    (1..=12).contains(&month).then_some((year, month))
}

/// First day of the following month, minus one day
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    first_of_next.pred_opt()
}

/// Monday of the ISO week containing `date`
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - chrono::Duration::days(date.weekday().num_days_from_monday() as i64)
}
