use crate::errors::{AppError, AppResult};
use chrono::{Days, NaiveDate};

pub fn parse_date(s: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| AppError::InvalidDate(s.to_string()))
}

/// Inclusive range of calendar dates, `start <= end` guaranteed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build a range; bounds are never swapped.
    pub fn new(start: NaiveDate, end: NaiveDate) -> AppResult<Self> {
        if start > end {
            return Err(AppError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse two `YYYY-MM-DD` strings into a range.
    pub fn parse(start: &str, end: &str) -> AppResult<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// The `days` days ending at `end`, `end` included.
    pub fn last_days(end: NaiveDate, days: u64) -> Self {
        let start = end.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar dates in the range.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Every date of the range exactly once, ascending.
    pub fn days(self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Same range with `days` extra dates on both sides.
    pub fn widened(&self, days: u64) -> Self {
        Self {
            start: self
                .start
                .checked_sub_days(Days::new(days))
                .unwrap_or(NaiveDate::MIN),
            end: self
                .end
                .checked_add_days(Days::new(days))
                .unwrap_or(NaiveDate::MAX),
        }
    }
}
