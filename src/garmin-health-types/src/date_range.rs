use chrono::{NaiveDate, TimeDelta};

use crate::PeriodError;

const RANGE_START: NaiveDate = match NaiveDate::from_ymd_opt(2024, 4, 1) {
    Some(date) => date,
    None => panic!("invalid calendar date"),
};

const RANGE_END: NaiveDate = match NaiveDate::from_ymd_opt(2025, 3, 30) {
    Some(date) => date,
    None => panic!("invalid calendar date"),
};

pub const DEFAULT_RANGE: DateRange = DateRange {
    start: RANGE_START,
    end: RANGE_END,
};

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PeriodError> {
        if start > end {
            return Err(PeriodError::Reversed { start, end });
        }

        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days, counting both ends.
    pub fn len(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    /// Every date in the range, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |date| *date <= end)
    }

    /// The date after `end`, used as an exclusive upper bound.
    pub fn end_exclusive(&self) -> NaiveDate {
        self.end + TimeDelta::days(1)
    }
}
