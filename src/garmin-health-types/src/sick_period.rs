use std::{fmt, str::FromStr};

use chrono::NaiveDate;

use crate::{HealthStatus, PeriodError};

const fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid calendar date"),
    }
}

pub const DEFAULT_SICK_PERIODS: [SickPeriod; 5] = [
    SickPeriod::unchecked(date(2024, 5, 25), date(2024, 6, 7)),
    SickPeriod::unchecked(date(2024, 8, 31), date(2024, 9, 10)),
    SickPeriod::unchecked(date(2024, 11, 18), date(2024, 11, 25)),
    SickPeriod::unchecked(date(2025, 1, 2), date(2025, 1, 17)),
    SickPeriod::unchecked(date(2025, 3, 7), date(2025, 3, 16)),
];

/// Closed calendar interval during which the subject was unwell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SickPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

impl SickPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PeriodError> {
        if start > end {
            return Err(PeriodError::Reversed { start, end });
        }

        Ok(Self { start, end })
    }

    const fn unchecked(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Both bounds are inclusive.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl FromStr for SickPeriod {
    type Err = PeriodError;

    /// Parses `2024-05-25..2024-06-07`. `..=` is accepted as well, the end is
    /// inclusive either way.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once("..=")
            .or_else(|| s.split_once(".."))
            .ok_or_else(|| PeriodError::Format(s.to_owned()))?;

        let start = start.trim().parse::<NaiveDate>()?;
        let end = end.trim().parse::<NaiveDate>()?;
        Self::new(start, end)
    }
}

impl fmt::Display for SickPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Ordered table of sick periods. Periods may overlap or be listed in any
/// order; membership is the union of all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SickPeriods(Vec<SickPeriod>);

impl SickPeriods {
    pub fn new(periods: Vec<SickPeriod>) -> Self {
        Self(periods)
    }

    pub fn is_sick(&self, date: NaiveDate) -> bool {
        self.0.iter().any(|period| period.contains(date))
    }

    pub fn status(&self, date: NaiveDate) -> HealthStatus {
        if self.is_sick(date) {
            HealthStatus::Sick
        } else {
            HealthStatus::Healthy
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SickPeriod> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<SickPeriod>> for SickPeriods {
    fn from(periods: Vec<SickPeriod>) -> Self {
        Self::new(periods)
    }
}

impl FromIterator<SickPeriod> for SickPeriods {
    fn from_iter<T: IntoIterator<Item = SickPeriod>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period(s: &str) -> SickPeriod {
        s.parse().unwrap()
    }

    #[test]
    fn bounds_are_inclusive() {
        let periods = SickPeriods::new(vec![period("2024-05-25..2024-06-07")]);

        assert!(periods.is_sick(ymd(2024, 5, 25)));
        assert!(periods.is_sick(ymd(2024, 6, 7)));
        assert!(periods.is_sick(ymd(2024, 6, 1)));
        assert!(!periods.is_sick(ymd(2024, 5, 24)));
        assert!(!periods.is_sick(ymd(2024, 6, 8)));
    }

    #[test]
    fn overlapping_and_unordered_periods() {
        let periods = SickPeriods::new(vec![
            period("2024-09-01..2024-09-10"),
            period("2024-01-01..2024-01-05"),
            period("2024-09-05..2024-09-20"),
        ]);

        assert!(periods.is_sick(ymd(2024, 1, 3)));
        assert!(periods.is_sick(ymd(2024, 9, 7)));
        assert!(periods.is_sick(ymd(2024, 9, 20)));
        assert!(!periods.is_sick(ymd(2024, 9, 21)));
        assert!(!periods.is_sick(ymd(2024, 5, 1)));
    }

    #[test]
    fn single_day_period() {
        let periods = SickPeriods::new(vec![period("2024-03-03..=2024-03-03")]);
        assert_eq!(periods.status(ymd(2024, 3, 3)), HealthStatus::Sick);
        assert_eq!(periods.status(ymd(2024, 3, 4)), HealthStatus::Healthy);
    }

    #[test]
    fn empty_table_is_always_healthy() {
        let periods = SickPeriods::default();
        assert!(!periods.is_sick(ymd(2024, 6, 1)));
    }

    #[test]
    fn rejects_reversed_period() {
        let err = "2024-06-07..2024-05-25".parse::<SickPeriod>().unwrap_err();
        assert!(matches!(err, PeriodError::Reversed { .. }));
    }

    #[test]
    fn rejects_malformed_period() {
        assert!(matches!(
            "2024-06-07".parse::<SickPeriod>(),
            Err(PeriodError::Format(_))
        ));
        assert!(matches!(
            "2024-06-07..tomorrow".parse::<SickPeriod>(),
            Err(PeriodError::Date(_))
        ));
    }

    #[test]
    fn display_parses_back() {
        let p = period("2025-01-02..2025-01-17");
        assert_eq!(p.to_string(), "2025-01-02..2025-01-17");
        assert_eq!(p.to_string().parse::<SickPeriod>().unwrap(), p);
    }

    #[test]
    fn default_periods_are_well_formed() {
        for p in DEFAULT_SICK_PERIODS {
            assert!(p.start() <= p.end(), "{p}");
        }
        let periods = SickPeriods::from(DEFAULT_SICK_PERIODS.to_vec());
        assert!(periods.is_sick(ymd(2024, 11, 20)));
        assert!(!periods.is_sick(ymd(2024, 12, 20)));
    }
}
