use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::SickPeriods;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HealthStatus {
    Sick,
    Healthy,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Sick => f.write_str("Sick"),
            HealthStatus::Healthy => f.write_str("Healthy"),
        }
    }
}

/// Metrics extracted for one day. `None` means the upstream response had no
/// value, never zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DailyMetrics {
    pub hrv: Option<f64>,
    pub resting_hr: Option<f64>,
    /// Hours.
    pub sleep_duration: Option<f64>,
}

/// One row of the output table. The status is always derived from the date
/// and the sick-period table at construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRecord {
    date: NaiveDate,
    hrv: Option<f64>,
    resting_hr: Option<f64>,
    sleep_duration: Option<f64>,
    status: HealthStatus,
}

impl DailyRecord {
    pub fn new(date: NaiveDate, metrics: DailyMetrics, periods: &SickPeriods) -> Self {
        Self {
            date,
            hrv: metrics.hrv,
            resting_hr: metrics.resting_hr,
            sleep_duration: metrics.sleep_duration,
            status: periods.status(date),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn hrv(&self) -> Option<f64> {
        self.hrv
    }

    pub fn resting_hr(&self) -> Option<f64> {
        self.resting_hr
    }

    pub fn sleep_duration(&self) -> Option<f64> {
        self.sleep_duration
    }

    pub fn status(&self) -> HealthStatus {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SickPeriod;

    #[test]
    fn status_follows_periods() {
        let periods = SickPeriods::new(vec!["2024-05-25..2024-06-07".parse::<SickPeriod>().unwrap()]);
        let sick = DailyRecord::new(
            NaiveDate::from_ymd_opt(2024, 6, 7).unwrap(),
            DailyMetrics::default(),
            &periods,
        );
        let healthy = DailyRecord::new(
            NaiveDate::from_ymd_opt(2024, 6, 8).unwrap(),
            DailyMetrics::default(),
            &periods,
        );

        assert_eq!(sick.status(), HealthStatus::Sick);
        assert_eq!(healthy.status(), HealthStatus::Healthy);
    }

    #[test]
    fn serializes_missing_values_as_null() {
        let record = DailyRecord::new(
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            DailyMetrics {
                hrv: Some(48.0),
                resting_hr: None,
                sleep_duration: Some(7.5),
            },
            &SickPeriods::default(),
        );

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date"], "2024-04-01");
        assert_eq!(json["hrv"], 48.0);
        assert!(json["resting_hr"].is_null());
        assert_eq!(json["status"], "Healthy");
    }
}
