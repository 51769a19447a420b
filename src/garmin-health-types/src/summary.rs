use std::fmt::{self, Display};

use crate::{
    DailyRecord, HealthStatus,
    helpers::{mean_present, round_float},
};

/// Per-status averages over a set of daily records.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HealthSummary {
    pub sick: MetricMeans,
    pub healthy: MetricMeans,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricMeans {
    pub days: usize,
    pub hrv: Option<f64>,
    pub resting_hr: Option<f64>,
    pub sleep_duration: Option<f64>,
}

impl HealthSummary {
    pub fn new(records: &[DailyRecord]) -> Self {
        Self {
            sick: MetricMeans::for_status(records, HealthStatus::Sick),
            healthy: MetricMeans::for_status(records, HealthStatus::Healthy),
        }
    }
}

impl MetricMeans {
    fn for_status(records: &[DailyRecord], status: HealthStatus) -> Self {
        let matching = records
            .iter()
            .filter(|r| r.status() == status)
            .collect::<Vec<_>>();

        let mean = |get: fn(&DailyRecord) -> Option<f64>| {
            mean_present(matching.iter().map(|r| get(r))).map(round_float)
        };

        Self {
            days: matching.len(),
            hrv: mean(DailyRecord::hrv),
            resting_hr: mean(DailyRecord::resting_hr),
            sleep_duration: mean(DailyRecord::sleep_duration),
        }
    }
}

struct OrDash(Option<f64>);

impl Display for OrDash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{v}"),
            None => f.write_str("-"),
        }
    }
}

impl Display for MetricMeans {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "days: {}, HRV: {}, resting HR: {}, sleep: {}h",
            self.days,
            OrDash(self.hrv),
            OrDash(self.resting_hr),
            OrDash(self.sleep_duration),
        )
    }
}

impl Display for HealthSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sick:\n\t{}", self.sick)?;
        write!(f, "Healthy:\n\t{}", self.healthy)
    }
}
