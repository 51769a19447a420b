use std::time::Duration;

use chrono::NaiveDate;
use garmin_health_api::{ApiError, Metric, MetricsSource};
use garmin_health_types::{DailyMetrics, DailyRecord, DateRange, SickPeriods};
use tokio::time::sleep;

/// What happened to a single day of the range.
#[derive(Debug)]
pub enum DayOutcome {
    Fetched(DailyRecord),
    Failed { date: NaiveDate, reason: ApiError },
}

impl DayOutcome {
    pub fn date(&self) -> NaiveDate {
        match self {
            DayOutcome::Fetched(record) => record.date(),
            DayOutcome::Failed { date, .. } => *date,
        }
    }
}

/// How a failed day is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Leave the day out of the output.
    #[default]
    SkipDay,
    /// Query the day again, up to `attempts` more times, then leave it out.
    Retry { attempts: u32 },
}

impl FailurePolicy {
    pub fn from_retries(retries: u32) -> Self {
        match retries {
            0 => FailurePolicy::SkipDay,
            attempts => FailurePolicy::Retry { attempts },
        }
    }

    fn extra_attempts(self) -> u32 {
        match self {
            FailurePolicy::SkipDay => 0,
            FailurePolicy::Retry { attempts } => attempts,
        }
    }
}

#[derive(Debug, Default)]
pub struct FetchReport {
    /// Ascending by date, at most one per day.
    pub records: Vec<DailyRecord>,
    pub failures: Vec<(NaiveDate, ApiError)>,
}

impl FetchReport {
    pub fn requested_days(&self) -> usize {
        self.records.len() + self.failures.len()
    }
}

pub struct DailyFetcher<'a, S> {
    source: &'a S,
    periods: &'a SickPeriods,
    delay: Duration,
}

impl<'a, S> DailyFetcher<'a, S>
where
    S: MetricsSource,
{
    pub fn new(source: &'a S, periods: &'a SickPeriods, delay: Duration) -> Self {
        Self {
            source,
            periods,
            delay,
        }
    }

    /// Fetches all three metrics for `date`. Any failing query fails the
    /// whole day.
    pub async fn fetch_day(&self, date: NaiveDate) -> DayOutcome {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.fetch_metrics(date).await {
            Ok(metrics) => DayOutcome::Fetched(DailyRecord::new(date, metrics, self.periods)),
            Err(reason) => DayOutcome::Failed { date, reason },
        }
    }

    async fn fetch_metrics(&self, date: NaiveDate) -> Result<DailyMetrics, ApiError> {
        let hrv = Metric::Hrv.fetch(self.source, date).await?;
        let resting_hr = Metric::RestingHeartRate.fetch(self.source, date).await?;
        let sleep_duration = Metric::SleepDuration.fetch(self.source, date).await?;

        Ok(DailyMetrics {
            hrv,
            resting_hr,
            sleep_duration,
        })
    }

    pub async fn fetch_range(&self, range: DateRange, policy: FailurePolicy) -> FetchReport {
        let mut report = FetchReport::default();

        for date in range.days() {
            info!("fetching data for {date}...");
            let mut outcome = self.fetch_day(date).await;

            let mut attempt = 0;
            while let DayOutcome::Failed { reason, .. } = &outcome {
                if attempt >= policy.extra_attempts() {
                    break;
                }
                attempt += 1;
                warn!("retrying {date} ({attempt}/{}): {reason}", policy.extra_attempts());
                outcome = self.fetch_day(date).await;
            }

            match outcome {
                DayOutcome::Fetched(record) => report.records.push(record),
                DayOutcome::Failed { date, reason } => {
                    error!("error fetching data for {date}: {reason}");
                    report.failures.push((date, reason));
                }
            }
        }

        info!(
            "fetched {} of {} days ({} skipped)",
            report.records.len(),
            report.requested_days(),
            report.failures.len()
        );

        report
    }
}
