use std::{path::PathBuf, time::Duration};

use chrono::NaiveDate;
use clap::Parser;
use garmin_health_types::{
    DEFAULT_RANGE, DEFAULT_SICK_PERIODS, DateRange, PeriodError, SickPeriod, SickPeriods,
};

use crate::FailurePolicy;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Download daily HRV, resting heart rate and sleep from Garmin Connect and chart them against sick periods"
)]
pub struct GarminHealthCli {
    /// Sick period as `START..END`, both dates inclusive. Repeat or comma-separate.
    #[arg(
        long = "sick-period",
        env = "SICK_PERIODS",
        value_delimiter = ',',
        default_values_t = DEFAULT_SICK_PERIODS.to_vec()
    )]
    pub sick_periods: Vec<SickPeriod>,
    #[arg(long, env = "START_DATE", default_value_t = DEFAULT_RANGE.start())]
    pub start: NaiveDate,
    #[arg(long, env = "END_DATE", default_value_t = DEFAULT_RANGE.end())]
    pub end: NaiveDate,
    #[arg(long, env, default_value = "session_token.json")]
    pub credential_path: PathBuf,
    #[arg(long, env, default_value = "garmin_health_data.csv")]
    pub data_path: PathBuf,
    #[arg(long, env, default_value = "garmin_health_visualization.png")]
    pub image_path: PathBuf,
    /// Pause before each day's queries
    #[arg(long, env, default_value_t = 1000)]
    pub delay_ms: u64,
    /// Extra attempts for a day whose queries failed
    #[arg(long, env, default_value_t = 0)]
    pub retries: u32,
    /// Don't open the chart after writing it
    #[arg(long)]
    pub no_show: bool,
    /// Garmin Connect email, asked for interactively when missing
    #[arg(long, env = "GARMIN_EMAIL")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub sick_periods: SickPeriods,
    pub range: DateRange,
    pub credential_path: PathBuf,
    pub data_path: PathBuf,
    pub image_path: PathBuf,
    pub delay: Duration,
    pub failure_policy: FailurePolicy,
    pub show: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sick_periods: SickPeriods::new(DEFAULT_SICK_PERIODS.to_vec()),
            range: DEFAULT_RANGE,
            credential_path: PathBuf::from("session_token.json"),
            data_path: PathBuf::from("garmin_health_data.csv"),
            image_path: PathBuf::from("garmin_health_visualization.png"),
            delay: Duration::from_secs(1),
            failure_policy: FailurePolicy::SkipDay,
            show: true,
        }
    }
}

impl TryFrom<GarminHealthCli> for Config {
    type Error = PeriodError;

    fn try_from(cli: GarminHealthCli) -> Result<Self, Self::Error> {
        Ok(Self {
            sick_periods: SickPeriods::new(cli.sick_periods),
            range: DateRange::new(cli.start, cli.end)?,
            credential_path: cli.credential_path,
            data_path: cli.data_path,
            image_path: cli.image_path,
            delay: Duration::from_millis(cli.delay_ms),
            failure_policy: FailurePolicy::from_retries(cli.retries),
            show: !cli.no_show,
        })
    }
}
