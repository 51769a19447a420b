mod error;
pub use error::PeriodError;

mod sick_period;
pub use sick_period::{DEFAULT_SICK_PERIODS, SickPeriod, SickPeriods};

mod date_range;
pub use date_range::{DEFAULT_RANGE, DateRange};

mod record;
pub use record::{DailyMetrics, DailyRecord, HealthStatus};

mod summary;
pub use summary::{HealthSummary, MetricMeans};

pub mod helpers;
