use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use garmin_health_types::{DailyMetrics, DailyRecord, SickPeriods};
use serde::Deserialize;

pub const HEADER: [&str; 5] = ["date", "hrv", "resting_hr", "sleep_duration", "status"];

/// Flat CSV table of daily records. Unknown values are empty cells.
pub struct RecordSink;

impl RecordSink {
    /// Overwrites `path` with one row per record, in order, and returns the
    /// path.
    pub fn write(records: &[DailyRecord], path: &Path) -> anyhow::Result<PathBuf> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)
            .with_context(|| format!("failed to create {}", path.display()))?;

        writer.write_record(HEADER)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        info!("data saved to {}", path.display());
        Ok(path.to_owned())
    }

    /// Reads the table at `path` back. The status column is ignored and
    /// recomputed from `periods`.
    pub fn read(path: &Path, periods: &SickPeriods) -> anyhow::Result<Vec<DailyRecord>> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("failed to open {}", path.display()))?;

        let rows = reader
            .deserialize()
            .collect::<Result<Vec<Row>, _>>()
            .with_context(|| format!("invalid row in {}", path.display()))?;

        Ok(rows.into_iter().map(|row| row.into_record(periods)).collect())
    }
}

#[derive(Deserialize)]
struct Row {
    date: NaiveDate,
    hrv: Option<f64>,
    resting_hr: Option<f64>,
    sleep_duration: Option<f64>,
}

impl Row {
    fn into_record(self, periods: &SickPeriods) -> DailyRecord {
        let metrics = DailyMetrics {
            hrv: self.hrv,
            resting_hr: self.resting_hr,
            sleep_duration: self.sleep_duration,
        };
        DailyRecord::new(self.date, metrics, periods)
    }
}

#[cfg(test)]
mod tests {
    use garmin_health_types::HealthStatus;

    use super::*;

    fn periods() -> SickPeriods {
        SickPeriods::new(vec!["2024-06-06..2024-06-06".parse().unwrap()])
    }

    fn records() -> Vec<DailyRecord> {
        let periods = periods();
        let day = |d, hrv, resting_hr, sleep_duration| {
            DailyRecord::new(
                NaiveDate::from_ymd_opt(2024, 6, d).unwrap(),
                DailyMetrics {
                    hrv,
                    resting_hr,
                    sleep_duration,
                },
                &periods,
            )
        };

        vec![
            day(5, Some(45.0), Some(52.0), Some(7.25)),
            day(6, None, Some(58.0), None),
            day(7, Some(44.0), None, Some(8.0)),
        ]
    }

    #[test]
    fn writes_fixed_header_and_empty_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garmin_health_data.csv");

        let written = RecordSink::write(&records(), &path).unwrap();
        assert_eq!(written, path);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines = content.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "date,hrv,resting_hr,sleep_duration,status");
        assert_eq!(lines[1], "2024-06-05,45.0,52.0,7.25,Healthy");
        assert_eq!(lines[2], "2024-06-06,,58.0,,Sick");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn round_trip_keeps_dates_and_missing_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garmin_health_data.csv");
        let records = records();

        RecordSink::write(&records, &path).unwrap();
        let read = RecordSink::read(&path, &periods()).unwrap();

        assert_eq!(read, records);
        assert_eq!(read[1].hrv(), None);
        assert_eq!(read[1].status(), HealthStatus::Sick);
        assert_eq!(read[2].resting_hr(), None);
    }

    #[test]
    fn empty_input_still_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garmin_health_data.csv");

        RecordSink::write(&[], &path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap().trim_end(),
            "date,hrv,resting_hr,sleep_duration,status"
        );
        assert!(RecordSink::read(&path, &periods()).unwrap().is_empty());
    }

    #[test]
    fn status_column_is_recomputed_on_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garmin_health_data.csv");
        std::fs::write(
            &path,
            "date,hrv,resting_hr,sleep_duration,status\n\
             2024-06-05,45.0,52.0,7.25,Sick\n\
             2024-06-06,,58.0,,Healthy\n",
        )
        .unwrap();

        let read = RecordSink::read(&path, &periods()).unwrap();
        assert_eq!(read[0].status(), HealthStatus::Healthy);
        assert_eq!(read[1].status(), HealthStatus::Sick);
        assert_eq!(read[1].resting_hr(), Some(58.0));

        let read = RecordSink::read(&path, &SickPeriods::default()).unwrap();
        assert!(read.iter().all(|r| r.status() == HealthStatus::Healthy));
    }

    #[test]
    fn malformed_date_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garmin_health_data.csv");
        std::fs::write(
            &path,
            "date,hrv,resting_hr,sleep_duration,status\nyesterday,,,,Healthy\n",
        )
        .unwrap();

        assert!(RecordSink::read(&path, &periods()).is_err());
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garmin_health_data.csv");
        std::fs::write(&path, "stale contents that are much longer than the new table\n").unwrap();

        RecordSink::write(&records()[..1], &path).unwrap();
        assert_eq!(RecordSink::read(&path, &periods()).unwrap().len(), 1);
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("data.csv");
        assert!(RecordSink::write(&records(), &path).is_err());
    }
}
