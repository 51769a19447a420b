use chrono::NaiveDate;
use serde_json::Value;

use crate::{ApiError, Session};

/// Anything that can answer a date-keyed metrics query with a JSON document.
#[allow(async_fn_in_trait)]
pub trait MetricsSource {
    async fn get_json(&self, path: &str) -> Result<Value, ApiError>;
}

impl MetricsSource for Session {
    async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        let request = self
            .http
            .get(self.endpoints.api_url(path))
            .header("NK", "NT");

        let response = self
            .with_cookies(request)
            .send()
            .await
            .map_err(|source| ApiError::Http {
                path: path.to_owned(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                path: path.to_owned(),
                status,
            });
        }

        let body = response.bytes().await.map_err(|source| ApiError::Http {
            path: path.to_owned(),
            source,
        })?;

        // 204 and empty 200 responses carry no data for the day.
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&body).map_err(|source| ApiError::InvalidJson {
            path: path.to_owned(),
            source,
        })
    }
}

/// The three daily metrics and where each one lives in its endpoint's
/// response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Hrv,
    RestingHeartRate,
    SleepDuration,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Hrv, Metric::RestingHeartRate, Metric::SleepDuration];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Hrv => "hrv",
            Metric::RestingHeartRate => "resting_hr",
            Metric::SleepDuration => "sleep_duration",
        }
    }

    pub fn endpoint(self, date: NaiveDate) -> String {
        let date = date.format("%Y-%m-%d");
        match self {
            Metric::Hrv => format!("/hrv-service/hrv/daily/{date}"),
            Metric::RestingHeartRate => format!("/userstats-service/wellness/daily/{date}"),
            Metric::SleepDuration => format!("/wellness-service/wellness/dailySleepData/{date}"),
        }
    }

    pub fn path(self) -> &'static [&'static str] {
        match self {
            Metric::Hrv => &["hrvSummary", "weeklyAvg"],
            Metric::RestingHeartRate => &["restingHeartRate"],
            Metric::SleepDuration => &["dailySleepDTO", "sleepTimeSeconds"],
        }
    }

    /// Factor applied to the raw value. Sleep is reported in seconds and
    /// recorded in hours.
    fn scale(self) -> f64 {
        match self {
            Metric::SleepDuration => 1.0 / 3600.0,
            _ => 1.0,
        }
    }

    /// Walks [`Metric::path`]. A missing key or a `null` is no value; anything
    /// present that isn't a number is an error.
    pub fn extract(self, response: &Value) -> Result<Option<f64>, ApiError> {
        let mut node = response;
        for key in self.path() {
            match node.get(key) {
                Some(next) => node = next,
                None => return Ok(None),
            }
        }

        match node {
            Value::Null => Ok(None),
            Value::Number(number) => match number.as_f64() {
                Some(value) => Ok(Some(value * self.scale())),
                None => Err(self.unexpected(node)),
            },
            other => Err(self.unexpected(other)),
        }
    }

    pub async fn fetch<S>(self, source: &S, date: NaiveDate) -> Result<Option<f64>, ApiError>
    where
        S: MetricsSource,
    {
        let response = source.get_json(&self.endpoint(date)).await?;
        self.extract(&response)
    }

    fn unexpected(self, value: &Value) -> ApiError {
        ApiError::UnexpectedType {
            field: self.name(),
            value: value.clone(),
        }
    }
}
