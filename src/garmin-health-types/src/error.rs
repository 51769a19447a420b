use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PeriodError {
    #[error("period starts after it ends: {start} > {end}")]
    Reversed { start: NaiveDate, end: NaiveDate },
    #[error("expected `START..END`, got `{0}`")]
    Format(String),
    #[error("invalid date: {0}")]
    Date(#[from] chrono::ParseError),
}
