#[macro_use]
extern crate log;

mod config;
pub use config::{Config, GarminHealthCli};

mod fetcher;
pub use fetcher::{DailyFetcher, DayOutcome, FailurePolicy, FetchReport};

mod sink;
pub use sink::RecordSink;

mod chart;
pub use chart::ChartRenderer;

mod orchestrator;
pub use orchestrator::{CredentialPrompt, Orchestrator, RunState, StdinPrompt};
