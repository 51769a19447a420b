#[macro_use]
extern crate log;

use clap::Parser;
use dotenv::dotenv;
use garmin_health::{Config, GarminHealthCli, Orchestrator, RunState, StdinPrompt};
use garmin_health_api::SessionManager;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let env_file = dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("reqwest", log::LevelFilter::Warn)
        .filter_module("hyper_util", log::LevelFilter::Warn)
        .filter_module("rustls", log::LevelFilter::Warn)
        .init();

    if let Err(error) = env_file {
        debug!("no .env loaded: {error}");
    }

    let cli = GarminHealthCli::parse();
    let prompt = StdinPrompt::new(cli.email.clone());
    let config = Config::try_from(cli)?;

    let mut orchestrator = Orchestrator::new(config, SessionManager::default(), prompt);
    if orchestrator.run().await? == RunState::Failed {
        info!("nothing fetched");
    }

    Ok(())
}
