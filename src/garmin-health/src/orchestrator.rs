use std::io::{self, BufRead, Write};

use anyhow::{Context, bail};
use garmin_health_api::{Session, SessionManager};
use garmin_health_types::HealthSummary;

use crate::{ChartRenderer, Config, DailyFetcher, RecordSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NoSession,
    Authenticating,
    Fetching,
    Persisting,
    Rendering,
    Done,
    Failed,
}

impl RunState {
    pub fn allows(self, next: RunState) -> bool {
        use RunState::*;

        matches!(
            (self, next),
            (NoSession, Authenticating)
                | (NoSession, Fetching)
                | (Authenticating, Fetching)
                | (Authenticating, Failed)
                | (Fetching, Persisting)
                | (Persisting, Rendering)
                | (Persisting, Failed)
                | (Rendering, Done)
        )
    }
}

/// Source of the identity and secret used when no saved session works.
pub trait CredentialPrompt {
    fn credentials(&mut self) -> anyhow::Result<(String, String)>;
}

/// Reads the email and password from standard input.
pub struct StdinPrompt {
    email: Option<String>,
}

impl StdinPrompt {
    pub fn new(email: Option<String>) -> Self {
        Self { email }
    }

    fn ask(question: &str) -> anyhow::Result<String> {
        print!("{question}");
        io::stdout().flush()?;

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer)? == 0 {
            bail!("standard input closed");
        }

        Ok(answer.trim_end_matches(['\r', '\n']).to_owned())
    }
}

impl CredentialPrompt for StdinPrompt {
    fn credentials(&mut self) -> anyhow::Result<(String, String)> {
        let email = match self.email.take() {
            Some(email) => email,
            None => Self::ask("Enter your Garmin Connect email: ")?,
        };
        let password = Self::ask("Enter your Garmin Connect password: ")?;
        Ok((email, password))
    }
}

/// Runs authentication, fetching, persisting and rendering in order.
pub struct Orchestrator<P> {
    config: Config,
    sessions: SessionManager,
    prompt: P,
    state: RunState,
}

impl<P> Orchestrator<P>
where
    P: CredentialPrompt,
{
    pub fn new(config: Config, sessions: SessionManager, prompt: P) -> Self {
        Self {
            config,
            sessions,
            prompt,
            state: RunState::NoSession,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, next: RunState) {
        debug_assert!(self.state.allows(next), "{:?} -> {:?}", self.state, next);
        debug!("{:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Returns [`RunState::Failed`] when no session could be established.
    /// I/O and rendering errors are returned as errors.
    pub async fn run(&mut self) -> anyhow::Result<RunState> {
        let Some(session) = self.authenticate().await else {
            error!("failed to initialize Garmin Connect client");
            self.transition(RunState::Failed);
            return Ok(self.state);
        };

        self.transition(RunState::Fetching);
        let fetcher = DailyFetcher::new(&session, &self.config.sick_periods, self.config.delay);
        let report = fetcher
            .fetch_range(self.config.range, self.config.failure_policy)
            .await;

        self.transition(RunState::Persisting);
        let data = match RecordSink::write(&report.records, &self.config.data_path) {
            Ok(data) => data,
            Err(error) => {
                self.transition(RunState::Failed);
                return Err(error);
            }
        };
        info!("summary:\n{}", HealthSummary::new(&report.records));

        self.transition(RunState::Rendering);
        let renderer = ChartRenderer::new(&self.config.sick_periods, &self.config.image_path);
        let image = renderer.render(&data)?;
        if self.config.show {
            if let Err(error) = open::that(&image) {
                warn!("could not open {}: {error}", image.display());
            }
        }

        self.transition(RunState::Done);
        Ok(self.state)
    }

    async fn authenticate(&mut self) -> Option<Session> {
        if let Some(session) = self.sessions.load_session(&self.config.credential_path) {
            return Some(session);
        }

        info!("session token invalid or file missing, attempting re-login");
        self.transition(RunState::Authenticating);

        let (email, password) = match self
            .prompt
            .credentials()
            .context("failed to read credentials")
        {
            Ok(credentials) => credentials,
            Err(error) => {
                error!("{error:#}");
                return None;
            }
        };

        self.sessions
            .save_session(&email, &password, &self.config.credential_path)
            .await
    }
}
