use std::{
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;
use reqwest::{
    Client, RequestBuilder, Response, Url,
    header::{COOKIE, LOCATION, REFERER},
    redirect::Policy,
};
use serde::Serialize;

use crate::{SessionCookies, SessionError};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko)";
const MAX_REDIRECTS: usize = 10;

static CSRF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"name="_csrf"\s+value="([^"]+)""#).expect("valid regex")
});
static TICKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"ticket=([A-Za-z0-9\-]+)"#).expect("valid regex"));

/// Base URLs of the sign-on service and the connect web application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub sso: String,
    pub connect: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            sso: "https://sso.garmin.com".to_owned(),
            connect: "https://connect.garmin.com".to_owned(),
        }
    }
}

impl Endpoints {
    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}/modern/proxy{path}", self.connect.trim_end_matches('/'))
    }

    fn sign_in_url(&self) -> String {
        format!("{}/sso/signin", self.sso.trim_end_matches('/'))
    }

    fn service_url(&self) -> String {
        format!("{}/modern/", self.connect.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct SignInQuery<'a> {
    service: &'a str,
    #[serde(rename = "gauthHost")]
    gauth_host: &'a str,
    #[serde(rename = "clientId")]
    client_id: &'a str,
    #[serde(rename = "consumeServiceTicket")]
    consume_service_ticket: &'a str,
}

#[derive(Serialize)]
struct SignInForm<'a> {
    username: &'a str,
    password: &'a str,
    embed: &'a str,
    _csrf: &'a str,
}

/// Authenticated client handle. Validity of the cookies is only discovered on
/// the first API call.
pub struct Session {
    pub(crate) http: Client,
    pub(crate) cookies: SessionCookies,
    pub(crate) endpoints: Endpoints,
}

impl Session {
    pub fn from_cookies(
        cookies: SessionCookies,
        endpoints: Endpoints,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: http_client()?,
            cookies,
            endpoints,
        })
    }

    pub fn cookies(&self) -> &SessionCookies {
        &self.cookies
    }

    pub(crate) fn with_cookies(&self, request: RequestBuilder) -> RequestBuilder {
        match self.cookies.header_value() {
            Some(value) => request.header(COOKIE, value),
            None => request,
        }
    }

    async fn send(&mut self, request: RequestBuilder) -> Result<Response, SessionError> {
        let response = self.with_cookies(request).send().await?;
        self.cookies.absorb(response.headers());
        Ok(response)
    }

    /// GET that follows redirects by hand so every hop's cookies are kept.
    async fn follow(&mut self, url: &str) -> Result<Response, SessionError> {
        let mut url = Url::parse(url).map_err(|e| SessionError::Redirect(e.to_string()))?;

        for _ in 0..MAX_REDIRECTS {
            let request = self.http.get(url.clone());
            let response = self.send(request).await?;
            if !response.status().is_redirection() {
                return Ok(response);
            }

            let Some(location) = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
            else {
                return Ok(response);
            };

            debug!("following redirect to {location}");
            url = url
                .join(location)
                .map_err(|e| SessionError::Redirect(e.to_string()))?;
        }

        Err(SessionError::TooManyRedirects)
    }

    async fn login(
        endpoints: Endpoints,
        identity: &str,
        secret: &str,
    ) -> Result<Self, SessionError> {
        let mut session = Self::from_cookies(SessionCookies::default(), endpoints)?;

        let sign_in = session.endpoints.sign_in_url();
        let service = session.endpoints.service_url();
        let gauth_host = format!("{}/sso", session.endpoints.sso.trim_end_matches('/'));
        let query = SignInQuery {
            service: &service,
            gauth_host: &gauth_host,
            client_id: "GarminConnect",
            consume_service_ticket: "false",
        };

        let page = session.http.get(&sign_in).query(&query);
        let page = session.send(page).await?;
        if !page.status().is_success() {
            return Err(SessionError::AuthRejected(page.status()));
        }
        let page = page.text().await?;

        let csrf = CSRF
            .captures(&page)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_owned())
            .ok_or(SessionError::MissingCsrf)?;

        let form = SignInForm {
            username: identity,
            password: secret,
            embed: "false",
            _csrf: &csrf,
        };
        let submit = session
            .http
            .post(&sign_in)
            .query(&query)
            .header(REFERER, sign_in.as_str())
            .form(&form);
        let submit = session.send(submit).await?;
        if !submit.status().is_success() {
            return Err(SessionError::AuthRejected(submit.status()));
        }
        let body = submit.text().await?;

        let ticket = TICKET
            .captures(&body)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_owned())
            .ok_or(SessionError::MissingTicket)?;

        let landing = format!("{service}?ticket={ticket}");
        let landing = session.follow(&landing).await?;
        if !landing.status().is_success() {
            return Err(SessionError::AuthRejected(landing.status()));
        }

        info!("signed in ({} cookies)", session.cookies.len());
        Ok(session)
    }
}

fn http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(Policy::none())
        .build()
}

/// Writes next to `path` first and renames over it, so a failure never
/// leaves a truncated file behind.
fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, contents)?;
    if let Err(error) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(error);
    }

    Ok(())
}

/// Loads persisted sessions and creates new ones by signing in.
#[derive(Debug, Clone, Default)]
pub struct SessionManager {
    endpoints: Endpoints,
}

impl SessionManager {
    pub fn new(endpoints: Endpoints) -> Self {
        Self { endpoints }
    }

    /// Restores the cookies saved at `path`, logging the cause on failure.
    pub fn load_session(&self, path: &Path) -> Option<Session> {
        match self.try_load(path) {
            Ok(session) => {
                info!("session loaded from {}", path.display());
                Some(session)
            }
            Err(error) => {
                warn!("error loading session: {error}");
                None
            }
        }
    }

    pub fn try_load(&self, path: &Path) -> Result<Session, SessionError> {
        if !path.exists() {
            return Err(SessionError::NotFound(path.to_owned()));
        }

        let content = fs::read_to_string(path)?;
        let cookies: SessionCookies = serde_json::from_str(&content)?;
        Ok(Session::from_cookies(cookies, self.endpoints.clone())?)
    }

    /// Signs in and persists the resulting cookies to `path`, replacing any
    /// previous file. Nothing is written unless the sign-in succeeds.
    pub async fn save_session(&self, identity: &str, secret: &str, path: &Path) -> Option<Session> {
        match self.try_save(identity, secret, path).await {
            Ok(session) => {
                info!("session token saved to {}", path.display());
                Some(session)
            }
            Err(error) => {
                error!("error during login: {error}");
                None
            }
        }
    }

    pub async fn try_save(
        &self,
        identity: &str,
        secret: &str,
        path: &Path,
    ) -> Result<Session, SessionError> {
        let session = Session::login(self.endpoints.clone(), identity, secret).await?;
        let content = serde_json::to_vec(session.cookies())?;
        write_atomic(path, &content)?;
        Ok(session)
    }
}
