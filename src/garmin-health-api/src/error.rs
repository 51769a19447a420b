use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {path} failed: {source}")]
    Http {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{path} returned {status}")]
    Status { path: String, status: StatusCode },
    #[error("{path} returned invalid JSON: {source}")]
    InvalidJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{field}: expected a number, got {value}")]
    UnexpectedType {
        field: &'static str,
        value: serde_json::Value,
    },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("malformed session file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("login request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("login rejected ({0})")]
    AuthRejected(StatusCode),
    #[error("sign-in page did not contain a CSRF token")]
    MissingCsrf,
    #[error("sign-in response did not contain a service ticket")]
    MissingTicket,
    #[error("invalid redirect: {0}")]
    Redirect(String),
    #[error("too many redirects")]
    TooManyRedirects,
}
