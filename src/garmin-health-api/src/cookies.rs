use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, SET_COOKIE};
use serde::{Deserialize, Serialize};

/// Cookie name to value, persisted as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionCookies(BTreeMap<String, String>);

impl SessionCookies {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Applies every `Set-Cookie` header. An empty value clears the cookie.
    pub fn absorb(&mut self, headers: &HeaderMap) {
        for header in headers.get_all(SET_COOKIE) {
            let Ok(header) = header.to_str() else {
                continue;
            };

            let pair = header.split(';').next().unwrap_or_default();
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };

            let name = name.trim();
            let value = value.trim().trim_matches('"');
            if name.is_empty() {
                continue;
            }

            if value.is_empty() {
                self.0.remove(name);
            } else {
                self.0.insert(name.to_owned(), value.to_owned());
            }
        }
    }

    /// Value for a `Cookie` request header, `None` when there is nothing to send.
    pub fn header_value(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }

        let value = self
            .0
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");

        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;

    #[test]
    fn absorbs_set_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("SESSIONID=abc123; Path=/; Secure; HttpOnly"),
        );
        headers.append(SET_COOKIE, HeaderValue::from_static("GARMIN-SSO=1; Domain=.garmin.com"));
        headers.append(SET_COOKIE, HeaderValue::from_static("broken-header"));

        let mut cookies = SessionCookies::default();
        cookies.absorb(&headers);

        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies.get("SESSIONID"), Some("abc123"));
        assert_eq!(cookies.get("GARMIN-SSO"), Some("1"));
    }

    #[test]
    fn empty_value_clears_cookie() {
        let mut cookies = SessionCookies::default();
        cookies.insert("SESSIONID", "abc");

        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("SESSIONID=; Max-Age=0"));
        cookies.absorb(&headers);

        assert!(cookies.is_empty());
        assert_eq!(cookies.header_value(), None);
    }

    #[test]
    fn header_value_joins_pairs() {
        let mut cookies = SessionCookies::default();
        cookies.insert("b", "2");
        cookies.insert("a", "1");
        assert_eq!(cookies.header_value().as_deref(), Some("a=1; b=2"));
    }

    #[test]
    fn persists_as_flat_object() {
        let mut cookies = SessionCookies::default();
        cookies.insert("SESSIONID", "abc");

        let json = serde_json::to_string(&cookies).unwrap();
        assert_eq!(json, r#"{"SESSIONID":"abc"}"#);
        assert_eq!(serde_json::from_str::<SessionCookies>(&json).unwrap(), cookies);
    }
}
