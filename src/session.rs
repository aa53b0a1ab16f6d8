//! Authenticated session handling
//!
//! The storefront authenticates via browser cookies. Extracting them from a
//! browser profile is the caller's concern; this crate only ever sees an
//! explicit [`Session`] value — an ordered set of cookie pairs — from which
//! the shared HTTP client is built. No ambient, process-wide authentication
//! state exists anywhere in the library.

use crate::config::HttpConfig;
use crate::error::{Error, Result};
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};

/// Credential bundle for one storefront account
#[derive(Clone, Default)]
pub struct Session {
    cookies: Vec<(String, String)>,
}

impl Session {
    /// Empty session; only public pages will be reachable
    pub fn new() -> Self {
        Self::default()
    }

    /// Session from cookie name/value pairs
    pub fn with_cookies<I, N, V>(cookies: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        Self {
            cookies: cookies
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }

    /// Add one cookie pair
    pub fn add_cookie(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.push((name.into(), value.into()));
    }

    /// Whether any credentials are present
    pub fn is_anonymous(&self) -> bool {
        self.cookies.is_empty()
    }

    /// The assembled `Cookie` header value, if any cookies are present
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Build the HTTP client all resolver and fetcher requests go through
    pub fn client(&self, http: &HttpConfig) -> Result<reqwest::Client> {
        let mut headers = HeaderMap::new();
        if let Some(header) = self.cookie_header() {
            let value = HeaderValue::from_str(&header).map_err(|e| Error::Config {
                message: format!("cookie values are not a valid header: {e}"),
                key: Some("session.cookies".to_string()),
            })?;
            headers.insert(COOKIE, value);
        }

        let client = reqwest::Client::builder()
            .timeout(http.request_timeout)
            .connect_timeout(http.connect_timeout)
            .user_agent(&http.user_agent)
            .default_headers(headers)
            .build()?;
        Ok(client)
    }
}

// Cookie values are credentials; keep them out of Debug output.
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field(
                "cookies",
                &self.cookies.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
