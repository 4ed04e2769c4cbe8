//! Blocking HTTP transport for the Codacy API.
//!
//! The transport knows nothing about endpoints: it sends one request, maps a
//! non-2xx status to [`ApiError::Status`], and hands back the decoded JSON
//! body. Endpoint shapes live in [`super::client`].

use super::error::ApiError;
use crate::util::snippet;
use serde_json::Value;
use std::time::{Duration, Instant};

/// Public Codacy API v3 root.
pub const DEFAULT_BASE_URL: &str = "https://app.codacy.com/api/v3";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const ERROR_SNIPPET_BYTES: usize = 300;

/// HTTP methods used by the toggler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Method {
    Get,
    Post,
    Patch,
}

impl Method {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
        }
    }

    /// Whether the method changes remote state.
    pub(crate) fn is_mutating(self) -> bool {
        !matches!(self, Self::Get)
    }
}

/// Executes a single API request.
///
/// `body = None` sends no payload. A successful response with an empty body
/// yields `Ok(None)`.
pub(crate) trait Transport {
    fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Option<Value>, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Option<Value>, ApiError> {
        (**self).execute(method, path, query, body)
    }
}

/// ureq-backed transport authenticating with an account API token.
pub(crate) struct HttpTransport {
    base_url: String,
    api_token: String,
    agent: ureq::Agent,
}

impl HttpTransport {
    pub(crate) fn new(base_url: &str, api_token: &str) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .http_status_as_error(false)
            .build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
            agent: config.into(),
        }
    }

    fn prepare<B>(
        &self,
        request: ureq::RequestBuilder<B>,
        query: &[(&str, &str)],
    ) -> ureq::RequestBuilder<B> {
        let mut request = request
            .header("api-token", self.api_token.as_str())
            .header("Accept", "application/json");
        for (key, value) in query {
            request = request.query(*key, *value);
        }
        request
    }
}

impl Transport for HttpTransport {
    fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Option<Value>, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let start = Instant::now();

        let sent = match method {
            Method::Get => self.prepare(self.agent.get(url.as_str()), query).call(),
            Method::Post => {
                let request = self.prepare(self.agent.post(url.as_str()), query);
                match body {
                    Some(body) => request.send_json(body),
                    None => request.send_empty(),
                }
            }
            Method::Patch => {
                let request = self.prepare(self.agent.patch(url.as_str()), query);
                match body {
                    Some(body) => request.send_json(body),
                    None => request.send_empty(),
                }
            }
        };
        let mut response = sent.map_err(|err| ApiError::Request(err.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|err| ApiError::Request(format!("reading response: {err}")))?;

        tracing::debug!(
            method = method.as_str(),
            mutating = method.is_mutating(),
            path,
            status,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "api call complete"
        );

        if !(200..300).contains(&status) {
            return Err(ApiError::Status {
                status,
                snippet: snippet(&text, ERROR_SNIPPET_BYTES),
            });
        }
        decode_body(&text)
    }
}

fn decode_body(text: &str) -> Result<Option<Value>, ApiError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(text)?))
}
