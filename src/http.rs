use crate::extract::JsonObject;
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub url: String,
    pub payload: Value,
    pub headers: BTreeMap<String, String>,
    pub timeout: Duration,
}

impl ProbeRequest {
    pub fn new(url: impl Into<String>, payload: Value, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            payload,
            headers: BTreeMap::new(),
            timeout,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Response body as received: parsed JSON when the bytes were valid JSON,
/// the decoded text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    pub fn from_text(raw: String) -> Self {
        match serde_json::from_str::<Value>(&raw) {
            Ok(v) => ResponseBody::Json(v),
            Err(_) => ResponseBody::Text(raw),
        }
    }

    pub fn as_object(&self) -> Option<&JsonObject> {
        match self {
            ResponseBody::Json(Value::Object(obj)) => Some(obj),
            _ => None,
        }
    }

    /// Short name of the body's shape, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            ResponseBody::Json(Value::Object(_)) => "object",
            ResponseBody::Json(Value::Array(_)) => "array",
            ResponseBody::Json(Value::String(_)) => "string",
            ResponseBody::Json(Value::Number(_)) => "number",
            ResponseBody::Json(Value::Bool(_)) => "bool",
            ResponseBody::Json(Value::Null) => "null",
            ResponseBody::Text(_) => "text",
        }
    }
}

/// Single-line rendering: compact JSON, or the raw text quoted and escaped.
impl fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseBody::Json(v) => write!(f, "{v}"),
            ResponseBody::Text(s) => write!(f, "{s:?}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub status: u16,
    pub body: ResponseBody,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {}", report(.0))]
    Client(#[source] reqwest::Error),
    #[error("invalid header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: String },
    #[error("failed to encode request payload: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },
    #[error("request to {url} failed: {}", report(.source))]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl TransportError {
    pub(crate) fn from_reqwest(url: &str, timeout: Duration, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout {
                url: url.to_string(),
                timeout,
            }
        } else {
            TransportError::Request {
                url: url.to_string(),
                source: err,
            }
        }
    }
}

/// Flatten an error chain onto one line.
pub(crate) fn report(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = err.to_string();
    while let Some(src) = err.source() {
        let next = src.to_string();
        if !s.contains(&next) {
            s.push_str(": ");
            s.push_str(&next);
        }
        err = src;
    }
    s
}

pub(crate) fn build_client(timeout: Duration, user_agent: &str) -> Result<Client, TransportError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(TransportError::Client)
}

/// Caller headers override the defaults only when they carry a value, so
/// `Content-Type` is always present.
pub fn merge_headers(extra: &BTreeMap<String, String>) -> Result<HeaderMap, TransportError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    for (name, value) in extra {
        if value.is_empty() {
            continue;
        }
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| TransportError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        let header_value =
            HeaderValue::from_str(value).map_err(|e| TransportError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

pub fn post_json(req: &ProbeRequest) -> Result<ProbeResponse, TransportError> {
    let client = build_client(req.timeout, crate::config::DEFAULT_USER_AGENT)?;
    post_json_with(&client, req)
}

/// Non-2xx responses come back as `Ok`; only transport failures are errors.
pub fn post_json_with(
    client: &Client,
    req: &ProbeRequest,
) -> Result<ProbeResponse, TransportError> {
    let headers = merge_headers(&req.headers)?;
    let body = serde_json::to_vec(&req.payload)?;

    debug!(url = %req.url, timeout = ?req.timeout, "POST");
    let resp = client
        .post(&req.url)
        .headers(headers)
        .timeout(req.timeout)
        .body(body)
        .send()
        .map_err(|e| TransportError::from_reqwest(&req.url, req.timeout, e))?;

    let status = resp.status().as_u16();
    let raw = resp
        .text()
        .map_err(|e| TransportError::from_reqwest(&req.url, req.timeout, e))?;
    debug!(url = %req.url, status, bytes = raw.len(), "response");

    Ok(ProbeResponse {
        status,
        body: ResponseBody::from_text(raw),
    })
}
