use super::{
    CallFailure, ClientConfig, ModelTransport, ResponseCreate, ResponseObject, TransportKind,
};
use crate::http::{ResponseBody, TransportError, build_client};
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("Error code: {status} - {message}")]
    Status { status: u16, message: String },
    #[error("invalid response body: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Typed client for the OpenAI-compatible Responses API.
pub struct ResponsesClient {
    http: Client,
    url: String,
    api_key: String,
    timeout: Duration,
}

impl ResponsesClient {
    pub fn new(cfg: &ClientConfig) -> Result<Self, TransportError> {
        Ok(Self {
            http: build_client(cfg.timeout, &cfg.user_agent)?,
            url: cfg.responses_url(),
            api_key: cfg.api_key.clone(),
            timeout: cfg.timeout,
        })
    }

    pub fn create(&self, request: &ResponseCreate) -> Result<ResponseObject, SdkError> {
        debug!(url = %self.url, model = %request.model, "responses.create");
        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .map_err(|e| TransportError::from_reqwest(&self.url, self.timeout, e))?;

        let status = resp.status();
        let raw = resp
            .text()
            .map_err(|e| TransportError::from_reqwest(&self.url, self.timeout, e))?;

        if !status.is_success() {
            return Err(SdkError::Status {
                status: status.as_u16(),
                message: api_error_message(raw),
            });
        }

        let parsed: ResponseObject = serde_json::from_str(&raw).map_err(SdkError::Decode)?;
        debug!(id = ?parsed.id, model = ?parsed.model, "responses.create ok");
        Ok(parsed)
    }
}

/// `error.message` from an API error envelope, or the whole body on one line.
fn api_error_message(raw: String) -> String {
    let body = ResponseBody::from_text(raw);
    if let ResponseBody::Json(v) = &body {
        if let Some(Value::String(msg)) = v.get("error").and_then(|e| e.get("message")) {
            return msg.clone();
        }
    }
    body.to_string()
}

impl ModelTransport for ResponsesClient {
    fn kind(&self) -> TransportKind {
        TransportKind::Sdk
    }

    fn output_text(&self, request: &ResponseCreate) -> Result<String, CallFailure> {
        Ok(self.create(request)?.output_text())
    }
}
