use super::{CallFailure, ClientConfig, ModelTransport, ResponseCreate, TransportKind};
use crate::collect::collect_output_text;
use crate::http::{ProbeRequest, TransportError, build_client, post_json_with};
use reqwest::blocking::Client;
use std::time::Duration;

/// Raw POST through the probe client; the body is flattened by the collector.
pub struct RestTransport {
    http: Client,
    url: String,
    api_key: String,
    timeout: Duration,
}

impl RestTransport {
    pub fn new(cfg: &ClientConfig) -> Result<Self, TransportError> {
        Ok(Self {
            http: build_client(cfg.timeout, &cfg.user_agent)?,
            url: cfg.responses_url(),
            api_key: cfg.api_key.clone(),
            timeout: cfg.timeout,
        })
    }
}

impl ModelTransport for RestTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Rest
    }

    fn output_text(&self, request: &ResponseCreate) -> Result<String, CallFailure> {
        let payload = serde_json::to_value(request).map_err(TransportError::from)?;
        let req = ProbeRequest::new(&self.url, payload, self.timeout)
            .header("Authorization", format!("Bearer {}", self.api_key));

        let resp = post_json_with(&self.http, &req)?;
        if resp.status != 200 {
            return Err(CallFailure::Status {
                status: resp.status,
                body: resp.body,
            });
        }
        let Some(body) = resp.body.as_object() else {
            return Err(CallFailure::BodyType(resp.body.kind()));
        };
        Ok(collect_output_text(body))
    }
}
