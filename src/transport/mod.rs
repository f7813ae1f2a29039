pub mod rest;
pub mod sdk;
pub mod types;

use crate::http::{ResponseBody, TransportError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub use rest::RestTransport;
pub use sdk::{ResponsesClient, SdkError};
pub use types::{ResponseCreate, ResponseObject};

/// Which Groq delivery path to use. Both are always compiled in, so `auto`
/// resolves to the typed client and `rest` is only used when asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransportChoice {
    #[default]
    Auto,
    Sdk,
    Rest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Sdk,
    Rest,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Sdk => f.write_str("sdk"),
            TransportKind::Rest => f.write_str("rest"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CallFailure {
    #[error("SDK call failed: {0}")]
    Sdk(#[from] SdkError),
    #[error("REST fallback failed (HTTP {status}): {body}")]
    Status { status: u16, body: ResponseBody },
    #[error("REST fallback response type invalid: {0}")]
    BodyType(&'static str),
    #[error("REST fallback request failed: {0}")]
    Transport(#[from] TransportError),
}

/// Delivers one Responses-API request and hands back the flattened output text.
pub trait ModelTransport {
    fn kind(&self) -> TransportKind;
    fn output_text(&self, request: &ResponseCreate) -> Result<String, CallFailure>;
}

#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    pub(crate) fn responses_url(&self) -> String {
        format!("{}/responses", self.base_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &crate::report::mask_secret(&self.api_key))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

pub fn select_transport(
    choice: TransportChoice,
    cfg: &ClientConfig,
) -> Result<Box<dyn ModelTransport>, TransportError> {
    let transport: Box<dyn ModelTransport> = match choice {
        TransportChoice::Auto | TransportChoice::Sdk => Box::new(ResponsesClient::new(cfg)?),
        TransportChoice::Rest => Box::new(RestTransport::new(cfg)?),
    };
    Ok(transport)
}
