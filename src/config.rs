use crate::transport::TransportChoice;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MODEL: &str = "openai/gpt-oss-20b";
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_LOCAL_URL: &str = "http://localhost:5173/api/extract";
pub const DEFAULT_USER_AGENT: &str = concat!("groq-health/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub groq: Groq,
    #[serde(default)]
    pub local: Local,
    #[serde(default)]
    pub http: Http,
    #[serde(default)]
    pub env: Env,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Groq {
    /// Last-resort key. Intentionally empty so no secret is ever committed.
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub api_key_env: String,
    pub model_env: String,
    pub transport: TransportChoice,
}
impl Default for Groq {
    fn default() -> Self {
        Self {
            api_key: "".into(),
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key_env: "GROQ_API_KEY".into(),
            model_env: "GROQ_MODEL".into(),
            transport: TransportChoice::Auto,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Local {
    pub enabled: bool,
    pub url: String,
}
impl Default for Local {
    fn default() -> Self {
        Self {
            enabled: false,
            url: DEFAULT_LOCAL_URL.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Http {
    pub timeout_seconds: f64,
    pub user_agent: String,
}
impl Default for Http {
    fn default() -> Self {
        Self {
            timeout_seconds: 45.0,
            user_agent: DEFAULT_USER_AGENT.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Env {
    pub file: String,
}
impl Default for Env {
    fn default() -> Self {
        Self {
            file: ".env".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            json: false,
            write_to_file: false,
            file_path: "groq-health.log".into(),
        }
    }
}
