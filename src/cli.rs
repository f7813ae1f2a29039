use crate::{
    config::{Config, DEFAULT_MODEL, OutputFormat},
    env::Environment,
    orchestrator::{Orchestrator, ProbeSettings, RunStatus},
    transport::{ClientConfig, TransportChoice, select_transport},
    util::{ensure_dir, timeout_from_secs},
};
use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug, Default)]
#[command(name = "groq-health")]
#[command(about = "Test a Groq API key (+ optional local /api/extract endpoint)")]
pub struct Args {
    /// Groq API key (fallback: GROQ_API_KEY, then the config file).
    #[arg(long)]
    pub api_key: Option<String>,

    /// Groq model (fallback: GROQ_MODEL, then openai/gpt-oss-20b).
    #[arg(long)]
    pub model: Option<String>,

    /// Local extraction endpoint URL.
    #[arg(long)]
    pub local_url: Option<String>,

    /// Also run the local /api/extract test.
    #[arg(long)]
    pub test_local: bool,

    /// HTTP timeout in seconds.
    #[arg(long)]
    pub timeout: Option<f64>,

    /// How to reach Groq: typed client (sdk) or raw POST (rest). `auto` is the
    /// default and uses the typed client, which is always built in.
    #[arg(long, value_enum)]
    pub transport: Option<TransportChoice>,

    /// Override the Groq API base URL.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Env file with KEY=VALUE lines. Never overrides variables already set.
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Path to config TOML. If omitted, uses ./groq-health.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No API key found. Set {env_key} or pass --api-key.")]
    MissingCredential { env_key: String },
    #[error("invalid timeout {0}: must be a positive number of seconds")]
    InvalidTimeout(f64),
}

pub fn dispatch(args: Args) -> Result<RunStatus> {
    let cfg = match resolve_config_path(args.config.as_deref()) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    let _guard = init_logging(&args, &cfg)?;

    let mut env = Environment::from_process();
    let env_file = args
        .env_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(&cfg.env.file));
    env.merge_env_file(&env_file)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&args, &cfg, &env, &mut out)
}

/// Resolve settings and run the probes. Reports a missing API key on stderr
/// and returns before any request is made.
pub fn execute(
    args: &Args,
    cfg: &Config,
    env: &Environment,
    out: &mut dyn Write,
) -> Result<RunStatus> {
    let settings = match resolve_settings(args, cfg, env) {
        Ok(settings) => settings,
        Err(err @ ConfigError::MissingCredential { .. }) => {
            eprintln!("ERROR: {err}");
            return Ok(RunStatus::Misconfigured);
        }
        Err(err) => return Err(err.into()),
    };

    info!(
        model = %settings.model,
        transport = ?settings.transport,
        test_local = settings.test_local,
        "resolved settings"
    );
    let transport = select_transport(settings.transport, &settings.client)
        .with_context(|| "building Groq transport")?;

    Orchestrator::new(settings, transport).run(out)
}

/// Precedence for key and model: flag, environment (process, then env file),
/// config file, built-in default. Empty values count as unset.
pub fn resolve_settings(
    args: &Args,
    cfg: &Config,
    env: &Environment,
) -> Result<ProbeSettings, ConfigError> {
    let api_key = first_non_empty([
        args.api_key.as_deref(),
        env.get(&cfg.groq.api_key_env),
        Some(cfg.groq.api_key.as_str()),
    ])
    .ok_or_else(|| ConfigError::MissingCredential {
        env_key: cfg.groq.api_key_env.clone(),
    })?;

    let model = first_non_empty([
        args.model.as_deref(),
        env.get(&cfg.groq.model_env),
        Some(cfg.groq.model.as_str()),
    ])
    .unwrap_or(DEFAULT_MODEL);

    let secs = args.timeout.unwrap_or(cfg.http.timeout_seconds);
    let timeout = timeout_from_secs(secs).ok_or(ConfigError::InvalidTimeout(secs))?;

    Ok(ProbeSettings {
        client: ClientConfig {
            api_key: api_key.to_string(),
            base_url: args.base_url.clone().unwrap_or_else(|| cfg.groq.base_url.clone()),
            timeout,
            user_agent: cfg.http.user_agent.clone(),
        },
        model: model.to_string(),
        transport: args.transport.unwrap_or(cfg.groq.transport),
        local_url: args.local_url.clone().unwrap_or_else(|| cfg.local.url.clone()),
        test_local: args.test_local || cfg.local.enabled,
        format: args.format.unwrap_or(cfg.output.format),
    })
}

fn first_non_empty<'a, const N: usize>(candidates: [Option<&'a str>; N]) -> Option<&'a str> {
    candidates.into_iter().flatten().find(|v| !v.is_empty())
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    let default = PathBuf::from("groq-health.toml");
    default.exists().then_some(default)
}

fn init_logging(args: &Args, cfg: &Config) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries the report; logs go to stderr.
    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = resolve_log_path(cfg) {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(&path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file || cfg.logging.file_path.is_empty() {
        return None;
    }
    Some(PathBuf::from(&cfg.logging.file_path))
}
