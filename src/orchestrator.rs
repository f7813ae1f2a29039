use crate::{
    checks::{self, CheckResult},
    config::OutputFormat,
    report::{self, RunReport},
    transport::{ClientConfig, ModelTransport, TransportChoice},
    util::now_rfc3339,
};
use anyhow::Result;
use std::io::Write;
use std::time::Duration;
use tracing::info;

/// Everything a run needs once credentials and flags have been resolved.
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub client: ClientConfig,
    pub model: String,
    pub transport: TransportChoice,
    pub local_url: String,
    pub test_local: bool,
    pub format: OutputFormat,
}

impl ProbeSettings {
    pub fn timeout(&self) -> Duration {
        self.client.timeout
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Passed,
    Failed,
    /// Nothing was probed: the run could not be configured, e.g. no API key.
    Misconfigured,
}

impl RunStatus {
    pub fn code(self) -> i32 {
        match self {
            RunStatus::Passed => 0,
            RunStatus::Failed => 1,
            RunStatus::Misconfigured => 2,
        }
    }

    pub fn from_results(results: &[CheckResult]) -> Self {
        if report::all_passed(results) {
            RunStatus::Passed
        } else {
            RunStatus::Failed
        }
    }
}

pub struct Orchestrator {
    settings: ProbeSettings,
    transport: Box<dyn ModelTransport>,
}

impl Orchestrator {
    pub fn new(settings: ProbeSettings, transport: Box<dyn ModelTransport>) -> Self {
        Self {
            settings,
            transport,
        }
    }

    /// Groq first, then the local endpoint when enabled. A failure in one
    /// probe never stops the next.
    pub fn run_checks(&self) -> Vec<CheckResult> {
        let mut results = vec![checks::check_groq(&*self.transport, &self.settings.model)];

        if self.settings.test_local {
            results.push(checks::check_local_extract(
                &self.settings.local_url,
                self.settings.timeout(),
                &self.settings.client.user_agent,
            ));
        }

        for r in &results {
            info!(name = %r.name, ok = r.ok, "check finished");
        }
        results
    }

    pub fn run(&self, out: &mut dyn Write) -> Result<RunStatus> {
        let masked = report::mask_secret(&self.settings.client.api_key);

        if self.settings.format == OutputFormat::Text {
            report::write_header(out, &masked, &self.settings.model)?;
            out.flush()?;
        }

        let results = self.run_checks();
        let status = RunStatus::from_results(&results);

        match self.settings.format {
            OutputFormat::Text => report::write_results(out, &results)?,
            OutputFormat::Json => report::write_json(
                out,
                &RunReport {
                    checked_at: now_rfc3339(),
                    key: masked,
                    model: &self.settings.model,
                    transport: self.transport.kind(),
                    ok: status == RunStatus::Passed,
                    results: &results,
                },
            )?,
        }

        Ok(status)
    }
}
