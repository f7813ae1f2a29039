use crate::checks::CheckResult;
use crate::transport::TransportKind;
use serde::Serialize;
use std::io::{self, Write};

/// Keeps enough of a key to recognise it without revealing it.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 10 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport<'a> {
    pub checked_at: String,
    pub key: String,
    pub model: &'a str,
    pub transport: TransportKind,
    pub ok: bool,
    pub results: &'a [CheckResult],
}

pub fn all_passed(results: &[CheckResult]) -> bool {
    results.iter().all(|r| r.ok)
}

pub fn write_header(out: &mut dyn Write, masked_key: &str, model: &str) -> io::Result<()> {
    writeln!(out, "Using key: {masked_key}")?;
    writeln!(out, "Using model: {model}")
}

pub fn write_results(out: &mut dyn Write, results: &[CheckResult]) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Results:")?;
    for result in results {
        writeln!(out, "{}", result_line(result))?;
    }
    Ok(())
}

pub fn result_line(result: &CheckResult) -> String {
    let prefix = if result.ok { "PASS" } else { "FAIL" };
    format!("- {prefix} | {}: {}", result.name, result.details)
}

pub fn write_json(out: &mut dyn Write, report: &RunReport<'_>) -> anyhow::Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(report)?)?;
    Ok(())
}
