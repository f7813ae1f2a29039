use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Snapshot of environment variables used for credential lookup.
///
/// Built once at startup from the process environment and then topped up from
/// an env file. The process environment itself is never modified.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    pub fn from_process() -> Self {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Merge `KEY=VALUE` lines from `path`. Keys that are already set, either
    /// in the snapshot or earlier in the same file, keep their value. A
    /// missing file is not an error. Returns how many keys were added.
    ///
    /// Values are taken literally: no quote stripping, no `$VAR` expansion.
    pub fn merge_env_file(&mut self, path: &Path) -> Result<usize> {
        if !path.exists() {
            debug!("env file not found: {}", path.display());
            return Ok(0);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading env file: {}", path.display()))?;

        let mut added = 0;
        for (idx, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = parse_line(line) else {
                warn!("skipping line {} in {}: no '='", idx + 1, path.display());
                continue;
            };
            if key.is_empty() || self.vars.contains_key(key) {
                continue;
            }
            self.vars.insert(key.to_string(), value.to_string());
            added += 1;
        }

        debug!("loaded {added} variable(s) from {}", path.display());
        Ok(added)
    }

    /// Value for `key`, treating an empty string as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// Split at the first `=`, trimming both sides.
fn parse_line(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    Some((key.trim(), value.trim()))
}
