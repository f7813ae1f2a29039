use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::debug;

pub type JsonObject = Map<String, Value>;

/// One way of pulling a JSON object out of free-form model output.
#[derive(Clone, Copy)]
pub struct Strategy {
    pub name: &'static str,
    pub run: fn(&str) -> Option<JsonObject>,
}

/// Tried in order, strictest first. The first strategy that yields an object wins.
pub const STRATEGIES: &[Strategy] = &[
    Strategy {
        name: "whole",
        run: parse_whole,
    },
    Strategy {
        name: "fenced",
        run: parse_fenced,
    },
    Strategy {
        name: "brace_span",
        run: parse_brace_span,
    },
];

static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)```(?:json)?\s*([\s\S]*?)\s*```").expect("fence pattern is valid")
});

pub fn extract_json_object(text: &str) -> Option<JsonObject> {
    if text.trim().is_empty() {
        return None;
    }
    for strategy in STRATEGIES {
        if let Some(obj) = (strategy.run)(text) {
            debug!(strategy = strategy.name, keys = obj.len(), "extracted JSON object");
            return Some(obj);
        }
    }
    debug!(len = text.len(), "no JSON object found in text");
    None
}

pub fn parse_whole(text: &str) -> Option<JsonObject> {
    parse_object(text.trim())
}

pub fn parse_fenced(text: &str) -> Option<JsonObject> {
    let caps = FENCE.captures(text)?;
    parse_object(caps.get(1)?.as_str())
}

pub fn parse_brace_span(text: &str) -> Option<JsonObject> {
    let first = text.find('{')?;
    let last = text.rfind('}')?;
    if last <= first {
        return None;
    }
    parse_object(&text[first..=last])
}

fn parse_object(candidate: &str) -> Option<JsonObject> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(obj)) => Some(obj),
        _ => None,
    }
}
