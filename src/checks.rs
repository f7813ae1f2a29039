use crate::extract::extract_json_object;
use crate::http::{ProbeRequest, ProbeResponse, post_json};
use crate::transport::{ModelTransport, ResponseCreate, TransportKind};
use serde::Serialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{info, warn};

pub const GROQ_CHECK: &str = "Groq key test";
pub const LOCAL_EXTRACT_CHECK: &str = "Local /api/extract test";

pub const GROQ_PROMPT: &str = r#"Return exactly JSON: {"ok": true, "source": "groq"}"#;

/// Synthetic utility-invoice extract with one well-formed EAN.
pub const LOCAL_EXTRACT_DOCUMENT: &str = "EAN: 123456789012345678\n\
Product: Elektra\n\
Tenaamstelling: Test BV\n\
KvK: 12345678\n\
IBAN: NL91ABNA0417164300\n\
Telemetriecode: ONBEKEND\n\
Leveringsadres: Stationsstraat 12 A\n\
Postcode: 1234 AB\n\
Plaats: Utrecht\n\
Marktsegment: KV\n";

pub const EAN_DIGITS: usize = 18;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub ok: bool,
    pub name: String,
    pub details: String,
}

impl CheckResult {
    pub fn pass(name: &str, details: impl Into<String>) -> Self {
        Self {
            ok: true,
            name: name.to_string(),
            details: details.into(),
        }
    }

    pub fn fail(name: &str, details: impl Into<String>) -> Self {
        Self {
            ok: false,
            name: name.to_string(),
            details: details.into(),
        }
    }
}

pub fn groq_request(model: &str) -> ResponseCreate {
    ResponseCreate {
        model: model.to_string(),
        input: GROQ_PROMPT.to_string(),
        temperature: 0.0,
    }
}

pub fn check_groq(transport: &dyn ModelTransport, model: &str) -> CheckResult {
    let kind = transport.kind();
    info!(transport = %kind, model, "running Groq probe");
    match transport.output_text(&groq_request(model)) {
        Ok(text) => evaluate_groq_text(kind, model, &text),
        Err(failure) => {
            warn!("Groq probe failed: {failure}");
            CheckResult::fail(GROQ_CHECK, failure.to_string())
        }
    }
}

/// Passes only when the text yields an object whose `ok` is exactly `true`.
pub fn evaluate_groq_text(kind: TransportKind, model: &str, text: &str) -> CheckResult {
    let confirmed = extract_json_object(text)
        .is_some_and(|obj| matches!(obj.get("ok"), Some(Value::Bool(true))));

    match (confirmed, kind) {
        (true, TransportKind::Sdk) => CheckResult::pass(
            GROQ_CHECK,
            format!("SDK call ok, model={model}, parsed JSON ok=true"),
        ),
        (true, TransportKind::Rest) => CheckResult::pass(
            GROQ_CHECK,
            format!("REST fallback ok, model={model}, parsed JSON ok=true"),
        ),
        (false, TransportKind::Sdk) => CheckResult::fail(
            GROQ_CHECK,
            format!("Model response not parseable as expected JSON. output_text={text:?}"),
        ),
        (false, TransportKind::Rest) => CheckResult::fail(
            GROQ_CHECK,
            format!("REST fallback JSON parse failed. output_text={text:?}"),
        ),
    }
}

pub fn local_extract_payload() -> Value {
    json!({
        "inputType": "text",
        "text": LOCAL_EXTRACT_DOCUMENT,
        "options": {
            "source": "OCR_PHOTO",
            "allowMultiple": false,
            "splitMode": "none",
        },
    })
}

pub fn check_local_extract(url: &str, timeout: Duration, user_agent: &str) -> CheckResult {
    info!(url, "running local extract probe");
    let req = ProbeRequest::new(url, local_extract_payload(), timeout)
        .header("User-Agent", user_agent);
    match post_json(&req) {
        Ok(resp) => evaluate_local_extract(&resp),
        Err(err) => {
            warn!("local extract probe failed: {err}");
            CheckResult::fail(LOCAL_EXTRACT_CHECK, format!("Request failed: {err}"))
        }
    }
}

pub fn evaluate_local_extract(resp: &ProbeResponse) -> CheckResult {
    if resp.status != 200 {
        return CheckResult::fail(
            LOCAL_EXTRACT_CHECK,
            format!("HTTP {} response: {}", resp.status, resp.body),
        );
    }

    let Some(body) = resp.body.as_object() else {
        return CheckResult::fail(
            LOCAL_EXTRACT_CHECK,
            format!("Unexpected response body type: {}", resp.body.kind()),
        );
    };

    let connections = match body.get("connections") {
        Some(Value::Array(list)) if !list.is_empty() => list,
        _ => {
            return CheckResult::fail(
                LOCAL_EXTRACT_CHECK,
                format!("No connections in response: {}", resp.body),
            );
        }
    };

    let first = connections[0].as_object();
    let ean = normalize_ean(first.and_then(|c| c.get("eanCode")));
    if !is_valid_ean(&ean) {
        let shown = first.map_or_else(
            || "{}".to_string(),
            |c| Value::Object(c.clone()).to_string(),
        );
        return CheckResult::fail(
            LOCAL_EXTRACT_CHECK,
            format!("Connection returned but EAN invalid ({ean:?}): {shown}"),
        );
    }

    let mut details = format!("HTTP 200, connections={}, first EAN valid", connections.len());
    if let Some(Value::String(warning)) = body.get("warning") {
        if !warning.is_empty() {
            details.push_str(&format!(", warning={warning:?}"));
        }
    }
    CheckResult::pass(LOCAL_EXTRACT_CHECK, details)
}

/// `eanCode` as text with spaces removed. Numbers are rendered as their digits.
pub fn normalize_ean(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.replace(' ', ""),
        Some(other) => other.to_string().replace(' ', ""),
    }
}

pub fn is_valid_ean(ean: &str) -> bool {
    ean.len() == EAN_DIGITS && ean.bytes().all(|b| b.is_ascii_digit())
}
