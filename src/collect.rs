use crate::extract::JsonObject;
use serde_json::Value;

/// Flatten a Responses-API body into plain text.
///
/// Prefers the top-level `output_text` string. Otherwise walks
/// `output[].content[].text`, where `text` is either a string or an object
/// carrying a string `value`. Anything mistyped along the way is skipped.
pub fn collect_output_text(body: &JsonObject) -> String {
    if let Some(Value::String(text)) = body.get("output_text") {
        return text.trim().to_string();
    }

    let Some(Value::Array(output)) = body.get("output") else {
        return String::new();
    };

    let mut collected: Vec<&str> = Vec::new();
    for item in output {
        let Some(Value::Array(content)) = item.get("content") else {
            continue;
        };
        for part in content {
            match part.get("text") {
                Some(Value::String(text)) => collected.push(text),
                Some(Value::Object(text)) => {
                    if let Some(Value::String(value)) = text.get("value") {
                        collected.push(value);
                    }
                }
                _ => {}
            }
        }
    }

    collected.join("\n").trim().to_string()
}
