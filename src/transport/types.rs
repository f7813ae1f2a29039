use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
pub struct ResponseCreate {
    pub model: String,
    pub input: String,
    pub temperature: f32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseObject {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub output_text: Option<String>,
    #[serde(default)]
    pub output: Option<Vec<OutputItem>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputItem {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub content: Option<Vec<ContentPart>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub text: Option<PartText>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PartText {
    Plain(String),
    Annotated { value: String },
    Other(Value),
}

impl PartText {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PartText::Plain(s) => Some(s),
            PartText::Annotated { value } => Some(value),
            PartText::Other(_) => None,
        }
    }
}

impl ResponseObject {
    /// Aggregated assistant text: the `output_text` convenience field when the
    /// server sent one, otherwise every `output_text` part of every message item.
    /// Reasoning items are skipped.
    pub fn output_text(&self) -> String {
        if let Some(text) = &self.output_text {
            return text.clone();
        }
        let mut out = String::new();
        for item in self.output.iter().flatten() {
            if !matches!(item.kind.as_deref(), None | Some("message")) {
                continue;
            }
            for part in item.content.iter().flatten() {
                if !matches!(part.kind.as_deref(), None | Some("output_text")) {
                    continue;
                }
                if let Some(text) = part.text.as_ref().and_then(PartText::as_str) {
                    out.push_str(text);
                }
            }
        }
        out
    }
}
