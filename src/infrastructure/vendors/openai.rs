#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;
use serde_json::Value;

use crate::domain::models::find_error;
use crate::domain::models::find_session_id;
use crate::domain::models::ChatRequest;
use crate::domain::models::Envelope;
use crate::domain::models::Message;
use crate::domain::models::SessionConfig;
use crate::domain::models::SessionId;
use crate::domain::models::VendorName;
use crate::domain::models::VendorProtocol;

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(super) struct CompletionRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
    temperature: f64,
}

impl CompletionRequest {
    pub(super) fn new(config: &SessionConfig, history: &[Message]) -> CompletionRequest {
        return CompletionRequest {
            model: config.model().to_string(),
            messages: history.to_vec(),
            stream: true,
            temperature: config.temperature(),
        };
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionDeltaResponse {
    role: Option<String>,
    content: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionChoiceResponse {
    #[serde(default)]
    delta: CompletionDeltaResponse,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoiceResponse>,
}

pub(super) fn bearer_headers(api_key: &str) -> Vec<(String, String)> {
    return vec![
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Authorization".to_string(), format!("Bearer {api_key}")),
    ];
}

/// OpenAI compatible servers frame chunks as server sent events.
pub(super) fn frame_event_line(line: &str) -> Option<&str> {
    let mut cleaned_line = line.trim();
    if let Some(data) = cleaned_line.strip_prefix("data:") {
        cleaned_line = data.trim();
    }
    if cleaned_line.is_empty() || cleaned_line == "[DONE]" {
        return None;
    }

    return Some(cleaned_line);
}

pub(super) fn parse_chunk(envelope: &Value) -> Result<Envelope, serde_json::Error> {
    let ores: CompletionResponse = serde_json::from_value(envelope.clone())?;
    tracing::debug!(body = ?ores, "Completion response");

    let mut res = Envelope {
        session_id: find_session_id(envelope),
        error: find_error(envelope),
        ..Envelope::default()
    };

    // Azure sends leading chunks with no choices at all.
    if let Some(choice) = ores.choices.into_iter().next() {
        let delta = choice.delta;
        res.is_assistant_role = delta
            .role
            .as_deref()
            .map_or(true, |role| return role == "assistant");

        if let Some(content) = delta.content {
            if res.is_assistant_role && !content.is_empty() {
                res.fragments.push(content);
            }
        }
    }

    return Ok(res);
}

#[derive(Default)]
pub struct OpenAI {}

impl VendorProtocol for OpenAI {
    fn name(&self) -> VendorName {
        return VendorName::Openai;
    }

    fn build_request(
        &self,
        config: &SessionConfig,
        history: &[Message],
        _session_id: &SessionId,
    ) -> Result<ChatRequest, serde_json::Error> {
        let req = CompletionRequest::new(config, history);

        return Ok(ChatRequest {
            url: config.endpoint().to_string(),
            headers: bearer_headers(config.api_key()),
            body: serde_json::to_value(&req)?,
        });
    }

    fn frame_line<'a>(&self, line: &'a str) -> Option<&'a str> {
        return frame_event_line(line);
    }

    fn parse_envelope(&self, envelope: &Value) -> Result<Envelope, serde_json::Error> {
        return parse_chunk(envelope);
    }
}
