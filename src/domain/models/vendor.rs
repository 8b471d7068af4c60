#[cfg(test)]
#[path = "vendor_test.rs"]
mod tests;

use std::sync::Arc;

use serde_json::Value;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use strum::VariantNames;

use super::Message;
use super::SessionConfig;
use super::SessionId;

#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum VendorName {
    Ollama,
    Openai,
    AzureOpenai,
}

impl VendorName {
    /// Case-insensitive lookup, so `ollama` and `OLLAMA` both resolve.
    pub fn parse(text: &str) -> Option<VendorName> {
        let text = text.trim();
        return VendorName::iter().find(|e| return e.to_string().eq_ignore_ascii_case(text));
    }

    pub fn supported() -> String {
        return VendorName::VARIANTS.join(", ");
    }

    /// Path appended to a bare `host:port` when the endpoint is changed.
    pub fn chat_path(&self) -> &'static str {
        match self {
            VendorName::Ollama => return "/api/chat",
            VendorName::Openai => return "/v1/chat/completions",
            VendorName::AzureOpenai => return "/openai/deployments",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl ChatRequest {
    #[cfg(test)]
    pub fn header(&self, name: &str) -> Option<&str> {
        return self
            .headers
            .iter()
            .find(|(key, _)| return key.eq_ignore_ascii_case(name))
            .map(|(_, value)| return value.as_str());
    }
}

/// What a single decoded response line contributes to the exchange.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Envelope {
    pub fragments: Vec<String>,
    pub session_id: Option<String>,
    pub is_assistant_role: bool,
    /// Failure reported in-band by the server. It ends the exchange.
    pub error: Option<String>,
}

pub trait VendorProtocol {
    fn name(&self) -> VendorName;

    fn build_request(
        &self,
        config: &SessionConfig,
        history: &[Message],
        session_id: &SessionId,
    ) -> Result<ChatRequest, serde_json::Error>;

    /// Strips transport framing from a raw body line. `None` means the line
    /// carries nothing to decode.
    fn frame_line<'a>(&self, line: &'a str) -> Option<&'a str> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        return Some(trimmed);
    }

    fn parse_envelope(&self, envelope: &Value) -> Result<Envelope, serde_json::Error>;
}

pub type VendorRef = Arc<dyn VendorProtocol + Send + Sync>;

/// Depth-first search for the first string `session_id` field in an envelope.
pub fn find_session_id(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(id)) = map.get("session_id") {
                return Some(id.to_string());
            }

            return map.values().find_map(find_session_id);
        }
        Value::Array(items) => return items.iter().find_map(find_session_id),
        _ => return None,
    }
}

/// Reads an `error` field, either a plain string (Ollama) or an object with a
/// `message` (OpenAI compatible servers).
pub fn find_error(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::String(message) => return Some(message.to_string()),
        Value::Object(error) => {
            return error
                .get("message")
                .and_then(|e| return e.as_str())
                .map(|e| return e.to_string());
        }
        _ => return None,
    }
}
