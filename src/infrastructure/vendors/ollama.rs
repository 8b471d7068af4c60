#[cfg(test)]
#[path = "ollama_test.rs"]
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
struct ChatOptions {
    temperature: f64,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
    session_id: String,
    options: ChatOptions,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ResponseMessage {
    role: String,
    #[serde(default)]
    content: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionResponse {
    message: Option<ResponseMessage>,
    messages: Option<Vec<ResponseMessage>>,
}

#[derive(Default)]
pub struct Ollama {}

impl VendorProtocol for Ollama {
    fn name(&self) -> VendorName {
        return VendorName::Ollama;
    }

    fn build_request(
        &self,
        config: &SessionConfig,
        history: &[Message],
        session_id: &SessionId,
    ) -> Result<ChatRequest, serde_json::Error> {
        let req = CompletionRequest {
            model: config.model().to_string(),
            messages: history.to_vec(),
            stream: true,
            session_id: session_id.as_str().to_string(),
            options: ChatOptions {
                temperature: config.temperature(),
            },
        };

        return Ok(ChatRequest {
            url: config.endpoint().to_string(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: serde_json::to_value(&req)?,
        });
    }

    fn parse_envelope(&self, envelope: &Value) -> Result<Envelope, serde_json::Error> {
        let ores: CompletionResponse = serde_json::from_value(envelope.clone())?;
        tracing::debug!(body = ?ores, "Completion response");

        // A `messages` array wins over a single `message` object.
        let messages = match ores.messages {
            Some(messages) => messages,
            None => ores.message.into_iter().collect(),
        };

        let assistant_messages = messages
            .into_iter()
            .filter(|msg| return msg.role == "assistant")
            .collect::<Vec<ResponseMessage>>();

        return Ok(Envelope {
            is_assistant_role: !assistant_messages.is_empty(),
            fragments: assistant_messages
                .into_iter()
                .map(|msg| return msg.content)
                .filter(|content| return !content.is_empty())
                .collect(),
            session_id: find_session_id(envelope),
            error: find_error(envelope),
        });
    }
}
