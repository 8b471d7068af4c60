#[cfg(test)]
#[path = "azure_openai_test.rs"]
mod tests;

use serde_json::Value;

use super::openai::bearer_headers;
use super::openai::frame_event_line;
use super::openai::parse_chunk;
use super::openai::CompletionRequest;
use crate::domain::models::ChatRequest;
use crate::domain::models::Envelope;
use crate::domain::models::Message;
use crate::domain::models::SessionConfig;
use crate::domain::models::SessionId;
use crate::domain::models::VendorName;
use crate::domain::models::VendorProtocol;

const API_VERSION: &str = "2024-02-01";

/// Azure speaks the OpenAI chunk format, but routes by deployment. The
/// configured model name is used as the deployment name.
#[derive(Default)]
pub struct AzureOpenAI {}

impl VendorProtocol for AzureOpenAI {
    fn name(&self) -> VendorName {
        return VendorName::AzureOpenai;
    }

    fn build_request(
        &self,
        config: &SessionConfig,
        history: &[Message],
        _session_id: &SessionId,
    ) -> Result<ChatRequest, serde_json::Error> {
        let req = CompletionRequest::new(config, history);

        let mut headers = bearer_headers(config.api_key());
        headers.push(("api-key".to_string(), config.api_key().to_string()));

        return Ok(ChatRequest {
            url: format!(
                "{endpoint}/{deployment}/chat/completions?api-version={API_VERSION}",
                endpoint = config.endpoint().trim_end_matches('/'),
                deployment = config.model(),
            ),
            headers,
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
