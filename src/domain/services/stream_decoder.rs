#[cfg(test)]
#[path = "stream_decoder_test.rs"]
mod tests;

use thiserror::Error;

use crate::domain::models::StreamFragment;
use crate::domain::models::VendorRef;

#[derive(Debug, Error)]
#[error("Skipped malformed response line {line:?}: {source}")]
pub struct DecodeError {
    pub line: String,
    #[source]
    pub source: serde_json::Error,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct DecodedLine {
    pub fragments: Vec<StreamFragment>,
    pub session_id: Option<String>,
    pub error: Option<String>,
}

/// Turns response body lines into fragments one line at a time, keeping the
/// transcript assembled so far.
pub struct StreamDecoder {
    vendor: VendorRef,
    text: String,
    first_fragment_seen: bool,
}

impl StreamDecoder {
    pub fn new(vendor: VendorRef) -> StreamDecoder {
        return StreamDecoder {
            vendor,
            text: "".to_string(),
            first_fragment_seen: false,
        };
    }

    pub fn decode_line(&mut self, line: &str) -> Result<DecodedLine, DecodeError> {
        let mut decoded = DecodedLine::default();
        let framed = match self.vendor.frame_line(line) {
            Some(framed) => framed,
            None => return Ok(decoded),
        };

        let envelope = serde_json::from_str::<serde_json::Value>(framed)
            .and_then(|value| return self.vendor.parse_envelope(&value))
            .map_err(|source| {
                return DecodeError {
                    line: framed.to_string(),
                    source,
                };
            })?;

        decoded.session_id = envelope.session_id;
        decoded.error = envelope.error;
        for text in envelope.fragments {
            self.text += &text;
            decoded.fragments.push(StreamFragment {
                text,
                is_first: !self.first_fragment_seen,
            });
            self.first_fragment_seen = true;
        }

        return Ok(decoded);
    }

    pub fn text(&self) -> &str {
        return &self.text;
    }
}
