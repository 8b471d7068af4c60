use anyhow::Result;
use test_utils::ollama_done_line;
use test_utils::ollama_line;
use test_utils::openai_line;

use super::StreamDecoder;
use crate::domain::models::StreamFragment;
use crate::domain::models::VendorName;
use crate::infrastructure::vendors::VendorManager;

fn fragment(text: &str, is_first: bool) -> StreamFragment {
    return StreamFragment {
        text: text.to_string(),
        is_first,
    };
}

#[test]
fn it_reassembles_fragments() -> Result<()> {
    let mut decoder = StreamDecoder::new(VendorManager::get(VendorName::Ollama));

    let first = decoder.decode_line(&ollama_line("Hel"))?;
    let second = decoder.decode_line(&ollama_line("lo"))?;
    let last = decoder.decode_line(&ollama_done_line())?;

    assert_eq!(first.fragments, vec![fragment("Hel", true)]);
    assert_eq!(second.fragments, vec![fragment("lo", false)]);
    assert!(last.fragments.is_empty());
    assert_eq!(decoder.text(), "Hello");

    return Ok(());
}

#[test]
fn it_produces_nothing_for_metadata_lines() -> Result<()> {
    let mut decoder = StreamDecoder::new(VendorManager::get(VendorName::Ollama));

    let decoded = decoder.decode_line(r#"{"session_id":"from-server"}"#)?;
    assert!(decoded.fragments.is_empty());
    assert_eq!(decoded.session_id, Some("from-server".to_string()));

    let next = decoder.decode_line(&ollama_line("Hi"))?;
    assert_eq!(next.fragments, vec![fragment("Hi", true)]);

    return Ok(());
}

#[test]
fn it_skips_blank_lines() -> Result<()> {
    let mut decoder = StreamDecoder::new(VendorManager::get(VendorName::Ollama));

    let decoded = decoder.decode_line("   ")?;
    assert!(decoded.fragments.is_empty());
    assert_eq!(decoded.session_id, None);

    return Ok(());
}

#[test]
fn it_reports_malformed_lines_and_keeps_going() -> Result<()> {
    let mut decoder = StreamDecoder::new(VendorManager::get(VendorName::Ollama));

    decoder.decode_line(&ollama_line("a"))?;
    let err = decoder.decode_line("{not json").unwrap_err();
    let decoded = decoder.decode_line(&ollama_line("b"))?;

    assert_eq!(err.line, "{not json");
    assert_eq!(decoded.fragments, vec![fragment("b", false)]);
    assert_eq!(decoder.text(), "ab");

    return Ok(());
}

#[test]
fn it_decodes_openai_event_streams() -> Result<()> {
    let mut decoder = StreamDecoder::new(VendorManager::get(VendorName::Openai));

    let first = decoder.decode_line(&openai_line("Hello "))?;
    let done = decoder.decode_line("data: [DONE]")?;

    assert_eq!(first.fragments, vec![fragment("Hello ", true)]);
    assert!(done.fragments.is_empty());

    return Ok(());
}

#[test]
fn it_passes_in_band_errors_through() -> Result<()> {
    let mut decoder = StreamDecoder::new(VendorManager::get(VendorName::Ollama));

    let decoded = decoder.decode_line(r#"{"error":"out of memory"}"#)?;
    assert!(decoded.fragments.is_empty());
    assert_eq!(decoded.error, Some("out of memory".to_string()));

    return Ok(());
}
