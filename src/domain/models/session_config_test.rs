use anyhow::Result;

use super::normalize_endpoint;
use super::ConfigChange;
use super::SessionConfig;
use crate::domain::models::ErrorKind;
use crate::domain::models::VendorName;

#[test]
fn it_has_defaults() {
    let config = SessionConfig::default();
    assert_eq!(config.endpoint(), "http://localhost:11434/api/chat");
    assert_eq!(config.model(), "llama3");
    assert_eq!(config.vendor(), VendorName::Ollama);
    assert_eq!(config.api_key(), "");
    assert_eq!(config.temperature(), 0.0);
}

#[test]
fn it_normalizes_bare_hosts() -> Result<()> {
    let endpoint = normalize_endpoint("example.com:9999", VendorName::Ollama)?;
    assert_eq!(endpoint, "http://example.com:9999/api/chat");

    return Ok(());
}

#[test]
fn it_normalizes_with_vendor_paths() -> Result<()> {
    assert_eq!(
        normalize_endpoint("https://api.openai.com", VendorName::Openai)?,
        "https://api.openai.com/v1/chat/completions"
    );
    assert_eq!(
        normalize_endpoint("myresource.openai.azure.com/", VendorName::AzureOpenai)?,
        "http://myresource.openai.azure.com/openai/deployments"
    );

    return Ok(());
}

#[test]
fn it_does_not_append_the_chat_path_twice() -> Result<()> {
    let endpoint = normalize_endpoint("localhost:11434/api/chat", VendorName::Ollama)?;
    assert_eq!(endpoint, "http://localhost:11434/api/chat");

    return Ok(());
}

#[test]
fn it_appends_the_chat_path_ahead_of_the_query() -> Result<()> {
    let endpoint = normalize_endpoint("host:1/?x=1", VendorName::Ollama)?;
    assert_eq!(endpoint, "http://host:1/api/chat?x=1");

    let endpoint = normalize_endpoint("https://proxy.local/llm/#docs", VendorName::Openai)?;
    assert_eq!(endpoint, "https://proxy.local/llm/v1/chat/completions#docs");

    return Ok(());
}

#[test]
fn it_rejects_bad_endpoints() {
    for host in ["", "  ", "ftp://example.com", "http://exa mple.com", "file:///tmp"] {
        let err = normalize_endpoint(host, VendorName::Ollama).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidEndpointFormat, "host {host:?}");
    }
}

#[test]
fn it_keeps_the_endpoint_on_rejection() {
    let mut config = SessionConfig::default();
    let res = config.set_endpoint("ftp://example.com/api/chat");

    assert_eq!(res.unwrap_err().kind(), ErrorKind::InvalidEndpointFormat);
    assert_eq!(config.endpoint(), "http://localhost:11434/api/chat");
}

#[test]
fn it_sets_temperature_in_range() -> Result<()> {
    let mut config = SessionConfig::default();
    assert_eq!(config.set_temperature("0.7")?, 0.7);
    assert_eq!(config.temperature(), 0.7);

    assert_eq!(config.set_temperature("1")?, 1.0);
    assert_eq!(config.set_temperature("0.0")?, 0.0);

    return Ok(());
}

#[test]
fn it_rejects_temperature_out_of_range() {
    let mut config = SessionConfig::default();
    config.set_temperature("0.3").unwrap();

    for value in ["1.5", "-0.1", "warm", "", "NaN", "inf"] {
        let err = config.set_temperature(value).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTemperature, "value {value:?}");
    }
    assert_eq!(config.temperature(), 0.3);
}

#[test]
fn it_sets_vendors_case_insensitively() -> Result<()> {
    let mut config = SessionConfig::default();
    assert_eq!(config.set_vendor("openai")?, VendorName::Openai);
    assert_eq!(config.vendor(), VendorName::Openai);

    return Ok(());
}

#[test]
fn it_rejects_unknown_vendors() {
    let mut config = SessionConfig::default();
    let err = config.set_vendor("gemini").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidVendor);
    assert_eq!(config.vendor(), VendorName::Ollama);
    insta::assert_snapshot!(err.to_string(), @"Invalid vendor gemini. Supported vendors: OLLAMA, OPENAI, AZURE_OPENAI");
}

#[test]
fn it_requires_model_and_api_key_values() {
    let mut config = SessionConfig::default();
    assert_eq!(config.set_model(" ").unwrap_err().kind(), ErrorKind::MissingArgument);
    assert_eq!(config.set_api_key("").unwrap_err().kind(), ErrorKind::MissingArgument);
    assert_eq!(config.model(), "llama3");
}

#[test]
fn it_renders_confirmations() {
    let changes = [
        ConfigChange::Endpoint("http://example.com:9999/api/chat".to_string()),
        ConfigChange::Model("mistral".to_string()),
        ConfigChange::Vendor(VendorName::AzureOpenai),
        ConfigChange::ApiKey,
        ConfigChange::Temperature(1.0),
        ConfigChange::Temperature(0.7),
    ]
    .iter()
    .map(|change| return change.to_string())
    .collect::<Vec<String>>()
    .join("\n");

    insta::assert_snapshot!(changes, @r###"
    Endpoint changed to http://example.com:9999/api/chat
    Model changed to mistral
    Vendor changed to AZURE_OPENAI
    API key updated
    Temperature changed to 1.0
    Temperature changed to 0.7
    "###);
}
