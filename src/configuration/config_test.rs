use anyhow::Result;

use super::Config;
use super::ConfigKey;
use crate::application::cli;
use crate::domain::models::SessionConfig;
use crate::domain::models::VendorName;

#[test]
fn it_serializes_to_valid_toml() {
    let res = Config::serialize_default(cli::build());
    let toml_res = res.parse::<toml_edit::Document>();
    assert!(toml_res.is_ok());

    insta::assert_snapshot!(res, @r###"
    # API key sent to OpenAI and Azure OpenAI endpoints.
    # api-key = ""

    # Time to wait in milliseconds before giving up on connecting to the endpoint.
    connect-timeout = 30000

    # Full chat endpoint URL the conversation starts on.
    endpoint = "http://localhost:11434/api/chat"

    # The model requested from the endpoint.
    model = "llama3"

    # Sampling temperature between 0.0 and 1.0.
    temperature = 0.0

    # The wire protocol spoken by the endpoint. [possible values: OLLAMA, OPENAI, AZURE_OPENAI]
    vendor = "OLLAMA"
    "###);
}

#[test]
fn it_defaults_config_file_to_config_dir() {
    let path = Config::default(ConfigKey::ConfigFile);
    assert!(path.ends_with("config.toml"));
    assert!(path.contains("assistant"));
}

// Loading writes to the process wide store, so every load happens in this one
// test.
#[tokio::test]
async fn it_loads_config_files() -> Result<()> {
    let matches = cli::build().try_get_matches_from(vec![
        "assistant",
        "-c",
        "./config.example.toml",
        "-m",
        "mistral",
    ])?;
    Config::load(cli::build(), vec![&matches]).await?;

    assert_eq!(Config::get(ConfigKey::Temperature), "0.2");
    assert_eq!(Config::get(ConfigKey::ConnectTimeout), "5000");
    assert_eq!(Config::get(ConfigKey::Model), "mistral");

    let config = SessionConfig::from_config()?;
    assert_eq!(config.endpoint(), "http://localhost:11434/api/chat");
    assert_eq!(config.model(), "mistral");
    assert_eq!(config.vendor(), VendorName::Ollama);
    assert_eq!(config.temperature(), 0.2);

    let matches =
        cli::build().try_get_matches_from(vec!["assistant", "-c", "./test/bad-config.toml"])?;
    let res = Config::load(cli::build(), vec![&matches]).await;
    insta::assert_snapshot!(res.unwrap_err().to_string(), @r###"
    config.toml has an invalid value for key 'vendor': skynet
    Possible values are: OLLAMA, OPENAI, AZURE_OPENAI
    "###);

    Config::set(ConfigKey::Temperature, "7");
    let res = SessionConfig::from_config();
    insta::assert_snapshot!(format!("{:#}", res.unwrap_err()), @"Failed to load temperature: Invalid temperature 7. Temperature must be a number between 0.0 and 1.0");

    return Ok(());
}
