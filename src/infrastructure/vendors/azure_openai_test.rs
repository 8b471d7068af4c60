use anyhow::Result;
use serde_json::json;

use super::AzureOpenAI;
use crate::domain::models::normalize_endpoint;
use crate::domain::models::Message;
use crate::domain::models::SessionConfig;
use crate::domain::models::SessionId;
use crate::domain::models::VendorName;
use crate::domain::models::VendorProtocol;

#[test]
fn it_routes_by_deployment() -> Result<()> {
    let mut config = SessionConfig::default();
    config.set_vendor("azure_openai")?;
    config.set_endpoint(&normalize_endpoint(
        "https://myresource.openai.azure.com",
        VendorName::AzureOpenai,
    )?)?;
    config.set_model("gpt4-deployment")?;
    config.set_api_key("azure-key")?;

    let req = AzureOpenAI::default().build_request(
        &config,
        &[Message::user("Hello")],
        &SessionId::generate(),
    )?;

    insta::assert_snapshot!(req.url, @"https://myresource.openai.azure.com/openai/deployments/gpt4-deployment/chat/completions?api-version=2024-02-01");
    assert_eq!(req.header("api-key"), Some("azure-key"));
    assert_eq!(req.header("Authorization"), Some("Bearer azure-key"));
    assert!(req.body.get("session_id").is_none());
    assert_eq!(req.body["model"], json!("gpt4-deployment"));
    assert_eq!(req.body["stream"], json!(true));

    return Ok(());
}

#[test]
fn it_decodes_openai_chunks() -> Result<()> {
    let backend = AzureOpenAI::default();
    let line = backend.frame_line("data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}");
    let envelope: serde_json::Value = serde_json::from_str(line.unwrap_or_default())?;

    let res = backend.parse_envelope(&envelope)?;
    assert_eq!(res.fragments, vec!["Hi".to_string()]);

    return Ok(());
}
