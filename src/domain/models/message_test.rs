use anyhow::Result;
use serde_json::json;

use super::Message;
use super::Role;

#[test]
fn it_executes_new() {
    let msg = Message::new(Role::User, "Hi there!");
    assert_eq!(msg.role, Role::User);
    assert_eq!(msg.content, "Hi there!".to_string());
}

#[test]
fn it_builds_assistant_messages() {
    let msg = Message::assistant("How may I help you?");
    assert_eq!(msg.role, Role::Assistant);
    assert_eq!(msg.role.to_string(), "assistant");
}

#[test]
fn it_serializes_to_the_wire_shape() -> Result<()> {
    let value = serde_json::to_value(Message::user("Hello"))?;
    assert_eq!(value, json!({"role": "user", "content": "Hello"}));

    return Ok(());
}

#[test]
fn it_deserializes_lowercase_roles() -> Result<()> {
    let msg: Message = serde_json::from_str(r#"{"role":"assistant","content":"Hey"}"#)?;
    assert_eq!(msg, Message::assistant("Hey"));

    return Ok(());
}
