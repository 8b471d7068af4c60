use serde_json::json;

/// One Ollama chat stream line carrying a single assistant message.
pub fn ollama_line(content: &str) -> String {
    return json!({
        "model": "llama3",
        "message": {
            "role": "assistant",
            "content": content
        },
        "done": false
    })
    .to_string();
}

/// Final Ollama line, which carries no content.
pub fn ollama_done_line() -> String {
    return json!({
        "model": "llama3",
        "message": {
            "role": "assistant",
            "content": ""
        },
        "done": true
    })
    .to_string();
}

/// One OpenAI chat completion chunk framed as a server sent event.
pub fn openai_line(content: &str) -> String {
    let chunk = json!({
        "id": "chatcmpl-123",
        "object": "chat.completion.chunk",
        "choices": [
            {
                "index": 0,
                "delta": {
                    "content": content
                }
            }
        ]
    });

    return format!("data: {chunk}");
}

pub fn ndjson_body(lines: &[String]) -> String {
    return lines.join("\n");
}
