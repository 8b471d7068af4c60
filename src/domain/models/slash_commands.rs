#[cfg(test)]
#[path = "slash_commands_test.rs"]
mod tests;

/// Configuration changes carry their raw argument. Validation happens when the
/// engine applies them so a rejected value never reaches the configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigMutation {
    SetEndpoint(String),
    SetModel(String),
    SetVendor(String),
    SetApiKey(String),
    SetTemperature(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlashCommand {
    Configure(ConfigMutation),
    Help,
    Clear,
    /// Text to explain. Empty when the caller should supply it (clipboard,
    /// editor selection).
    Explain(String),
    StartOver,
    Unknown(String),
}

const ENDPOINT: [&str; 2] = ["/endpoint", "/llmEndpoint"];
const MODEL: [&str; 2] = ["/model", "/llmModel"];
const VENDOR: [&str; 2] = ["/vendor", "/llmVendor"];
const API_KEY: [&str; 2] = ["/apikey", "/llmApiKey"];
const TEMPERATURE: [&str; 2] = ["/temperature", "/llmTemperature"];

impl SlashCommand {
    /// Returns `None` when the input is a chat message rather than a command.
    pub fn parse(text: &str) -> Option<SlashCommand> {
        let text = text.trim();
        if !text.starts_with('/') {
            return None;
        }

        let (verb, args) = match text.split_once(char::is_whitespace) {
            Some((verb, args)) => (verb, args.trim()),
            None => (text, ""),
        };
        let args = args.to_string();

        let cmd = match verb {
            v if ENDPOINT.contains(&v) => SlashCommand::Configure(ConfigMutation::SetEndpoint(args)),
            v if MODEL.contains(&v) => SlashCommand::Configure(ConfigMutation::SetModel(args)),
            v if VENDOR.contains(&v) => SlashCommand::Configure(ConfigMutation::SetVendor(args)),
            v if API_KEY.contains(&v) => SlashCommand::Configure(ConfigMutation::SetApiKey(args)),
            v if TEMPERATURE.contains(&v) => {
                SlashCommand::Configure(ConfigMutation::SetTemperature(args))
            }
            "/help" => SlashCommand::Help,
            "/clear" => SlashCommand::Clear,
            "/explain" => SlashCommand::Explain(args),
            "/startover" => SlashCommand::StartOver,
            _ => SlashCommand::Unknown(verb.to_string()),
        };

        return Some(cmd);
    }
}

pub fn help_text() -> String {
    let text = r#"
Available commands:
/apikey <apikey> - Set API key for OpenAI or Azure
/clear - Clear the response window
/endpoint myhostname:myport - Change the endpoint
/explain [file] - Explain a file, or the clipboard when no file is given
/help - Show this help message
/model <name> - Change the model used
/startover - Clear the conversation and start a new session
/temperature <number> - Set temperature (0.0-1.0)
/vendor <name> - Change vendor (OLLAMA, OPENAI, AZURE_OPENAI)
        "#;

    return text.trim().to_string();
}
