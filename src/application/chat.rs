use std::path;
use std::time::Duration;

use anyhow::Context;
use anyhow::Result;
use owo_colors::OwoColorize;
use tokio::fs;
use tokio::io;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tokio::sync::mpsc;

use super::cli::Launch;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::help_text;
use crate::domain::models::ErrorKind;
use crate::domain::models::Event;
use crate::domain::models::ExplainFraming;
use crate::domain::models::SessionConfig;
use crate::domain::models::SlashCommand;
use crate::domain::services::clipboard::ClipboardService;
use crate::domain::services::Exchange;
use crate::domain::services::SessionEngine;
use crate::domain::services::Submission;

fn engine_from_config() -> Result<SessionEngine> {
    let config = SessionConfig::from_config()?;
    let connect_timeout = Config::get(ConfigKey::ConnectTimeout)
        .parse::<u64>()
        .context("connect-timeout must be a number of milliseconds")?;

    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_millis(connect_timeout))
        .build()?;

    return Ok(SessionEngine::with_client(config, client));
}

async fn print(text: &str) -> Result<()> {
    let mut stdout = io::stdout();
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await?;

    return Ok(());
}

async fn print_system(text: &str) -> Result<()> {
    return print(&format!("{} {text}\n", "System:".yellow().bold())).await;
}

async fn render(mut rx: mpsc::UnboundedReceiver<Event>) -> Result<()> {
    while let Some(event) = rx.recv().await {
        let is_terminal = event.is_terminal();
        match event {
            Event::Fragment(fragment) => {
                if fragment.is_first {
                    print(&format!("{} ", "Assistant:".green().bold())).await?;
                }
                print(&fragment.text).await?;
            }
            // Logged by the engine, the rest of the reply still arrives.
            Event::SessionError(ErrorKind::DecodeWarning, _) => {}
            Event::SessionError(kind, detail) => {
                print_system(&format!("{kind}: {detail}")).await?;
            }
            Event::Completed(text) => {
                if text.is_empty() {
                    print_system("The endpoint returned an empty reply.").await?;
                } else {
                    print("\n").await?;
                }
            }
        }

        if is_terminal {
            break;
        }
    }

    return Ok(());
}

async fn run_exchange(exchange: Exchange) -> Result<()> {
    let (tx, rx) = mpsc::unbounded_channel::<Event>();
    let (forwarded, rendered) = tokio::join!(exchange.forward(tx), render(rx));
    rendered?;
    forwarded?;

    return Ok(());
}

/// `/explain` with a path explains the file, without one it explains the
/// clipboard. Anything else is explained as typed.
async fn explain(engine: &SessionEngine, target: &str) -> Result<()> {
    let target = target.trim();

    let (text, framing) = if target.is_empty() {
        match ClipboardService::get() {
            Ok(text) => (text, ExplainFraming::Selection),
            Err(err) => return print_system(&format!("{err:#}")).await,
        }
    } else if path::Path::new(target).is_file() {
        match fs::read_to_string(target).await {
            Ok(text) => (text, ExplainFraming::Document),
            Err(err) => return print_system(&format!("Failed to read {target}: {err}")).await,
        }
    } else {
        (target.to_string(), ExplainFraming::Document)
    };

    match engine.explain_with(&text, &framing) {
        Ok(exchange) => return run_exchange(exchange).await,
        Err(err) => return print_system(&err.to_string()).await,
    }
}

async fn handle_input(engine: &SessionEngine, input: &str) -> Result<()> {
    if let Some(SlashCommand::Explain(target)) = SlashCommand::parse(input) {
        return explain(engine, &target).await;
    }

    match engine.submit(input) {
        Ok(Submission::Exchange(exchange)) => run_exchange(exchange).await?,
        Ok(Submission::Configured(change)) => print_system(&change.to_string()).await?,
        Ok(Submission::StartedOver) => print_system("Started a new conversation.").await?,
        Ok(Submission::Command(SlashCommand::Help)) => print_system(&help_text()).await?,
        Ok(Submission::Command(SlashCommand::Clear)) => print("\x1B[2J\x1B[1;1H").await?,
        Ok(Submission::Command(cmd)) => {
            tracing::debug!(cmd = ?cmd, "command has no terminal behaviour");
        }
        Err(err) => print_system(&err.to_string()).await?,
    }

    return Ok(());
}

pub async fn start(launch: Launch) -> Result<()> {
    let engine = engine_from_config()?;
    tracing::debug!(session_id = %engine.session_id(), "session started");

    if let Launch::OneShot(message) = launch {
        return handle_input(&engine, &message).await;
    }

    let mut lines = BufReader::new(io::stdin()).lines();
    loop {
        print(&format!("{} ", "You:".cyan().bold())).await?;
        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        handle_input(&engine, &line).await?;
    }

    print("\n").await?;
    return Ok(());
}
