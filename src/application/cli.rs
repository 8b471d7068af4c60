#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use owo_colors::OwoColorize;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::help_text;
use crate::domain::models::VendorName;

/// How the chat front-end should run once configuration is loaded.
#[derive(Debug, PartialEq, Eq)]
pub enum Launch {
    Interactive,
    OneShot(String),
}

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn arg_endpoint() -> Arg {
    return Arg::new(ConfigKey::Endpoint.to_string())
        .short('e')
        .long(ConfigKey::Endpoint.to_string())
        .env("ASSISTANT_ENDPOINT")
        .num_args(1)
        .help(format!(
            "Full chat endpoint URL the conversation starts on. [default: {}]",
            Config::default(ConfigKey::Endpoint)
        ));
}

fn arg_model() -> Arg {
    return Arg::new(ConfigKey::Model.to_string())
        .short('m')
        .long(ConfigKey::Model.to_string())
        .env("ASSISTANT_MODEL")
        .num_args(1)
        .help(format!(
            "The model requested from the endpoint. [default: {}]",
            Config::default(ConfigKey::Model)
        ));
}

fn arg_vendor() -> Arg {
    return Arg::new(ConfigKey::Vendor.to_string())
        .long(ConfigKey::Vendor.to_string())
        .env("ASSISTANT_VENDOR")
        .num_args(1)
        .ignore_case(true)
        .help(format!(
            "The wire protocol spoken by the endpoint. [default: {}]",
            Config::default(ConfigKey::Vendor)
        ))
        .value_parser(PossibleValuesParser::new(VendorName::VARIANTS));
}

fn arg_api_key() -> Arg {
    return Arg::new(ConfigKey::ApiKey.to_string())
        .long(ConfigKey::ApiKey.to_string())
        .env("ASSISTANT_API_KEY")
        .num_args(1)
        .hide_env_values(true)
        .help("API key sent to OpenAI and Azure OpenAI endpoints.");
}

fn arg_temperature() -> Arg {
    return Arg::new(ConfigKey::Temperature.to_string())
        .long(ConfigKey::Temperature.to_string())
        .env("ASSISTANT_TEMPERATURE")
        .num_args(1)
        .help(format!(
            "Sampling temperature between 0.0 and 1.0. [default: {}]",
            Config::default(ConfigKey::Temperature)
        ));
}

fn arg_connect_timeout() -> Arg {
    return Arg::new(ConfigKey::ConnectTimeout.to_string())
        .long(ConfigKey::ConnectTimeout.to_string())
        .env("ASSISTANT_CONNECT_TIMEOUT")
        .num_args(1)
        .help(format!(
            "Time to wait in milliseconds before giving up on connecting to the endpoint. [default: {}]",
            Config::default(ConfigKey::ConnectTimeout)
        ));
}

fn arg_config_file() -> Arg {
    return Arg::new(ConfigKey::ConfigFile.to_string())
        .short('c')
        .long(ConfigKey::ConfigFile.to_string())
        .env("ASSISTANT_CONFIG_FILE")
        .num_args(1)
        .help(format!(
            "Path to configuration file [default: {}]",
            Config::default(ConfigKey::ConfigFile)
        ))
        .global(true);
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('/') {
                return format!("  {line}");
            }
            if line.starts_with("Available commands:") {
                return "CHAT COMMANDS:".bold().underline().to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
    );

    return Command::new("assistant")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .arg(arg_endpoint())
        .arg(arg_model())
        .arg(arg_vendor())
        .arg(arg_api_key())
        .arg(arg_temperature())
        .arg(arg_connect_timeout())
        .arg(arg_config_file())
        .arg(
            Arg::new("stdin")
                .long("stdin")
                .action(ArgAction::SetTrue)
                .help("Read the message from stdin, appended to MESSAGE when both are given."),
        )
        .arg(
            Arg::new("message")
                .value_name("MESSAGE")
                .num_args(1..)
                .help("Send a single message, print the reply and exit. Starts an interactive chat when omitted."),
        );
}

/// Joins the positional words into the one-shot message.
fn message_from_args(matches: &ArgMatches) -> String {
    return matches
        .get_many::<String>("message")
        .map(|words| return words.cloned().collect::<Vec<String>>().join(" "))
        .unwrap_or_default();
}

pub async fn parse() -> Result<Option<Launch>> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(None);
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(None);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(None);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(None);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(None);
            }
        },
        _ => {
            Config::load(build(), vec![&matches]).await?;
        }
    }

    let mut message = message_from_args(&matches);
    if matches.get_flag("stdin") {
        let mut piped = String::new();
        tokio::io::stdin().read_to_string(&mut piped).await?;
        message = format!("{message}\n\n{piped}").trim().to_string();
    }

    if message.trim().is_empty() {
        return Ok(Some(Launch::Interactive));
    }

    return Ok(Some(Launch::OneShot(message)));
}
