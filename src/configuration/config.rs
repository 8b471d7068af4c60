#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use clap::Arg;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

use crate::domain::models::VendorName;
use crate::domain::models::DEFAULT_ENDPOINT;
use crate::domain::models::DEFAULT_MODEL;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    ApiKey,
    ConfigFile,
    ConnectTimeout,
    Endpoint,
    Model,
    Temperature,
    Vendor,
}

fn find_arg(cmd: &Command, key: ConfigKey) -> Option<&Arg> {
    let name = key.to_string();
    return cmd
        .get_arguments()
        .find(|e| return e.get_long() == Some(name.as_str()));
}

fn possible_values(cmd: &Command, key: ConfigKey) -> Vec<String> {
    return match find_arg(cmd, key) {
        Some(arg) => arg
            .get_possible_values()
            .iter()
            .map(|e| return e.get_name().to_string())
            .collect::<Vec<String>>(),
        None => vec![],
    };
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    pub fn default(key: ConfigKey) -> String {
        let res = match key {
            ConfigKey::ApiKey => "".to_string(),
            ConfigKey::ConnectTimeout => "30000".to_string(),
            ConfigKey::Endpoint => DEFAULT_ENDPOINT.to_string(),
            ConfigKey::Model => DEFAULT_MODEL.to_string(),
            ConfigKey::Temperature => "0.0".to_string(),
            ConfigKey::Vendor => VendorName::Ollama.to_string(),

            // Special
            ConfigKey::ConfigFile => dirs::config_dir()
                .unwrap_or_default()
                .join("assistant/config.toml")
                .to_string_lossy()
                .to_string(),
        };

        return res;
    }

    pub async fn load(cmd: Command, clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key))
        }

        let mut config_file = Config::default(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }

        let config_path = path::PathBuf::from(&config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(&config_path)
                .await
                .with_context(|| return format!("Failed to read config file {config_file}"))?;
            let doc = toml_str
                .parse::<toml_edit::Document>()
                .with_context(|| return format!("Failed to parse config file {config_file}"))?;

            for key in ConfigKey::iter() {
                let val = match doc.get(&key.to_string()) {
                    Some(val) => val,
                    None => continue,
                };

                if let Some(val_int) = val.as_integer() {
                    Config::set(key, &val_int.to_string());
                } else if let Some(val_float) = val.as_float() {
                    Config::set(key, &format!("{val_float:?}"));
                } else if let Some(val_str) = val.as_str() {
                    if val_str.is_empty() {
                        continue;
                    }

                    // Use clap value parsers to do validation.
                    let possible_values = possible_values(&cmd, key);
                    if !possible_values.is_empty()
                        && !possible_values
                            .iter()
                            .any(|e| return e.eq_ignore_ascii_case(val_str))
                    {
                        bail!(format!("config.toml has an invalid value for key '{key}': {val_str}\nPossible values are: {}", possible_values.join(", ")));
                    }
                    Config::set(key, val_str);
                }
            }
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    Config::set(key, val)
                }
            }
        }

        tracing::debug!(
            endpoint = Config::get(ConfigKey::Endpoint),
            model = Config::get(ConfigKey::Model),
            vendor = Config::get(ConfigKey::Vendor),
            temperature = Config::get(ConfigKey::Temperature),
            connect_timeout = Config::get(ConfigKey::ConnectTimeout),
            "config"
        );

        return Ok(());
    }

    pub fn serialize_default(cmd: Command) -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::ConfigFile {
                    return None;
                }

                let arg = find_arg(&cmd, key)?;
                let mut description = arg
                    .get_help()
                    .map(|e| return e.to_string())
                    .unwrap_or_default()
                    .split("[default:")
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                let possible_values = possible_values(&cmd, key);
                if !possible_values.is_empty() {
                    description = format!(
                        "{description} [possible values: {}]",
                        possible_values.join(", ")
                    );
                }

                let mut val = Config::default(key);
                if val.is_empty() {
                    val = format!("# {key} = \"\"");
                } else if val.parse::<f64>().is_ok() {
                    val = format!("{key} = {val}");
                } else {
                    val = format!("{key} = \"{val}\"");
                }

                return Some(format!("# {description}\n{val}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}
