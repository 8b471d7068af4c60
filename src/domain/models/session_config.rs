#[cfg(test)]
#[path = "session_config_test.rs"]
mod tests;

use std::fmt;

use anyhow::Context;
use anyhow::Result;
use url::Url;

use super::EngineError;
use super::VendorName;
use crate::configuration::Config;
use crate::configuration::ConfigKey;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/chat";
pub const DEFAULT_MODEL: &str = "llama3";

#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    endpoint: String,
    model: String,
    vendor: VendorName,
    api_key: String,
    temperature: f64,
}

impl Default for SessionConfig {
    fn default() -> SessionConfig {
        return SessionConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            vendor: VendorName::Ollama,
            api_key: "".to_string(),
            temperature: 0.0,
        };
    }
}

/// The value a configuration mutation ended up applying.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigChange {
    Endpoint(String),
    Model(String),
    Vendor(VendorName),
    ApiKey,
    Temperature(f64),
}

impl fmt::Display for ConfigChange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigChange::Endpoint(endpoint) => return write!(f, "Endpoint changed to {endpoint}"),
            ConfigChange::Model(model) => return write!(f, "Model changed to {model}"),
            ConfigChange::Vendor(vendor) => return write!(f, "Vendor changed to {vendor}"),
            ConfigChange::ApiKey => return write!(f, "API key updated"),
            ConfigChange::Temperature(value) => {
                return write!(f, "Temperature changed to {value:?}");
            }
        }
    }
}

fn validate_url(text: &str) -> Result<Url, EngineError> {
    let invalid = || return EngineError::InvalidEndpointFormat(text.to_string());
    let url = Url::parse(text).map_err(|_| return invalid())?;
    if !["http", "https"].contains(&url.scheme()) || url.host_str().is_none() {
        return Err(invalid());
    }

    return Ok(url);
}

/// Expands a bare `host[:port]` into a full chat endpoint for `vendor`.
pub fn normalize_endpoint(host: &str, vendor: VendorName) -> Result<String, EngineError> {
    let host = host.trim();
    if host.is_empty() {
        return Err(EngineError::InvalidEndpointFormat(host.to_string()));
    }

    let mut endpoint = host.to_string();
    if !endpoint.contains("://") {
        endpoint = format!("http://{endpoint}");
    }
    let mut url = validate_url(&endpoint)?;

    // The suffix belongs to the path, ahead of any query or fragment.
    let path = url.path().trim_end_matches('/').to_string();
    let suffix = vendor.chat_path();
    if path.ends_with(suffix) {
        url.set_path(&path);
    } else {
        url.set_path(&format!("{path}{suffix}"));
    }

    return Ok(url.to_string());
}

impl SessionConfig {
    /// Builds the initial configuration from the loaded `Config` store. Every
    /// value goes through the same setters slash commands use.
    pub fn from_config() -> Result<SessionConfig> {
        let mut config = SessionConfig::default();

        let endpoint = Config::get(ConfigKey::Endpoint);
        if !endpoint.is_empty() {
            config
                .set_endpoint(&endpoint)
                .context("Failed to load endpoint")?;
        }

        let model = Config::get(ConfigKey::Model);
        if !model.is_empty() {
            config.set_model(&model).context("Failed to load model")?;
        }

        let vendor = Config::get(ConfigKey::Vendor);
        if !vendor.is_empty() {
            config.set_vendor(&vendor).context("Failed to load vendor")?;
        }

        let api_key = Config::get(ConfigKey::ApiKey);
        if !api_key.is_empty() {
            config.set_api_key(&api_key).context("Failed to load API key")?;
        }

        let temperature = Config::get(ConfigKey::Temperature);
        if !temperature.is_empty() {
            config
                .set_temperature(&temperature)
                .context("Failed to load temperature")?;
        }

        return Ok(config);
    }

    pub fn endpoint(&self) -> &str {
        return &self.endpoint;
    }

    pub fn model(&self) -> &str {
        return &self.model;
    }

    pub fn vendor(&self) -> VendorName {
        return self.vendor;
    }

    pub fn api_key(&self) -> &str {
        return &self.api_key;
    }

    pub fn temperature(&self) -> f64 {
        return self.temperature;
    }

    /// Sets a full endpoint URL as is. Only http and https are accepted.
    pub fn set_endpoint(&mut self, endpoint: &str) -> Result<String, EngineError> {
        let endpoint = endpoint.trim();
        validate_url(endpoint)?;
        self.endpoint = endpoint.to_string();

        return Ok(self.endpoint.to_string());
    }

    pub fn set_model(&mut self, model: &str) -> Result<String, EngineError> {
        let model = model.trim();
        if model.is_empty() {
            return Err(EngineError::MissingArgument("model".to_string()));
        }
        self.model = model.to_string();

        return Ok(self.model.to_string());
    }

    pub fn set_vendor(&mut self, vendor: &str) -> Result<VendorName, EngineError> {
        let name = VendorName::parse(vendor)
            .ok_or_else(|| return EngineError::InvalidVendor(vendor.trim().to_string()))?;
        self.vendor = name;

        return Ok(name);
    }

    pub fn set_api_key(&mut self, api_key: &str) -> Result<(), EngineError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(EngineError::MissingArgument("API key".to_string()));
        }
        self.api_key = api_key.to_string();

        return Ok(());
    }

    pub fn set_temperature(&mut self, temperature: &str) -> Result<f64, EngineError> {
        let text = temperature.trim();
        let invalid = || return EngineError::InvalidTemperature(text.to_string());
        let value = text.parse::<f64>().map_err(|_| return invalid())?;
        if !(0.0..=1.0).contains(&value) {
            return Err(invalid());
        }
        self.temperature = value;

        return Ok(value);
    }
}
