use thiserror::Error;

use super::VendorName;

#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
pub enum ErrorKind {
    Busy,
    EmptyInput,
    InvalidVendor,
    InvalidTemperature,
    InvalidEndpointFormat,
    MissingArgument,
    DecodeWarning,
    Unavailable,
    UnknownCommand,
}

/// Errors returned synchronously from engine calls. Failures that happen while
/// a response streams in are delivered as `Event::SessionError` instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("An exchange is already in progress. Wait for it to finish before sending again.")]
    Busy,

    #[error("Nothing to send.")]
    EmptyInput,

    #[error("Invalid vendor {0}. Supported vendors: {}", VendorName::supported())]
    InvalidVendor(String),

    #[error("Invalid temperature {0}. Temperature must be a number between 0.0 and 1.0")]
    InvalidTemperature(String),

    #[error("Invalid endpoint format {0}. Use /endpoint myhostname:myport")]
    InvalidEndpointFormat(String),

    #[error("Missing value for {0}. Type /help for a list of commands.")]
    MissingArgument(String),

    #[error("Unknown command {0}. Type /help for a list of commands.")]
    UnknownCommand(String),

    #[error("Failed to build request: {0}")]
    Request(#[from] serde_json::Error),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Busy => return ErrorKind::Busy,
            EngineError::EmptyInput => return ErrorKind::EmptyInput,
            EngineError::InvalidVendor(_) => return ErrorKind::InvalidVendor,
            EngineError::InvalidTemperature(_) => return ErrorKind::InvalidTemperature,
            EngineError::InvalidEndpointFormat(_) => return ErrorKind::InvalidEndpointFormat,
            EngineError::MissingArgument(_) => return ErrorKind::MissingArgument,
            EngineError::UnknownCommand(_) => return ErrorKind::UnknownCommand,
            EngineError::Request(_) => return ErrorKind::Unavailable,
        }
    }
}
