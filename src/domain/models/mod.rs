mod error;
mod event;
mod explain;
mod history;
mod message;
mod session;
mod session_config;
mod slash_commands;
mod vendor;

pub use error::*;
pub use event::*;
pub use explain::*;
pub use history::*;
pub use message::*;
pub use session::*;
pub use session_config::*;
pub use slash_commands::*;
pub use vendor::*;
