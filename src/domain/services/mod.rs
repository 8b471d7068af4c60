pub mod clipboard;
mod engine;
mod stream_decoder;

pub use engine::*;
pub use stream_decoder::*;
