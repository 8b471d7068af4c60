use anyhow::Context;
use anyhow::Result;

pub struct ClipboardService {}

impl ClipboardService {
    /// Reads the current clipboard text, used as the payload for `/explain`
    /// when no file is given.
    pub fn get() -> Result<String> {
        let mut clipboard = arboard::Clipboard::new().context("Clipboard is unavailable")?;
        let text = clipboard
            .get_text()
            .context("Clipboard does not contain any text")?;

        return Ok(text);
    }
}
