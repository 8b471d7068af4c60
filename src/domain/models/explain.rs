#[cfg(test)]
#[path = "explain_test.rs"]
mod tests;

/// Prompt framing placed in front of text the user asks to have explained.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ExplainFraming {
    /// Files, clipboard dumps and piped input.
    #[default]
    Document,
    /// Text selected in an editor.
    Selection,
    Custom(String),
}

impl ExplainFraming {
    pub fn prefix(&self) -> &str {
        match self {
            ExplainFraming::Document => {
                return "Please explain the following text in a clear and concise manner:\n\n";
            }
            ExplainFraming::Selection => {
                return "Please explain the content below the line\n-----------------------------------------\n";
            }
            ExplainFraming::Custom(prefix) => return prefix,
        }
    }

    pub fn frame(&self, text: &str) -> String {
        return format!("{}{text}", self.prefix());
    }
}
