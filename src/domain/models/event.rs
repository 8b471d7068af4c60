use super::ErrorKind;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamFragment {
    pub text: String,
    /// Set on the first fragment of an exchange so renderers can prefix it.
    pub is_first: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Fragment(StreamFragment),
    SessionError(ErrorKind, String),
    Completed(String),
}

impl Event {
    pub fn is_terminal(&self) -> bool {
        match self {
            Event::Fragment(_) => return false,
            Event::SessionError(kind, _) => return *kind != ErrorKind::DecodeWarning,
            Event::Completed(_) => return true,
        }
    }
}
