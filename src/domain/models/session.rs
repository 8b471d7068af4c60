use std::fmt;

use uuid::Uuid;

/// Opaque token correlating exchanges server-side. Generated locally and
/// replaced whenever a server hands one back in-band.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> SessionId {
        return SessionId(Uuid::new_v4().to_string());
    }

    /// Produces a fresh identifier that never equals `previous`.
    pub fn regenerate(previous: &SessionId) -> SessionId {
        loop {
            let next = SessionId::generate();
            if &next != previous {
                return next;
            }
        }
    }

    pub fn as_str(&self) -> &str {
        return &self.0;
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> SessionId {
        return SessionId(value);
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        return write!(f, "{}", self.0);
    }
}
