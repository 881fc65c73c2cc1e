//! Live reload message protocol.
//!
//! JSON text frames, tagged by `type`:
//!
//! - `connected`: greeting sent once per client
//! - `reload`: reload the page

use serde::Serialize;

/// Message sent from the server to browser clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadMessage {
    /// Connection established
    Connected {
        /// Server version
        version: String,
    },

    /// Full page reload
    Reload {
        /// What triggered the reload
        reason: String,
    },
}

impl ReloadMessage {
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn reload(reason: impl Into<String>) -> Self {
        Self::Reload {
            reason: reason.into(),
        }
    }

    /// Serialize to a JSON text frame.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }
}
