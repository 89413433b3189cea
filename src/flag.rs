//! The compile-time flag injected into every build configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the flag that tells native code which web engine is linked.
pub const ENGINE_FLAG_NAME: &str = "WK_WEBVIEW_ENGINE_IS_USED";

/// Definition entry meaning "also apply the parent scope's definitions".
pub const INHERITED_ENTRY: &str = "\"$(inherited)\"";

/// Wrap a literal in double quotes, as build settings store definitions.
pub fn quote(literal: &str) -> String {
    format!("\"{}\"", literal)
}

/// A named, numeric compile-time symbol (`NAME=VALUE`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    pub name: String,
    pub value: u8,
}

impl Flag {
    pub fn new(name: impl Into<String>, value: u8) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// `WK_WEBVIEW_ENGINE_IS_USED` set to 1 when the engine is used, else 0.
    pub fn engine(used: bool) -> Self {
        Self::new(ENGINE_FLAG_NAME, u8::from(used))
    }

    /// Unquoted `NAME=VALUE`.
    pub fn definition(&self) -> String {
        format!("{}={}", self.name, self.value)
    }

    /// The quoted entry written into a definitions list.
    pub fn entry(&self) -> String {
        quote(&self.definition())
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}
