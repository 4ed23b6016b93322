//! Shared enums used by both the emitter options and the Lua printer.

use serde::Deserialize;

/// Line terminator written by the printer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewLineKind {
    #[default]
    Lf,
    Crlf,
}

impl NewLineKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            NewLineKind::Lf => "\n",
            NewLineKind::Crlf => "\r\n",
        }
    }
}
