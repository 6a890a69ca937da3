use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// How the server should treat the focused widget of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Only the focus parameter is sent.
    #[default]
    Focus,
    /// Return the focused widget's output in isolation.
    Frame,
    /// Like `Frame`, and skip page templating (`raw=1`).
    Proxy,
    /// Like `Frame`, and persist widget state on the server (`save=1`).
    Save,
}

impl Mode {
    /// Frame, proxy and save requests frame the focused widget.
    pub fn frames_focus(self) -> bool {
        matches!(self, Mode::Frame | Mode::Proxy | Mode::Save)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Focus => "focus",
            Mode::Frame => "frame",
            Mode::Proxy => "proxy",
            Mode::Save => "save",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "" | "focus" | "default" => Ok(Mode::Focus),
            "frame" => Ok(Mode::Frame),
            "proxy" | "raw" => Ok(Mode::Proxy),
            "save" => Ok(Mode::Save),
            other => Err(Error::Config(format!("Unknown mode: {}", other))),
        }
    }
}
