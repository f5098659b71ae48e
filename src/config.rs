//! Engine configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder text sent while hiding the reply keyboard
pub const DEFAULT_REMOVE_KEYBOARD_TEXT: &str = "Thinking...";

const REMOVE_KEYBOARD_TEXT_VAR: &str = "CHAT_FSM_REMOVE_KEYBOARD_TEXT";
const KEYBOARD_REMOVAL_VAR: &str = "CHAT_FSM_KEYBOARD_REMOVAL";

/// How keyboard-removal failures are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemovalMode {
    /// Log and carry on; the reply is still sent
    #[default]
    BestEffort,
    /// A failed placeholder send aborts the event
    Strict,
}

impl FromStr for RemovalMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "best-effort" | "best_effort" => Ok(Self::BestEffort),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown keyboard removal mode: {other}")),
        }
    }
}

impl fmt::Display for RemovalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BestEffort => f.write_str("best-effort"),
            Self::Strict => f.write_str("strict"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EngineConfig {
    pub remove_keyboard_text: String,
    pub keyboard_removal: RemovalMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            remove_keyboard_text: DEFAULT_REMOVE_KEYBOARD_TEXT.to_string(),
            keyboard_removal: RemovalMode::default(),
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `CHAT_FSM_REMOVE_KEYBOARD_TEXT` and
    /// `CHAT_FSM_KEYBOARD_REMOVAL`
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(text) = lookup(REMOVE_KEYBOARD_TEXT_VAR).filter(|t| !t.is_empty()) {
            config.remove_keyboard_text = text;
        }

        if let Some(raw) = lookup(KEYBOARD_REMOVAL_VAR) {
            match raw.parse() {
                Ok(mode) => config.keyboard_removal = mode,
                Err(e) => tracing::warn!(
                    variable = KEYBOARD_REMOVAL_VAR,
                    error = %e,
                    "Ignoring invalid keyboard removal mode"
                ),
            }
        }

        config
    }

    #[must_use]
    pub fn with_remove_keyboard_text(mut self, text: impl Into<String>) -> Self {
        self.remove_keyboard_text = text.into();
        self
    }

    #[must_use]
    pub fn with_keyboard_removal(mut self, mode: RemovalMode) -> Self {
        self.keyboard_removal = mode;
        self
    }
}
