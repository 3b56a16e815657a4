use std::fmt;

use serde::{Deserialize, Serialize};

/// How a command came to be.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    /// Typed by a user after mentioning the bot.
    Typed,
    #[serde(rename = "btn-click")]
    ButtonClick,
    #[serde(rename = "multi-select-value-change")]
    MultiSelectChange,
    #[serde(rename = "select-value-change")]
    SelectChange,
    PlainTextInput,
    /// Produced by the bot itself (bound actions, broadcasts).
    Automation,
    #[default]
    Unknown,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Typed => "typed",
            Self::ButtonClick => "btn-click",
            Self::MultiSelectChange => "multi-select-value-change",
            Self::SelectChange => "select-value-change",
            Self::PlainTextInput => "plain-text-input",
            Self::Automation => "automation",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform-independent command, the input to every executor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenericCommand {
    pub text: String,
    pub origin: Origin,
}

impl GenericCommand {
    pub fn new(text: impl Into<String>, origin: Origin) -> Self {
        Self {
            text: text.into(),
            origin,
        }
    }

    pub fn typed(text: impl Into<String>) -> Self {
        Self::new(text, Origin::Typed)
    }
}
