//! Indentation preferences for printed output.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How patched files are indented.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum IndentPreference {
    /// Follow the style detected in the original file.
    #[default]
    Auto,
    /// Always indent with tabs.
    Tabs,
    /// Always indent with spaces.
    Spaces,
}

impl IndentPreference {
    /// Forced tab usage, or `None` when the detected style should win.
    #[must_use]
    pub const fn use_tabs(self) -> Option<bool> {
        match self {
            Self::Auto => None,
            Self::Tabs => Some(true),
            Self::Spaces => Some(false),
        }
    }
}

/// Errors encountered while parsing an [`IndentPreference`] from text.
pub type IndentPreferenceParseError = strum::ParseError;
