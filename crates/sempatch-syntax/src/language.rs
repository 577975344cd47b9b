//! Language detection and Tree-sitter grammar selection.
//!
//! This module provides the [`SupportedLanguage`] enum for identifying the
//! ECMAScript dialects the patcher understands and mapping them to their
//! Tree-sitter grammars.

use std::fmt;
use std::str::FromStr;

use camino::Utf8Path;
use thiserror::Error;

use crate::error::SyntaxError;

/// Languages supported for semantic patching.
///
/// Both variants are served by the TypeScript grammars, which also accept
/// plain JavaScript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SupportedLanguage {
    /// TypeScript and JavaScript source files (`.ts`, `.js` and friends).
    #[default]
    TypeScript,
    /// Sources that may contain JSX (`.tsx`, `.jsx`).
    Tsx,
}

impl SupportedLanguage {
    /// Detects the language from a file extension.
    ///
    /// Returns `None` if the extension is not recognised.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        let normalised = ext.to_ascii_lowercase();
        match normalised.as_str() {
            "ts" | "mts" | "cts" | "js" | "mjs" | "cjs" => Some(Self::TypeScript),
            "tsx" | "jsx" => Some(Self::Tsx),
            _ => None,
        }
    }

    /// Detects the language from a file path by examining its extension.
    ///
    /// Returns `None` if the path has no extension or the extension is not
    /// recognised.
    #[must_use]
    pub fn from_path(path: &Utf8Path) -> Option<Self> {
        path.extension().and_then(Self::from_extension)
    }

    /// Detects the language from a file path, explaining why detection
    /// failed.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::UnknownLanguage`] when the path has no
    /// extension and [`SyntaxError::UnsupportedExtension`] when the extension
    /// is not one of the recognised dialects.
    pub fn detect(path: &Utf8Path) -> Result<Self, SyntaxError> {
        let Some(extension) = path.extension() else {
            return Err(SyntaxError::unknown_language(path.to_path_buf()));
        };
        Self::from_extension(extension).ok_or_else(|| SyntaxError::unsupported_extension(extension))
    }

    /// Returns the Tree-sitter language grammar for this language.
    #[must_use]
    pub fn tree_sitter_language(self) -> tree_sitter::Language {
        match self {
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    /// Returns the lower-case identifier for this language.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::Tsx => "tsx",
        }
    }

    /// Returns all supported languages.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::TypeScript, Self::Tsx]
    }
}

impl fmt::Display for SupportedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing a language identifier fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported language: '{0}'")]
pub struct LanguageParseError(String);

impl LanguageParseError {
    /// Returns the input that failed to parse.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.0
    }
}

impl FromStr for SupportedLanguage {
    type Err = LanguageParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalised = input.trim().to_ascii_lowercase();
        match normalised.as_str() {
            "typescript" | "ts" | "javascript" | "js" => Ok(Self::TypeScript),
            "tsx" | "jsx" => Ok(Self::Tsx),
            other => Err(LanguageParseError(other.to_owned())),
        }
    }
}
