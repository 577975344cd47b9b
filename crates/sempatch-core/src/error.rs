//! Error types for semantic patch requests.

use std::fmt;

use sempatch_syntax::{SyntaxError, SyntaxErrorInfo};
use thiserror::Error;

/// Which side of a patch request a source belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRole {
    /// The current contents of the file.
    Original,
    /// The rewrite proposed for the file.
    Proposed,
}

impl fmt::Display for SourceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Original => "original",
            Self::Proposed => "proposed",
        })
    }
}

/// Errors that stop a patch request before it produces output.
///
/// Operations that find no matching node are not errors and never appear
/// here.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PatchError {
    /// The diff payload is not plain text.
    #[error("unsupported diffContent")]
    UnsupportedInput,

    /// A source could not be parsed at all.
    #[error("failed to parse {role} source: {source}")]
    Parse {
        /// The source that failed.
        role: SourceRole,
        /// The underlying parser error.
        source: SyntaxError,
    },

    /// A source parsed only with error recovery.
    #[error(
        "{role} source has {count} syntax error(s); first at line {}, column {}: {}",
        .first.line,
        .first.column,
        .first.message
    )]
    SyntaxErrors {
        /// The source that failed.
        role: SourceRole,
        /// Number of syntax errors found.
        count: usize,
        /// The earliest syntax error.
        first: Box<SyntaxErrorInfo>,
    },
}

impl PatchError {
    /// Creates a parse error for `role`.
    #[must_use]
    pub const fn parse(role: SourceRole, source: SyntaxError) -> Self {
        Self::Parse { role, source }
    }

    /// Creates a syntax error report for `role`.
    #[must_use]
    pub fn syntax_errors(role: SourceRole, count: usize, first: SyntaxErrorInfo) -> Self {
        Self::SyntaxErrors {
            role,
            count,
            first: Box::new(first),
        }
    }
}
