//! RegExp error types

use thiserror::Error;

/// Errors surfaced to the script host.
///
/// Ambiguous JavaScript pattern text never produces an error: the translator
/// resolves it. A failed search is `None`/`false`, not an error either. What
/// remains is what a `RegExp` constructor reports as a `SyntaxError`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegExpError {
    /// The host engine rejected the translated pattern
    #[error("SyntaxError: Invalid regular expression: /{pattern}/: {message}")]
    Syntax {
        /// JavaScript source of the pattern
        pattern: String,
        /// Host engine diagnostic
        message: String,
    },

    /// Unknown or repeated flag
    #[error("SyntaxError: Invalid flags supplied to RegExp constructor '{0}'")]
    InvalidFlags(String),
}

impl RegExpError {
    /// Create a syntax error for a rejected pattern
    pub fn syntax(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Syntax {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create an invalid-flags error
    pub fn invalid_flags(flags: impl Into<String>) -> Self {
        Self::InvalidFlags(flags.into())
    }

    /// Both variants map to a JavaScript `SyntaxError`.
    pub fn is_syntax_error(&self) -> bool {
        matches!(self, Self::Syntax { .. } | Self::InvalidFlags(_))
    }
}

/// Result type for RegExp operations
pub type RegExpResult<T> = std::result::Result<T, RegExpError>;
