use thiserror::Error;

/// A position in the scanned input.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Location {
    /// 1-based line number.
    pub line: u64,
    /// 1-based column number.
    pub column: u64,
}

impl Default for Location {
    fn default() -> Self {
        Location { line: 1, column: 1 }
    }
}

impl Location {
    pub(crate) fn advance(&mut self, ch: char) {
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

/// Lexer error.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum LexError {
    /// The character-level scan failed.
    #[error("{message} at line {}, column {}", .location.line, .location.column)]
    Scan {
        /// What went wrong.
        message: String,
        /// Where it went wrong.
        location: Location,
    },
    /// Deep partition failed to fuse a multi-token lexeme.
    #[error("{0}")]
    Fusion(String),
}

impl LexError {
    pub(crate) fn scan(message: impl Into<String>, location: Location) -> Self {
        LexError::Scan {
            message: message.into(),
            location,
        }
    }

    pub(crate) fn fusion(message: impl Into<String>) -> Self {
        LexError::Fusion(message.into())
    }
}
