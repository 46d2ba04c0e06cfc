use thiserror::Error;

/// Parser error.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ParserError {
    /// An expression could not be compiled: unknown token, missing
    /// operand, unbalanced parentheses.
    #[error("parse error: {0}")]
    Parse(String),
    /// A statement has the wrong keyword structure.
    #[error("bind error: {0}")]
    Bind(String),
}

pub(crate) fn parse_error<R>(message: impl Into<String>) -> Result<R, ParserError> {
    Err(ParserError::Parse(message.into()))
}

pub(crate) fn bind_error<R>(message: impl Into<String>) -> Result<R, ParserError> {
    Err(ParserError::Bind(message.into()))
}
