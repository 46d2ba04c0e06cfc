//! # cql-lexer
//!
//! cql-lexer converts raw CQL text into canonical token streams in two
//! passes: a character-level scan that splits the input into commands on
//! `;`, and a deep partition that fuses multi-token lexemes.

#![deny(missing_docs)]
#![deny(unused_imports)]

mod command;
mod error;
mod lexer;

pub use self::{
    command::{deep_partition, Command},
    error::{LexError, Location},
    lexer::Lexer,
};

/// Tokenizes a chunk of CQL text into canonical commands.
///
/// Runs both passes and drops empty commands; every returned command is
/// canonical and ready for the binder.
pub fn tokenize(input: &str) -> Result<Vec<Command>, LexError> {
    let commands = Lexer::new(input).scan()?;
    let mut canonical = Vec::with_capacity(commands.len());
    for command in commands {
        if command.is_empty() {
            continue;
        }
        canonical.push(deep_partition(command)?);
    }
    Ok(canonical)
}
