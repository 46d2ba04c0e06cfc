//! # cql-core
//!
//! cql-core holds the token and keyword types shared by the CQL lexer,
//! parser and engine.

#![deny(missing_docs)]
#![deny(unused_imports)]

mod keyword;
mod tokens;

pub use self::{keyword::Keyword, tokens::Token};
