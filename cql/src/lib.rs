//! # cql
//!
//! CQL is an in-memory, single-user relational query engine for a
//! SQL-like language. This facade crate re-exports the public API of
//! the workspace.

#![deny(missing_docs)]
#![deny(unused_imports)]

pub use cql_ast as ast;
pub use cql_core as core;
pub use cql_engine as engine;
pub use cql_lexer as lexer;
pub use cql_parser as parser;
