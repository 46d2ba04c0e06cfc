//! # cql-parser
//!
//! cql-parser turns canonical token streams into expression trees and
//! bound statements. Expressions go through an operator-precedence
//! conversion driven by in-stack/in-coming priority tables; statements
//! are bound by locating clause keywords and handing each clause window
//! to the expression compiler.

#![deny(missing_docs)]
#![deny(unused_imports)]

mod error;
mod expr;
mod stmt;

pub use self::{error::ParserError, expr::parse_expr, stmt::parse_statement};
