//! # cql-ast
//!
//! cql-ast holds the data model of the CQL engine: runtime values,
//! the immutable expression tree and the bound statement records the
//! binder produces, together with the tree utilities the planner and
//! the aggregation engine rely on.

#![deny(missing_docs)]
#![deny(unused_imports)]

mod expression;
mod statement;
mod util;
mod value;

pub use self::{
    expression::{AggOp, BinaryOp, Expr, ExprRef, UnaryOp},
    statement::{
        DeleteStmt, InsertStmt, OrderByExpr, OrderDirection, SelectStmt, Statement, UpdateStmt,
    },
    util::{agg_as_column, find_agg_exprs, is_const},
    value::{fmt_float, DataType, Value},
};
