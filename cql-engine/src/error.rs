use cql_ast::DataType;
use thiserror::Error;

/// Expression evaluation error.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum EvalError {
    /// A column name is not in the row's schema.
    #[error("unable to recognize column name #{0}")]
    UnknownColumn(String),
    /// A column was referenced where no row is in scope.
    #[error("column #{0} referenced outside a row context")]
    NoRow(String),
    /// A variable is not in the variable store.
    #[error("unknown variable @{0}")]
    UnknownVariable(String),
    /// A unary operator was applied to an operand of the wrong type.
    #[error("cannot apply `{op}` to a {operand} operand")]
    UnaryType {
        /// The operator's spelling.
        op: &'static str,
        /// The offending operand type.
        operand: DataType,
    },
    /// A binary operator was applied to operands of the wrong types.
    #[error("cannot apply `{op}` to {lhs} and {rhs} operands")]
    BinaryType {
        /// The operator's spelling.
        op: &'static str,
        /// Left operand type.
        lhs: DataType,
        /// Right operand type.
        rhs: DataType,
    },
    /// The right-hand side of `in` must name a variable.
    #[error("`in` takes a variable on its right-hand side")]
    InOperand,
    /// A predicate evaluated to a non-boolean value.
    #[error("predicate evaluates to {0}, not a boolean")]
    NonBoolPredicate(DataType),
}

/// Catalog error.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum CatalogError {
    /// The named table has not been loaded or created.
    #[error("unknown table `{0}`; maybe you forgot to load it")]
    UnknownTable(String),
    /// A table header carries a column of unknown type.
    #[error("malformed header for table `{table}`: {detail}")]
    BadHeader {
        /// The offending table.
        table: String,
        /// What is wrong with the header.
        detail: String,
    },
}

/// Top-level engine error; every statement failure folds into this.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Tokenization failed.
    #[error(transparent)]
    Lex(#[from] cql_lexer::LexError),
    /// Expression compilation or statement binding failed.
    #[error(transparent)]
    Parse(#[from] cql_parser::ParserError),
    /// Expression evaluation failed.
    #[error(transparent)]
    Eval(#[from] EvalError),
    /// A catalog lookup or header parse failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// A statement cannot be planned as written.
    #[error("{0}")]
    Plan(String),
    /// An insert's flat expression list does not divide into rows.
    #[error("insert of {exprs} expression(s) does not fill rows of {cols} column(s)")]
    TupleWidth {
        /// Number of expressions supplied.
        exprs: usize,
        /// Number of table columns.
        cols: usize,
    },
    /// File I/O failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// CSV reading or writing failed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
