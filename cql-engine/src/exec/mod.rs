//! Volcano executors.
//!
//! Every executor implements the pull protocol: `init` (re)positions to
//! the start of its stream, `next` yields the following row or `None`
//! at end-of-stream. The stream is finite and lazy; it is not
//! restartable after the end unless `init` runs again. Executors hold
//! no external resources across `next` boundaries, so an undrained
//! plan leaves the engine in a valid state.

mod aggregate;
mod dest;
mod filter;
mod limit;
mod projection;
mod scan;
mod sort;

pub use self::{
    aggregate::AggregateExec, dest::DestExec, filter::FilterExec, limit::LimitExec,
    projection::ProjectionExec, scan::SeqScanExec, sort::SortExec,
};

use crate::{error::EngineError, row::Row, schema::Schema, vars::VariableStore};

/// Runtime state threaded through the pipeline on every call.
///
/// The variable store is mutable because the `dest` layer appends to it
/// while upstream layers only read.
pub struct ExecContext<'a> {
    /// The session's variable store.
    pub vars: &'a mut VariableStore,
}

/// The volcano pull interface.
pub trait Executor {
    /// Idempotently (re)positions the stream to its start, recursively
    /// initializing children.
    fn init(&mut self, ctx: &mut ExecContext<'_>) -> Result<(), EngineError>;

    /// Yields the next row, or `None` at end-of-stream.
    fn next(&mut self, ctx: &mut ExecContext<'_>) -> Result<Option<Row>, EngineError>;

    /// The schema of the rows this executor emits.
    fn schema(&self) -> &Schema;
}

/// A boxed executor borrowing from the catalog for the statement's
/// duration.
pub type ExecutorRef<'a> = Box<dyn Executor + 'a>;

#[cfg(test)]
pub(crate) mod test_helpers {
    use cql_ast::{DataType, Value};

    use super::*;
    use crate::table::Table;

    /// Builds the `people` fixture used across executor tests.
    pub fn people() -> Table {
        let mut schema = Schema::new();
        schema.push(DataType::Char, "name");
        schema.push(DataType::Float, "age");
        let mut table = Table::new(schema);
        table.insert(vec![Value::Char("alice".into()), Value::Float(30.0)]);
        table.insert(vec![Value::Char("bob".into()), Value::Float(25.0)]);
        table.insert(vec![Value::Char("carol".into()), Value::Float(40.0)]);
        table
    }

    /// Parses an expression from text, for test brevity.
    pub fn expr(input: &str) -> cql_ast::ExprRef {
        let mut commands = cql_lexer::tokenize(&format!("{};", input)).unwrap();
        cql_parser::parse_expr(&commands.remove(0).tokens).unwrap()
    }

    /// Drains an executor into a vector of rows.
    pub fn drain(
        exec: &mut dyn Executor,
        vars: &mut VariableStore,
    ) -> Vec<Row> {
        let mut ctx = ExecContext { vars };
        exec.init(&mut ctx).unwrap();
        let mut rows = Vec::new();
        while let Some(row) = exec.next(&mut ctx).unwrap() {
            rows.push(row);
        }
        rows
    }

    /// Renders rows as comma-joined lines, like the session driver.
    pub fn render(rows: &[Row]) -> Vec<String> {
        rows.iter()
            .map(|row| {
                row.values()
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect()
    }
}
