use cql_ast::Value;

use crate::{
    error::EngineError,
    exec::{ExecContext, Executor, ExecutorRef},
    row::Row,
    schema::Schema,
};

/// Destination: passes child rows through unchanged and appends the
/// i-th column of every row to the i-th destination variable.
///
/// A `None` destination (written as a bare `@`) discards that column.
/// Listing more destinations than the row has columns appends Invalid
/// to the excess variables.
pub struct DestExec<'a> {
    destinations: Vec<Option<String>>,
    child: ExecutorRef<'a>,
}

impl<'a> DestExec<'a> {
    /// Creates a destination layer over `child`.
    pub fn new(destinations: Vec<Option<String>>, child: ExecutorRef<'a>) -> Self {
        DestExec {
            destinations,
            child,
        }
    }
}

impl Executor for DestExec<'_> {
    fn init(&mut self, ctx: &mut ExecContext<'_>) -> Result<(), EngineError> {
        self.child.init(ctx)
    }

    fn next(&mut self, ctx: &mut ExecContext<'_>) -> Result<Option<Row>, EngineError> {
        let row = match self.child.next(ctx)? {
            Some(row) => row,
            None => return Ok(None),
        };
        for (idx, destination) in self.destinations.iter().enumerate() {
            if let Some(name) = destination {
                let value = row.get(idx).cloned().unwrap_or(Value::Invalid);
                ctx.vars.append(name, value);
            }
        }
        Ok(Some(row))
    }

    fn schema(&self) -> &Schema {
        self.child.schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::test_helpers::*;
    use crate::exec::{ProjectionExec, SeqScanExec};
    use crate::vars::VariableStore;

    #[test]
    fn appends_columns_to_variables() {
        let table = people();
        let projection = ProjectionExec::new(
            vec![expr("#name"), expr("#age")],
            Some(Box::new(SeqScanExec::new(&table))),
        );
        let mut exec = DestExec::new(
            vec![None, Some("ages".into())],
            Box::new(projection),
        );
        let mut vars = VariableStore::new();
        let rows = drain(&mut exec, &mut vars);

        // rows pass through unchanged
        assert_eq!(rows.len(), 3);
        assert_eq!(
            vars.get("ages"),
            Some(&[Value::Float(30.0), Value::Float(25.0), Value::Float(40.0)][..])
        );
        // the discard slot bound nothing
        assert_eq!(vars.get("names"), None);
    }

    #[test]
    fn excess_destinations_get_invalid() {
        let table = people();
        let projection = ProjectionExec::new(
            vec![expr("#name")],
            Some(Box::new(SeqScanExec::new(&table))),
        );
        let mut exec = DestExec::new(
            vec![Some("names".into()), Some("extra".into())],
            Box::new(projection),
        );
        let mut vars = VariableStore::new();
        drain(&mut exec, &mut vars);
        assert_eq!(
            vars.get("extra"),
            Some(&[Value::Invalid, Value::Invalid, Value::Invalid][..])
        );
    }
}
