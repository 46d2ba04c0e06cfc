use cql_ast::ExprRef;

use crate::{
    error::EngineError,
    eval::eval_predicate,
    exec::{ExecContext, Executor, ExecutorRef},
    row::Row,
    schema::Schema,
};

/// Filter: drops child rows whose predicate is not true. Also serves as
/// the having layer, with the predicate rewritten against the
/// aggregation output schema.
pub struct FilterExec<'a> {
    predicate: ExprRef,
    child: ExecutorRef<'a>,
}

impl<'a> FilterExec<'a> {
    /// Creates a filter over `child`.
    pub fn new(predicate: ExprRef, child: ExecutorRef<'a>) -> Self {
        FilterExec { predicate, child }
    }
}

impl Executor for FilterExec<'_> {
    fn init(&mut self, ctx: &mut ExecContext<'_>) -> Result<(), EngineError> {
        self.child.init(ctx)
    }

    fn next(&mut self, ctx: &mut ExecContext<'_>) -> Result<Option<Row>, EngineError> {
        while let Some(row) = self.child.next(ctx)? {
            let keep = eval_predicate(
                &self.predicate,
                Some((self.child.schema(), &row)),
                ctx.vars,
                0,
            )?;
            if keep {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }

    fn schema(&self) -> &Schema {
        self.child.schema()
    }
}
