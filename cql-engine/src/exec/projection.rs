use cql_ast::{is_const, DataType, ExprRef};

use crate::{
    error::EngineError,
    eval::evaluate,
    exec::{ExecContext, Executor, ExecutorRef},
    row::Row,
    schema::Schema,
};

/// Projection: evaluates the projection expressions into rows under a
/// synthetic schema whose column names are the expressions' textual
/// forms.
///
/// Three modes, picked by construction:
///   1. with a child, each child row is mapped through the expressions;
///   2. without a child and all-const expressions, exactly one row is
///      emitted;
///   3. without a child but with variables, rows are emitted under an
///      increasing variable index until every expression comes back
///      Invalid.
pub struct ProjectionExec<'a> {
    exprs: Vec<ExprRef>,
    schema: Schema,
    child: Option<ExecutorRef<'a>>,
    all_const: bool,
    cursor: usize,
}

impl<'a> ProjectionExec<'a> {
    /// Creates a projection over `child`, or a standalone one.
    pub fn new(exprs: Vec<ExprRef>, child: Option<ExecutorRef<'a>>) -> Self {
        let mut schema = Schema::new();
        for expr in &exprs {
            schema.push(DataType::Invalid, expr.label());
        }
        let all_const = exprs.iter().all(|expr| is_const(expr));
        ProjectionExec {
            exprs,
            schema,
            child,
            all_const,
            cursor: 0,
        }
    }
}

impl Executor for ProjectionExec<'_> {
    fn init(&mut self, ctx: &mut ExecContext<'_>) -> Result<(), EngineError> {
        self.cursor = 0;
        match &mut self.child {
            Some(child) => child.init(ctx),
            None => Ok(()),
        }
    }

    fn next(&mut self, ctx: &mut ExecContext<'_>) -> Result<Option<Row>, EngineError> {
        if let Some(child) = &mut self.child {
            let row = match child.next(ctx)? {
                Some(row) => row,
                None => return Ok(None),
            };
            let mut values = Vec::with_capacity(self.exprs.len());
            for expr in &self.exprs {
                values.push(evaluate(expr, Some((child.schema(), &row)), ctx.vars, 0)?);
            }
            return Ok(Some(Row::new(values)));
        }

        if self.all_const {
            if self.cursor > 0 {
                return Ok(None);
            }
            self.cursor = 1;
            let mut values = Vec::with_capacity(self.exprs.len());
            for expr in &self.exprs {
                values.push(evaluate(expr, None, ctx.vars, 0)?);
            }
            return Ok(Some(Row::new(values)));
        }

        // variable iteration: stop once every expression is exhausted
        let mut values = Vec::with_capacity(self.exprs.len());
        let mut exhausted = true;
        for expr in &self.exprs {
            let value = evaluate(expr, None, ctx.vars, self.cursor)?;
            if !value.is_invalid() {
                exhausted = false;
            }
            values.push(value);
        }
        if exhausted {
            return Ok(None);
        }
        self.cursor += 1;
        Ok(Some(Row::new(values)))
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }
}

#[cfg(test)]
mod tests {
    use cql_ast::Value;

    use super::*;
    use crate::exec::test_helpers::*;
    use crate::exec::SeqScanExec;
    use crate::vars::VariableStore;

    #[test]
    fn maps_child_rows() {
        let table = people();
        let mut exec = ProjectionExec::new(
            vec![expr("#name"), expr("#age * 2")],
            Some(Box::new(SeqScanExec::new(&table))),
        );
        let mut vars = VariableStore::new();
        let rows = drain(&mut exec, &mut vars);
        assert_eq!(render(&rows), vec!["alice,60", "bob,50", "carol,80"]);
        assert_eq!(exec.schema().columns()[1].name, "(#age)*(2)");
    }

    #[test]
    fn const_projection_emits_one_row() {
        let mut exec = ProjectionExec::new(vec![expr("2 + 3"), expr("'x'")], None);
        let mut vars = VariableStore::new();
        let rows = drain(&mut exec, &mut vars);
        assert_eq!(render(&rows), vec!["5,x"]);
    }

    #[test]
    fn variable_projection_iterates_until_exhausted() {
        let mut vars = VariableStore::new();
        vars.set(
            "x",
            vec![Value::Float(1.0), Value::Float(2.0), Value::Float(3.0)],
        );
        let mut exec = ProjectionExec::new(vec![expr("@x * @x")], None);
        let rows = drain(&mut exec, &mut vars);
        assert_eq!(render(&rows), vec!["1", "4", "9"]);
    }

    #[test]
    fn uneven_variables_pad_with_invalid() {
        let mut vars = VariableStore::new();
        vars.set("a", vec![Value::Float(1.0), Value::Float(2.0)]);
        vars.set("b", vec![Value::Float(10.0)]);
        let mut exec = ProjectionExec::new(vec![expr("@a"), expr("@b")], None);
        let rows = drain(&mut exec, &mut vars);
        assert_eq!(render(&rows), vec!["1,10", "2,NULL"]);
    }
}
