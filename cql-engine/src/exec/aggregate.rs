use cql_ast::{find_agg_exprs, AggOp, DataType, Expr, ExprRef, OrderByExpr, Value};
use indexmap::IndexMap;

use crate::{
    error::EngineError,
    eval::evaluate,
    exec::{ExecContext, Executor, ExecutorRef},
    row::Row,
    schema::Schema,
};

/// One aggregate's running state.
enum AggAcc {
    /// `count(x)`: non-Invalid inputs seen.
    Count(f64),
    /// `sum(x)`: float addition, boolean or, string concatenation,
    /// picked by the tag of the first value.
    Sum(Option<Value>),
    Min(Option<Value>),
    Max(Option<Value>),
    /// `agg(x)`: last value wins.
    Last(Value),
}

impl AggAcc {
    fn new(op: AggOp) -> Self {
        match op {
            AggOp::Count => AggAcc::Count(0.0),
            AggOp::Sum => AggAcc::Sum(None),
            AggOp::Min => AggAcc::Min(None),
            AggOp::Max => AggAcc::Max(None),
            AggOp::Agg => AggAcc::Last(Value::Invalid),
        }
    }

    fn feed(&mut self, value: Value) {
        match self {
            AggAcc::Count(n) => {
                if !value.is_invalid() {
                    *n += 1.0;
                }
            }
            AggAcc::Sum(acc) => {
                if value.is_invalid() {
                    return;
                }
                match acc {
                    None => *acc = Some(value),
                    Some(Value::Float(total)) => {
                        if let Value::Float(v) = value.to_float() {
                            *total += v;
                        }
                    }
                    Some(Value::Bool(any)) => {
                        if let Value::Bool(v) = value.to_bool() {
                            *any = *any || v;
                        }
                    }
                    Some(Value::Char(joined)) => joined.push_str(&value.to_string()),
                    Some(Value::Invalid) => {}
                }
            }
            AggAcc::Min(acc) => {
                if value.is_invalid() {
                    return;
                }
                let replace = match acc {
                    None => true,
                    Some(current) => {
                        matches!(value.try_cmp(current), Some(core::cmp::Ordering::Less))
                    }
                };
                if replace {
                    *acc = Some(value);
                }
            }
            AggAcc::Max(acc) => {
                if value.is_invalid() {
                    return;
                }
                let replace = match acc {
                    None => true,
                    Some(current) => {
                        matches!(value.try_cmp(current), Some(core::cmp::Ordering::Greater))
                    }
                };
                if replace {
                    *acc = Some(value);
                }
            }
            AggAcc::Last(last) => *last = value,
        }
    }

    fn finish(self) -> Value {
        match self {
            AggAcc::Count(n) => Value::Float(n),
            AggAcc::Sum(acc) | AggAcc::Min(acc) | AggAcc::Max(acc) => {
                acc.unwrap_or(Value::Invalid)
            }
            AggAcc::Last(last) => last,
        }
    }
}

/// Aggregation: groups the child's rows by the group-by key tuple and
/// reduces every aggregate expression per group.
///
/// The child is drained when the plan is built, not on `init`; the
/// executor then serves the materialized result. Groups are emitted in
/// first-seen order. The output schema is the group-by labels followed
/// by the aggregate labels; its column types stay unspecified, the
/// value tags carry the actual types.
pub struct AggregateExec {
    schema: Schema,
    rows: Vec<Row>,
    cursor: usize,
}

impl AggregateExec {
    /// Drains `child` and materializes one row per group.
    ///
    /// `columns`, `order_by` and `having` are scanned for aggregate
    /// nodes; each discovered aggregate becomes one output column keyed
    /// by its textual form.
    pub fn build(
        columns: &[ExprRef],
        group_by: &[ExprRef],
        order_by: &[OrderByExpr],
        having: Option<&ExprRef>,
        mut child: ExecutorRef<'_>,
        ctx: &mut ExecContext<'_>,
    ) -> Result<Self, EngineError> {
        let mut agg_exprs: IndexMap<String, ExprRef> = IndexMap::new();
        for expr in columns {
            find_agg_exprs(expr, &mut agg_exprs);
        }
        for order in order_by {
            find_agg_exprs(&order.expr, &mut agg_exprs);
        }
        if let Some(having) = having {
            find_agg_exprs(having, &mut agg_exprs);
        }

        let mut schema = Schema::new();
        for key in group_by {
            schema.push(DataType::Invalid, key.label());
        }
        for label in agg_exprs.keys() {
            schema.push(DataType::Invalid, label.clone());
        }

        // (operator, argument) per aggregate column
        let reducers: Vec<(AggOp, ExprRef)> = agg_exprs
            .values()
            .map(|expr| match expr.as_ref() {
                Expr::Aggregate { op, child } => (*op, child.clone()),
                other => unreachable!("non-aggregate in discovery: {}", other),
            })
            .collect();

        let mut groups: IndexMap<String, (Vec<Value>, Vec<AggAcc>)> = IndexMap::new();
        child.init(ctx)?;
        while let Some(row) = child.next(ctx)? {
            let input = Some((child.schema(), &row));

            let mut key_values = Vec::with_capacity(group_by.len());
            let mut key = String::new();
            for key_expr in group_by {
                let value = evaluate(key_expr, input, ctx.vars, 0)?;
                key.push_str(&value.to_string());
                key.push('\u{0}');
                key_values.push(value);
            }

            let state = groups.entry(key).or_insert_with(|| {
                let accs = reducers.iter().map(|(op, _)| AggAcc::new(*op)).collect();
                (key_values, accs)
            });
            for ((_, arg), acc) in reducers.iter().zip(state.1.iter_mut()) {
                acc.feed(evaluate(arg, input, ctx.vars, 0)?);
            }
        }

        let rows = groups
            .into_values()
            .map(|(mut values, accs)| {
                values.extend(accs.into_iter().map(AggAcc::finish));
                Row::new(values)
            })
            .collect();

        Ok(AggregateExec {
            schema,
            rows,
            cursor: 0,
        })
    }
}

impl Executor for AggregateExec {
    fn init(&mut self, _ctx: &mut ExecContext<'_>) -> Result<(), EngineError> {
        self.cursor = 0;
        Ok(())
    }

    fn next(&mut self, _ctx: &mut ExecContext<'_>) -> Result<Option<Row>, EngineError> {
        let row = self.rows.get(self.cursor).cloned();
        if row.is_some() {
            self.cursor += 1;
        }
        Ok(row)
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::test_helpers::*;
    use crate::exec::SeqScanExec;
    use crate::vars::VariableStore;

    fn aggregate(
        columns: &[ExprRef],
        group_by: &[ExprRef],
        vars: &mut VariableStore,
    ) -> AggregateExec {
        let table = people();
        let mut ctx = ExecContext { vars };
        // carol is inserted by the fixture with age 40
        AggregateExec::build(
            columns,
            group_by,
            &[],
            None,
            Box::new(SeqScanExec::new(&table)),
            &mut ctx,
        )
        .unwrap()
    }

    #[test]
    fn groups_partition_the_input() {
        let mut vars = VariableStore::new();
        let mut exec = aggregate(
            &[expr("count(#name)")],
            &[expr("#name > 'b'")],
            &mut vars,
        );
        let rows = drain(&mut exec, &mut vars);
        // first-seen order: alice's group (false), then bob's (true)
        assert_eq!(render(&rows), vec!["False,1", "True,2"]);
        assert_eq!(exec.schema().columns()[0].name, "(#name)>(b)");
        assert_eq!(exec.schema().columns()[1].name, "count(#name)");
    }

    #[test]
    fn reducers() {
        let mut vars = VariableStore::new();
        let mut exec = aggregate(
            &[
                expr("sum(#age)"),
                expr("min(#age)"),
                expr("max(#age)"),
                expr("agg(#name)"),
            ],
            &[expr("1")],
            &mut vars,
        );
        let rows = drain(&mut exec, &mut vars);
        assert_eq!(render(&rows), vec!["1,95,25,40,carol"]);
    }

    #[test]
    fn string_sum_concatenates() {
        let mut vars = VariableStore::new();
        let mut exec = aggregate(&[expr("sum(#name)")], &[expr("1")], &mut vars);
        let rows = drain(&mut exec, &mut vars);
        assert_eq!(render(&rows), vec!["1,alicebobcarol"]);
    }

    #[test]
    fn duplicate_labels_share_one_column() {
        let mut vars = VariableStore::new();
        let exec = aggregate(
            &[expr("count(#name)"), expr("count(#name) + 1")],
            &[expr("#age > 26")],
            &mut vars,
        );
        // one group-by column plus a single count column
        assert_eq!(exec.schema().len(), 2);
    }
}
