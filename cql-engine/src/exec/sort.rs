use core::cmp::Ordering;

use cql_ast::{OrderByExpr, OrderDirection, Value};

use crate::{
    error::EngineError,
    eval::evaluate,
    exec::{ExecContext, Executor, ExecutorRef},
    row::Row,
    schema::Schema,
};

/// The order-by comparator: direction tags over pre-evaluated key
/// tuples. Keys compare left to right, equal keys fall through to the
/// next one; rows equal under every key keep their relative order (the
/// sort is stable).
struct RowComparator {
    directions: Vec<OrderDirection>,
}

impl RowComparator {
    fn compare(&self, a: &[Value], b: &[Value]) -> Ordering {
        for (idx, direction) in self.directions.iter().enumerate() {
            // keys of mismatched type tags rank as equal
            let ordering = match a[idx].try_cmp(&b[idx]) {
                Some(ordering) => ordering,
                None => continue,
            };
            if ordering == Ordering::Equal {
                continue;
            }
            return match direction {
                OrderDirection::Asc => ordering,
                OrderDirection::Desc => ordering.reverse(),
            };
        }
        Ordering::Equal
    }
}

/// Sort: drains the child on `init`, evaluates the key tuple of every
/// row once, stable-sorts, then emits one row per `next`.
pub struct SortExec<'a> {
    order_by: Vec<OrderByExpr>,
    child: ExecutorRef<'a>,
    sorted: Vec<Row>,
    cursor: usize,
}

impl<'a> SortExec<'a> {
    /// Creates a sort over `child` with the given keys.
    pub fn new(order_by: Vec<OrderByExpr>, child: ExecutorRef<'a>) -> Self {
        SortExec {
            order_by,
            child,
            sorted: Vec::new(),
            cursor: 0,
        }
    }
}

impl Executor for SortExec<'_> {
    fn init(&mut self, ctx: &mut ExecContext<'_>) -> Result<(), EngineError> {
        self.cursor = 0;
        self.sorted.clear();
        self.child.init(ctx)?;

        let mut keyed: Vec<(Vec<Value>, Row)> = Vec::new();
        while let Some(row) = self.child.next(ctx)? {
            let mut key = Vec::with_capacity(self.order_by.len());
            for order in &self.order_by {
                key.push(evaluate(
                    &order.expr,
                    Some((self.child.schema(), &row)),
                    ctx.vars,
                    0,
                )?);
            }
            keyed.push((key, row));
        }

        let comparator = RowComparator {
            directions: self.order_by.iter().map(|o| o.direction).collect(),
        };
        keyed.sort_by(|a, b| comparator.compare(&a.0, &b.0));
        self.sorted = keyed.into_iter().map(|(_, row)| row).collect();
        Ok(())
    }

    fn next(&mut self, _ctx: &mut ExecContext<'_>) -> Result<Option<Row>, EngineError> {
        let row = self.sorted.get(self.cursor).cloned();
        if row.is_some() {
            self.cursor += 1;
        }
        Ok(row)
    }

    fn schema(&self) -> &Schema {
        self.child.schema()
    }
}
