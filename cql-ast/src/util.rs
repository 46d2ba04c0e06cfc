use indexmap::IndexMap;

use crate::expression::{BinaryOp, Expr, ExprRef};

/// Returns true if the expression references no per-row or per-index
/// state, i.e. evaluating it once is enough.
///
/// Column and variable references make a tree non-const, with one
/// exception: an `in` expression reads its variable as a whole set, not
/// element by element, so it counts as const.
pub fn is_const(expr: &Expr) -> bool {
    match expr {
        Expr::Const(_) => true,
        Expr::Column(_) | Expr::Variable(_) => false,
        Expr::Unary { child, .. } => is_const(child),
        Expr::Binary { op: BinaryOp::In, lhs, .. } => is_const(lhs),
        Expr::Binary { lhs, rhs, .. } => is_const(lhs) && is_const(rhs),
        Expr::Aggregate { .. } => false,
    }
}

/// Collects every aggregate node of the tree, keyed by its textual form.
///
/// The map keeps first-seen order, which also fixes the column order of
/// the aggregation output schema.
pub fn find_agg_exprs(expr: &ExprRef, found: &mut IndexMap<String, ExprRef>) {
    match expr.as_ref() {
        Expr::Aggregate { .. } => {
            found.entry(expr.label()).or_insert_with(|| expr.clone());
        }
        Expr::Unary { child, .. } => find_agg_exprs(child, found),
        Expr::Binary { lhs, rhs, .. } => {
            find_agg_exprs(lhs, found);
            find_agg_exprs(rhs, found);
        }
        Expr::Const(_) | Expr::Column(_) | Expr::Variable(_) => {}
    }
}

/// Rewrites a tree, replacing every aggregate node with a column
/// reference named after the aggregate's textual form.
///
/// Clauses downstream of the aggregation layer (having, order by, the
/// projection list) run through this so they address the aggregation
/// output schema with plain column lookups.
pub fn agg_as_column(expr: &ExprRef) -> ExprRef {
    match expr.as_ref() {
        Expr::Aggregate { .. } => Expr::Column(expr.label()).into_ref(),
        Expr::Unary { op, child } => Expr::Unary {
            op: *op,
            child: agg_as_column(child),
        }
        .into_ref(),
        Expr::Binary { op, lhs, rhs } => Expr::Binary {
            op: *op,
            lhs: agg_as_column(lhs),
            rhs: agg_as_column(rhs),
        }
        .into_ref(),
        Expr::Const(_) | Expr::Column(_) | Expr::Variable(_) => expr.clone(),
    }
}

pub(crate) struct DisplaySeparated<'a, T>(pub &'a [T], pub &'static str);

impl<T: core::fmt::Display> core::fmt::Display for DisplaySeparated<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut first = true;
        for item in self.0 {
            if !first {
                f.write_str(self.1)?;
            }
            write!(f, "{}", item)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AggOp, UnaryOp, Value};

    fn column(name: &str) -> ExprRef {
        Expr::Column(name.into()).into_ref()
    }

    fn constant(v: f64) -> ExprRef {
        Expr::Const(Value::Float(v)).into_ref()
    }

    fn binary(op: BinaryOp, lhs: ExprRef, rhs: ExprRef) -> ExprRef {
        Expr::Binary { op, lhs, rhs }.into_ref()
    }

    #[test]
    fn const_classification() {
        assert!(is_const(&binary(BinaryOp::Add, constant(1.0), constant(2.0))));
        assert!(!is_const(&binary(BinaryOp::Add, constant(1.0), column("a"))));
        assert!(!is_const(&Expr::Variable("x".into())));
        assert!(is_const(&Expr::Unary {
            op: UnaryOp::Sin,
            child: constant(0.5),
        }));
        // `in` reads its variable as a set; the tree stays const
        assert!(is_const(&binary(
            BinaryOp::In,
            constant(1.0),
            Expr::Variable("xs".into()).into_ref(),
        )));
    }

    #[test]
    fn aggregate_discovery_and_rewriting() {
        let count = Expr::Aggregate {
            op: AggOp::Count,
            child: column("name"),
        }
        .into_ref();
        let tree = binary(BinaryOp::Gt, count.clone(), constant(1.0));

        let mut found = IndexMap::new();
        find_agg_exprs(&tree, &mut found);
        assert_eq!(found.len(), 1);
        assert!(found.contains_key("count(#name)"));

        let rewritten = agg_as_column(&tree);
        match rewritten.as_ref() {
            Expr::Binary { lhs, .. } => {
                assert_eq!(lhs.as_ref(), &Expr::Column("count(#name)".into()));
            }
            other => panic!("unexpected rewrite: {:?}", other),
        }
        // the original tree is untouched
        let mut again = IndexMap::new();
        find_agg_exprs(&tree, &mut again);
        assert_eq!(again.len(), 1);
    }

    #[test]
    fn rewriting_keeps_plain_references() {
        let tree = binary(BinaryOp::Add, column("a"), Expr::Variable("v".into()).into_ref());
        let rewritten = agg_as_column(&tree);
        assert_eq!(rewritten.as_ref(), tree.as_ref());
    }
}
