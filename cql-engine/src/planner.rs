//! The planner: wraps executors around a bound select in a fixed
//! order, skipping every layer whose clause slot is empty.
//!
//! ```txt
//! Scan -> Filter -> Aggregate -> Having -> Sort -> Limit -> Projection -> Dest
//! ```

use cql_ast::{agg_as_column, find_agg_exprs, OrderByExpr, SelectStmt};
use indexmap::IndexMap;

use crate::{
    catalog::Catalog,
    error::EngineError,
    exec::{
        AggregateExec, DestExec, ExecContext, ExecutorRef, FilterExec, LimitExec, ProjectionExec,
        SeqScanExec, SortExec,
    },
    vars::VariableStore,
};

/// Builds the executor pipeline for a bound select.
///
/// The plan borrows its scanned table from the catalog; the variable
/// store is borrowed only while building (the aggregation layer drains
/// its input here, per its construction-time contract).
pub fn plan_select<'a>(
    stmt: &SelectStmt,
    catalog: &'a Catalog,
    vars: &mut VariableStore,
) -> Result<ExecutorRef<'a>, EngineError> {
    if stmt.columns.is_empty() {
        return Err(EngineError::Plan("no item selected".to_string()));
    }

    let mut plan: Option<ExecutorRef<'a>> = None;

    if let Some(table) = &stmt.table {
        let entry = catalog.get(table)?;
        plan = Some(Box::new(SeqScanExec::new(&entry.table)));
    }

    if let Some(selection) = &stmt.selection {
        let child = plan.take().ok_or_else(|| {
            EngineError::Plan("`where` requires a `from` table".to_string())
        })?;
        plan = Some(Box::new(FilterExec::new(selection.clone(), child)));
    }

    // the aggregation layer runs when there is a group-by list, or when
    // any clause mentions an aggregate (then over one implicit group)
    let mut aggs = IndexMap::new();
    for expr in &stmt.columns {
        find_agg_exprs(expr, &mut aggs);
    }
    for order in &stmt.order_by {
        find_agg_exprs(&order.expr, &mut aggs);
    }
    if let Some(having) = &stmt.having {
        find_agg_exprs(having, &mut aggs);
    }
    let is_agg = !stmt.group_by.is_empty() || !aggs.is_empty();

    if is_agg {
        let child = plan.take().ok_or_else(|| {
            EngineError::Plan("aggregation requires a `from` table".to_string())
        })?;
        let mut ctx = ExecContext { vars };
        let aggregate = AggregateExec::build(
            &stmt.columns,
            &stmt.group_by,
            &stmt.order_by,
            stmt.having.as_ref(),
            child,
            &mut ctx,
        )?;
        plan = Some(Box::new(aggregate));

        if let Some(having) = &stmt.having {
            let child = plan.take().expect("aggregate layer was just planned");
            plan = Some(Box::new(FilterExec::new(agg_as_column(having), child)));
        }
    }

    if !stmt.order_by.is_empty() {
        let child = plan.take().ok_or_else(|| {
            EngineError::Plan("`order by` requires a `from` table".to_string())
        })?;
        let order_by: Vec<OrderByExpr> = stmt
            .order_by
            .iter()
            .map(|order| OrderByExpr {
                expr: if is_agg {
                    agg_as_column(&order.expr)
                } else {
                    order.expr.clone()
                },
                direction: order.direction,
            })
            .collect();
        plan = Some(Box::new(SortExec::new(order_by, child)));
    }

    if stmt.limit.is_some() || stmt.offset != 0 {
        let child = plan.take().ok_or_else(|| {
            EngineError::Plan("`limit` requires a `from` table".to_string())
        })?;
        plan = Some(Box::new(LimitExec::new(stmt.limit, stmt.offset, child)));
    }

    let columns = if is_agg {
        stmt.columns.iter().map(agg_as_column).collect()
    } else {
        stmt.columns.clone()
    };
    let mut plan: ExecutorRef<'a> = Box::new(ProjectionExec::new(columns, plan));

    if !stmt.destinations.is_empty() {
        plan = Box::new(DestExec::new(stmt.destinations.clone(), plan));
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use cql_ast::Statement;

    use super::*;
    use crate::exec::test_helpers::{people, render};

    fn run(catalog: &Catalog, vars: &mut VariableStore, input: &str) -> Vec<String> {
        let mut commands = cql_lexer::tokenize(input).unwrap();
        let stmt = match cql_parser::parse_statement(&commands.remove(0)).unwrap() {
            Statement::Select(stmt) => stmt,
            other => panic!("expected a select, got {}", other),
        };
        let mut plan = plan_select(&stmt, catalog, vars).unwrap();
        let mut ctx = ExecContext { vars };
        plan.init(&mut ctx).unwrap();
        let mut rows = Vec::new();
        while let Some(row) = plan.next(&mut ctx).unwrap() {
            rows.push(row);
        }
        render(&rows)
    }

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.insert("people", people(), false);
        catalog
    }

    #[test]
    fn layers_compose_in_the_fixed_order() {
        let catalog = catalog();
        let mut vars = VariableStore::new();
        assert_eq!(
            run(
                &catalog,
                &mut vars,
                "select #name from people where #age > 20 order by #age desc limit 2;"
            ),
            vec!["carol", "alice"]
        );
    }

    #[test]
    fn aggregates_flow_through_having_sort_and_projection() {
        let catalog = catalog();
        let mut vars = VariableStore::new();
        assert_eq!(
            run(
                &catalog,
                &mut vars,
                "select count(#name) from people group by #age > 26 \
                 having count(#name) >= 1 order by count(#name) asc;"
            ),
            vec!["1", "2"]
        );
    }

    #[test]
    fn aggregate_without_group_by_runs_over_one_group() {
        let catalog = catalog();
        let mut vars = VariableStore::new();
        assert_eq!(
            run(&catalog, &mut vars, "select sum(#age) from people;"),
            vec!["95"]
        );
    }

    #[test]
    fn missing_table_is_a_catalog_error() {
        let catalog = catalog();
        let mut vars = VariableStore::new();
        let mut commands = cql_lexer::tokenize("select #a from nowhere;").unwrap();
        let stmt = match cql_parser::parse_statement(&commands.remove(0)).unwrap() {
            Statement::Select(stmt) => stmt,
            other => panic!("expected a select, got {}", other),
        };
        assert!(matches!(
            plan_select(&stmt, &catalog, &mut vars),
            Err(EngineError::Catalog(_))
        ));
    }
}
