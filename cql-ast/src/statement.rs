use core::fmt;

use crate::expression::ExprRef;
use crate::util::DisplaySeparated;

/// Sort direction of one `order by` key.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OrderDirection {
    /// Ascending (the default).
    Asc,
    /// Descending.
    Desc,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrderDirection::Asc => "asc",
            OrderDirection::Desc => "desc",
        })
    }
}

/// One `order by` key: an expression plus its direction tag.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderByExpr {
    /// The key expression.
    pub expr: ExprRef,
    /// Ascending or descending.
    pub direction: OrderDirection,
}

impl fmt::Display for OrderByExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.expr, self.direction)
    }
}

/// A bound statement: the binder's output, consumed by the planner.
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    /// `select ...`
    Select(SelectStmt),
    /// `insert into ...`
    Insert(InsertStmt),
    /// `update ... set ...`
    Update(UpdateStmt),
    /// `delete from ...`
    Delete(DeleteStmt),
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Select(stmt) => write!(f, "{}", stmt),
            Statement::Insert(stmt) => write!(f, "{}", stmt),
            Statement::Update(stmt) => write!(f, "{}", stmt),
            Statement::Delete(stmt) => write!(f, "{}", stmt),
        }
    }
}

/// The `select` statement.
///
/// ```txt
/// select <exprs> [from <table>] [where <expr>]
///     [order by <expr> [asc|desc], ...] [group by <exprs>]
///     [having <expr>] [limit N] [offset N] [dest @v ...]
/// ```
///
/// Unused clause slots stay empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectStmt {
    /// The projection expressions.
    pub columns: Vec<ExprRef>,
    /// The scanned table, if any; a select without a table evaluates
    /// its projections standalone.
    pub table: Option<String>,
    /// The `where` predicate.
    pub selection: Option<ExprRef>,
    /// The `group by` key expressions.
    pub group_by: Vec<ExprRef>,
    /// The `having` predicate.
    pub having: Option<ExprRef>,
    /// The `order by` keys.
    pub order_by: Vec<OrderByExpr>,
    /// Row ceiling; `None` means unlimited.
    pub limit: Option<usize>,
    /// Rows to skip before emitting.
    pub offset: usize,
    /// Destination variables, one per projected column; `None` is the
    /// discard slot written as a bare `@`.
    pub destinations: Vec<Option<String>>,
}

impl fmt::Display for SelectStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "select {}", DisplaySeparated(&self.columns, ", "))?;
        if let Some(table) = &self.table {
            write!(f, " from {}", table)?;
        }
        if let Some(selection) = &self.selection {
            write!(f, " where {}", selection)?;
        }
        if !self.group_by.is_empty() {
            write!(f, " group by {}", DisplaySeparated(&self.group_by, ", "))?;
        }
        if let Some(having) = &self.having {
            write!(f, " having {}", having)?;
        }
        if !self.order_by.is_empty() {
            write!(f, " order by {}", DisplaySeparated(&self.order_by, ", "))?;
        }
        if let Some(limit) = self.limit {
            write!(f, " limit {}", limit)?;
        }
        if self.offset != 0 {
            write!(f, " offset {}", self.offset)?;
        }
        if !self.destinations.is_empty() {
            write!(f, " dest")?;
            for dest in &self.destinations {
                match dest {
                    Some(name) => write!(f, " @{}", name)?,
                    None => write!(f, " @")?,
                }
            }
        }
        Ok(())
    }
}

/// The `insert` statement.
///
/// ```txt
/// insert into <table> values { <expr>, ... }, { ... }, ...
/// ```
///
/// The tuple expressions are kept flat; the split into rows happens at
/// execution, where the table width is known.
#[derive(Clone, Debug, PartialEq)]
pub struct InsertStmt {
    /// Target table.
    pub table: String,
    /// The flattened tuple expressions.
    pub columns: Vec<ExprRef>,
}

impl fmt::Display for InsertStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "insert into {} values {{{}}}",
            self.table,
            DisplaySeparated(&self.columns, ", ")
        )
    }
}

/// The `update` statement.
///
/// ```txt
/// update <table> set <col> = <expr> [where <expr>]
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateStmt {
    /// Target table.
    pub table: String,
    /// The updated column (name without the `#` sigil).
    pub column: String,
    /// The new value, evaluated per row.
    pub value: ExprRef,
    /// The `where` predicate.
    pub selection: Option<ExprRef>,
}

impl fmt::Display for UpdateStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "update {} set #{} = {}", self.table, self.column, self.value)?;
        if let Some(selection) = &self.selection {
            write!(f, " where {}", selection)?;
        }
        Ok(())
    }
}

/// The `delete` statement.
///
/// ```txt
/// delete from <table> [where <expr>]
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DeleteStmt {
    /// Target table.
    pub table: String,
    /// The `where` predicate; absent means every row.
    pub selection: Option<ExprRef>,
}

impl fmt::Display for DeleteStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "delete from {}", self.table)?;
        if let Some(selection) = &self.selection {
            write!(f, " where {}", selection)?;
        }
        Ok(())
    }
}
