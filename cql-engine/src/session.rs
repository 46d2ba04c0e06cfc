//! The session driver.
//!
//! A [`Session`] owns the catalog and the variable store, executes
//! canonical commands (meta statements directly, queries through the
//! binder and planner), and writes query output to a caller-supplied
//! writer. Dirty tables are written back to their CSV files on
//! shutdown.

use std::io::Write;
use std::path::PathBuf;

use cql_ast::{is_const, DeleteStmt, InsertStmt, SelectStmt, Statement, UpdateStmt, Value};
use cql_core::{Keyword, Token};
use cql_lexer::Command;
use cql_parser::{parse_expr, parse_statement, ParserError};

use crate::{
    catalog::Catalog,
    error::{EngineError, EvalError},
    eval::{eval_predicate, evaluate},
    exec::ExecContext,
    planner::plan_select,
    schema::Schema,
    storage::{dump_table, load_table},
    table::Table,
    vars::VariableStore,
};

/// One interactive session: tables, variables and the statement
/// dispatcher.
///
/// Successful mutations and meta statements are quiet on stdout (their
/// bookkeeping goes to the log); stdout carries query rows, `schema`
/// and `disp` output, and warnings.
pub struct Session {
    catalog: Catalog,
    vars: VariableStore,
    data_dir: PathBuf,
}

impl Session {
    /// Creates a session whose CSV files live under `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Session {
            catalog: Catalog::new(),
            vars: VariableStore::new(),
            data_dir: data_dir.into(),
        }
    }

    /// The session's catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The session's variable store.
    pub fn variables(&self) -> &VariableStore {
        &self.vars
    }

    /// Tokenizes and executes a chunk of statements.
    ///
    /// The first failing statement aborts the remainder of the chunk;
    /// statements already executed stay executed.
    pub fn execute_source(
        &mut self,
        text: &str,
        out: &mut dyn Write,
    ) -> Result<(), EngineError> {
        for command in cql_lexer::tokenize(text)? {
            self.execute_command(&command, out)?;
        }
        Ok(())
    }

    /// Executes one canonical command.
    pub fn execute_command(
        &mut self,
        command: &Command,
        out: &mut dyn Write,
    ) -> Result<(), EngineError> {
        let leading = match command.tokens.first() {
            Some(token) => token,
            None => return Ok(()),
        };

        match leading {
            Token::Keyword(Keyword::Load) => self.run_load(command),
            Token::Keyword(Keyword::Create) => self.run_create(command, out),
            Token::Keyword(Keyword::Schema) => self.run_schema(command, out),
            Token::Keyword(Keyword::Read) => self.run_read(command, out),
            Token::Keyword(Keyword::Set) | Token::Keyword(Keyword::Var) => self.run_set(command),
            Token::Keyword(Keyword::Disp) | Token::Keyword(Keyword::Watch) => {
                self.run_disp(command, out)
            }
            _ => {
                let statement = parse_statement(command)?;
                tracing::debug!(%statement, "bound statement");
                match statement {
                    Statement::Select(stmt) => self.run_select(&stmt, out),
                    Statement::Insert(stmt) => self.run_insert(&stmt),
                    Statement::Update(stmt) => self.run_update(&stmt),
                    Statement::Delete(stmt) => self.run_delete(&stmt),
                }
            }
        }
    }

    /// Writes every dirty table back to `<name>.csv`. Failures are
    /// logged and skipped; this is the best-effort shutdown path.
    pub fn dump(&mut self) {
        for (name, entry) in self.catalog.iter_mut() {
            if !entry.dirty {
                continue;
            }
            let path = self.data_dir.join(format!("{}.csv", name));
            match dump_table(name, &path, &entry.table) {
                Ok(()) => entry.dirty = false,
                Err(error) => {
                    tracing::warn!(table = %name, %error, "failed to dump table");
                }
            }
        }
    }

    /// `load <tbl> [<tbl> ...]`
    fn run_load(&mut self, command: &Command) -> Result<(), EngineError> {
        let names = &command.tokens[1..];
        if names.is_empty() {
            return Err(bind("`load` names at least one table"));
        }
        for token in names {
            let name = match token {
                Token::Ident(name) => name,
                other => return Err(bind(format!("`load` takes table names, found `{}`", other))),
            };
            let path = self.data_dir.join(format!("{}.csv", name));
            let table = load_table(name, &path)?;
            self.catalog.insert(name.clone(), table, false);
        }
        Ok(())
    }

    /// `create table [if not exists] <name>(col:type, ...)`
    fn run_create(&mut self, command: &Command, out: &mut dyn Write) -> Result<(), EngineError> {
        let tokens = &command.tokens;
        if tokens.get(1) != Some(&Token::Keyword(Keyword::Table)) {
            return Err(bind("`create` only creates tables"));
        }

        let mut idx = 2;
        let if_not_exists = tokens.get(idx) == Some(&Token::Keyword(Keyword::If))
            && tokens.get(idx + 1) == Some(&Token::Keyword(Keyword::Not))
            && tokens.get(idx + 2) == Some(&Token::Keyword(Keyword::Exists));
        if if_not_exists {
            idx += 3;
        }

        let name = match tokens.get(idx) {
            Some(Token::Ident(name)) => name.clone(),
            _ => return Err(bind("expected a table name after `create table`")),
        };
        idx += 1;
        if tokens.get(idx) != Some(&Token::LeftParen) {
            return Err(bind("expected `(` to open the table header"));
        }
        idx += 1;

        let mut schema = Schema::new();
        loop {
            let column = match tokens.get(idx).and_then(Token::ident_text) {
                Some(column) => column.to_string(),
                None => return Err(bind("expected a column name in the table header")),
            };
            if tokens.get(idx + 1) != Some(&Token::Colon) {
                return Err(bind("expected `:` between column name and type"));
            }
            let type_name = match tokens.get(idx + 2).and_then(Token::ident_text) {
                Some(type_name) => type_name.to_string(),
                None => return Err(bind("expected a column type in the table header")),
            };
            schema.push_header_cell(&name, &format!("{}:{}", column, type_name))?;
            idx += 3;

            match tokens.get(idx) {
                Some(Token::Comma) => idx += 1,
                Some(Token::RightParen) => {
                    idx += 1;
                    break;
                }
                _ => return Err(bind("expected `,` or `)` in the table header")),
            }
        }
        if idx != tokens.len() {
            return Err(bind("trailing input after the table header"));
        }

        if self.catalog.contains(&name) {
            if if_not_exists {
                tracing::debug!(table = %name, "table exists, create skipped");
                return Ok(());
            }
            writeln!(out, "WARNING: overwriting table {}.", name)?;
            writeln!(out, "Hint: use `create table if not exists` instead.")?;
        }
        self.catalog.insert(name, Table::new(schema), true);
        Ok(())
    }

    /// `schema <tbl>`
    fn run_schema(&mut self, command: &Command, out: &mut dyn Write) -> Result<(), EngineError> {
        let name = match command.tokens.get(1) {
            Some(Token::Ident(name)) => name,
            _ => return Err(bind("`schema` takes one table name")),
        };
        let entry = self.catalog.get(name)?;
        writeln!(out, "{}", entry.table.schema())?;
        Ok(())
    }

    /// `read <file>`: executes every statement of a script file.
    fn run_read(&mut self, command: &Command, out: &mut dyn Write) -> Result<(), EngineError> {
        if command.tokens.len() < 2 {
            return Err(bind("`read` takes a file name"));
        }
        // the scanner splits `test.sql` into several tokens; their
        // concatenated lexemes restore the file name
        let mut filename = String::new();
        for token in &command.tokens[1..] {
            filename.push_str(&token.to_string());
        }
        let path = self.data_dir.join(&filename);
        let text = std::fs::read_to_string(&path)?;
        tracing::debug!(file = %filename, "reading script");
        self.execute_source(&text, out)
    }

    /// `set @v = <expr>[, <expr> ...]` (also spelled `var`)
    fn run_set(&mut self, command: &Command) -> Result<(), EngineError> {
        let tokens = &command.tokens;
        let name = match tokens.get(1) {
            Some(Token::VariableRef(name)) => name.clone(),
            _ => return Err(bind("expected a `@variable` to set")),
        };
        if tokens.get(2) != Some(&Token::Equal) {
            return Err(bind("expected `=` after the variable name"));
        }
        if tokens.len() <= 3 {
            return Err(bind("`set` needs at least one expression"));
        }

        let mut values = Vec::new();
        for window in tokens[3..].split(|token| *token == Token::Comma) {
            let root = parse_expr(window)?;
            if is_const(&root) {
                values.push(evaluate(&root, None, &self.vars, 0)?);
                continue;
            }
            // a non-const entry iterates its variables until exhausted
            let mut idx = 0;
            loop {
                let value = evaluate(&root, None, &self.vars, idx)?;
                if value.is_invalid() {
                    break;
                }
                values.push(value);
                idx += 1;
            }
        }
        tracing::debug!(variable = %name, count = values.len(), "variable bound");
        self.vars.set(name, values);
        Ok(())
    }

    /// `disp @v [@v ...]` (also spelled `watch`)
    fn run_disp(&mut self, command: &Command, out: &mut dyn Write) -> Result<(), EngineError> {
        let names = &command.tokens[1..];
        if names.is_empty() {
            return Err(bind("`disp` takes at least one variable"));
        }
        for token in names {
            let name = match token {
                Token::VariableRef(name) => name,
                other => return Err(bind(format!("`disp` takes variables, found `{}`", other))),
            };
            let values = self
                .vars
                .get(name)
                .ok_or_else(|| EvalError::UnknownVariable(name.clone()))?;
            let rendered: Vec<String> = values.iter().map(Value::to_string).collect();
            writeln!(out, "@{} = {{{}}}", name, rendered.join(","))?;
        }
        Ok(())
    }

    fn run_select(&mut self, stmt: &SelectStmt, out: &mut dyn Write) -> Result<(), EngineError> {
        let mut plan = plan_select(stmt, &self.catalog, &mut self.vars)?;
        let mut ctx = ExecContext {
            vars: &mut self.vars,
        };
        plan.init(&mut ctx)?;
        while let Some(row) = plan.next(&mut ctx)? {
            let rendered: Vec<String> = row.values().iter().map(Value::to_string).collect();
            writeln!(out, "{}", rendered.join(","))?;
        }
        Ok(())
    }

    fn run_insert(&mut self, stmt: &InsertStmt) -> Result<(), EngineError> {
        let entry = self.catalog.get_mut(&stmt.table)?;
        let cols = entry.table.schema().len();
        if cols == 0 || stmt.columns.len() % cols != 0 {
            return Err(EngineError::TupleWidth {
                exprs: stmt.columns.len(),
                cols,
            });
        }

        let mut count = 0usize;
        for chunk in stmt.columns.chunks(cols) {
            let const_flags: Vec<bool> = chunk.iter().map(|expr| is_const(expr)).collect();

            if const_flags.iter().all(|&c| c) {
                let mut values = Vec::with_capacity(cols);
                for expr in chunk {
                    values.push(evaluate(expr, None, &self.vars, 0)?);
                }
                entry.table.insert(values);
                count += 1;
                continue;
            }

            // a tuple holding variables expands row by row until every
            // non-const expression is exhausted
            let mut idx = 0;
            loop {
                let mut values = Vec::with_capacity(cols);
                for expr in chunk {
                    values.push(evaluate(expr, None, &self.vars, idx)?);
                }
                let live = const_flags
                    .iter()
                    .zip(&values)
                    .any(|(&is_c, value)| !is_c && !value.is_invalid());
                if !live {
                    break;
                }
                entry.table.insert(values);
                count += 1;
                idx += 1;
            }
        }

        entry.dirty = true;
        tracing::debug!(table = %stmt.table, rows = count, "rows inserted");
        Ok(())
    }

    fn run_update(&mut self, stmt: &UpdateStmt) -> Result<(), EngineError> {
        let entry = self.catalog.get_mut(&stmt.table)?;
        let col = entry
            .table
            .schema()
            .index_of(&stmt.column)
            .ok_or_else(|| EvalError::UnknownColumn(stmt.column.clone()))?;

        let mut count = 0usize;
        for idx in 0..entry.table.len() {
            let new_value = {
                let row = &entry.table.rows()[idx];
                if row.is_deleted() {
                    continue;
                }
                let input = Some((entry.table.schema(), row));
                if let Some(selection) = &stmt.selection {
                    if !eval_predicate(selection, input, &self.vars, 0)? {
                        continue;
                    }
                }
                evaluate(&stmt.value, input, &self.vars, 0)?
            };
            if entry.table.update_row(idx, col, new_value) {
                count += 1;
            }
        }

        entry.dirty = true;
        tracing::debug!(table = %stmt.table, rows = count, "rows updated");
        Ok(())
    }

    fn run_delete(&mut self, stmt: &DeleteStmt) -> Result<(), EngineError> {
        let entry = self.catalog.get_mut(&stmt.table)?;

        let mut count = 0usize;
        for idx in 0..entry.table.len() {
            {
                let row = &entry.table.rows()[idx];
                if row.is_deleted() {
                    continue;
                }
                if let Some(selection) = &stmt.selection {
                    let input = Some((entry.table.schema(), row));
                    if !eval_predicate(selection, input, &self.vars, 0)? {
                        continue;
                    }
                }
            }
            if entry.table.delete_row(idx) {
                count += 1;
            }
        }

        entry.dirty = true;
        tracing::debug!(table = %stmt.table, rows = count, "rows deleted");
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // best-effort write-back; failures are logged inside
        self.dump();
    }
}

fn bind(message: impl Into<String>) -> EngineError {
    ParserError::Bind(message.into()).into()
}
