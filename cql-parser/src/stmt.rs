//! The statement binder.
//!
//! A canonical command is bound by dispatching on its leading keyword,
//! locating the optional clause keywords, and handing each clause
//! window to the expression compiler.

use cql_ast::{
    DeleteStmt, InsertStmt, OrderByExpr, OrderDirection, SelectStmt, Statement, UpdateStmt,
};
use cql_core::{Keyword, Token};
use cql_lexer::Command;

use crate::{
    error::{bind_error, ParserError},
    expr::parse_expr,
};

/// Binds a canonical command to a statement.
pub fn parse_statement(command: &Command) -> Result<Statement, ParserError> {
    let tokens = &command.tokens;
    match tokens.first() {
        Some(Token::Keyword(Keyword::Select)) => parse_select(tokens).map(Statement::Select),
        Some(Token::Keyword(Keyword::Insert)) => parse_insert(tokens).map(Statement::Insert),
        Some(Token::Keyword(Keyword::Update)) => parse_update(tokens).map(Statement::Update),
        Some(Token::Keyword(Keyword::Delete)) => parse_delete(tokens).map(Statement::Delete),
        Some(other) => bind_error(format!("unable to recognize statement `{}`", other)),
        None => bind_error("empty command"),
    }
}

/// The clause keywords a `select` may carry, in any order of
/// appearance; each may appear at most once.
const SELECT_CLAUSES: &[Keyword] = &[
    Keyword::From,
    Keyword::Where,
    Keyword::GroupBy,
    Keyword::Having,
    Keyword::OrderBy,
    Keyword::Limit,
    Keyword::Offset,
    Keyword::Dest,
];

fn parse_select(tokens: &[Token]) -> Result<SelectStmt, ParserError> {
    // locate the clause keywords; they cannot occur inside expressions
    let mut positions: Vec<(usize, Keyword)> = Vec::new();
    for (idx, token) in tokens.iter().enumerate() {
        if let Token::Keyword(keyword) = token {
            if SELECT_CLAUSES.contains(keyword) {
                if positions.iter().any(|(_, seen)| seen == keyword) {
                    return bind_error(format!("duplicate `{}` clause", keyword));
                }
                positions.push((idx, *keyword));
            }
        }
    }

    let window = |start: usize| -> &[Token] {
        let end = positions
            .iter()
            .map(|&(idx, _)| idx)
            .filter(|&idx| idx > start)
            .min()
            .unwrap_or(tokens.len());
        &tokens[start + 1..end]
    };

    let projection_end = positions.first().map(|&(idx, _)| idx).unwrap_or(tokens.len());
    let projection = &tokens[1..projection_end];
    if projection.is_empty() {
        return bind_error("no item selected");
    }

    let mut stmt = SelectStmt {
        columns: split_commas(projection)
            .map(parse_expr)
            .collect::<Result<_, _>>()?,
        ..SelectStmt::default()
    };

    for &(idx, keyword) in &positions {
        let clause = window(idx);
        match keyword {
            Keyword::From => {
                stmt.table = Some(expect_name(clause, "from")?);
            }
            Keyword::Where => {
                if clause.is_empty() {
                    return bind_error("`where` clause is empty");
                }
                stmt.selection = Some(parse_expr(clause)?);
            }
            Keyword::GroupBy => {
                if clause.is_empty() {
                    return bind_error("`group by` clause is empty");
                }
                stmt.group_by = split_commas(clause)
                    .map(parse_expr)
                    .collect::<Result<_, _>>()?;
            }
            Keyword::Having => {
                if clause.is_empty() {
                    return bind_error("`having` clause is empty");
                }
                stmt.having = Some(parse_expr(clause)?);
            }
            Keyword::OrderBy => {
                if clause.is_empty() {
                    return bind_error("`order by` clause is empty");
                }
                stmt.order_by = split_commas(clause)
                    .map(parse_order_by)
                    .collect::<Result<_, _>>()?;
            }
            Keyword::Limit => {
                stmt.limit = Some(expect_count(clause, "limit")?);
            }
            Keyword::Offset => {
                stmt.offset = expect_count(clause, "offset")?;
            }
            Keyword::Dest => {
                if clause.is_empty() {
                    return bind_error("`dest` clause is empty");
                }
                stmt.destinations = clause
                    .iter()
                    .map(|token| match token {
                        Token::VariableRef(name) => Ok(Some(name.clone())),
                        Token::At => Ok(None),
                        other => bind_error(format!(
                            "`dest` takes variables, found `{}`",
                            other
                        )),
                    })
                    .collect::<Result<_, _>>()?;
            }
            _ => unreachable!("not a select clause keyword"),
        }
    }

    Ok(stmt)
}

fn parse_insert(tokens: &[Token]) -> Result<InsertStmt, ParserError> {
    expect_keyword(tokens, 1, Keyword::Into, "insert")?;
    let table = match tokens.get(2) {
        Some(Token::Ident(name)) => name.clone(),
        _ => return bind_error("expected a table name after `insert into`"),
    };
    expect_keyword(tokens, 3, Keyword::Values, "insert")?;

    let mut columns = Vec::new();
    let mut idx = 4;
    loop {
        match tokens.get(idx) {
            Some(Token::LeftBrace) => idx += 1,
            _ => return bind_error("expected `{` to open an insert tuple"),
        }
        let close = tokens[idx..]
            .iter()
            .position(|token| *token == Token::RightBrace)
            .map(|offset| idx + offset);
        let close = match close {
            Some(close) => close,
            None => return bind_error("unclosed `{` in an insert tuple"),
        };
        if close == idx {
            return bind_error("empty insert tuple");
        }
        for slice in split_commas(&tokens[idx..close]) {
            columns.push(parse_expr(slice)?);
        }
        idx = close + 1;

        match tokens.get(idx) {
            None => break,
            Some(Token::Comma) => idx += 1,
            Some(other) => {
                return bind_error(format!("expected `,` between insert tuples, found `{}`", other))
            }
        }
    }

    Ok(InsertStmt { table, columns })
}

fn parse_update(tokens: &[Token]) -> Result<UpdateStmt, ParserError> {
    let table = match tokens.get(1) {
        Some(Token::Ident(name)) => name.clone(),
        _ => return bind_error("expected a table name after `update`"),
    };
    expect_keyword(tokens, 2, Keyword::Set, "update")?;
    let column = match tokens.get(3) {
        Some(Token::ColumnRef(name)) => name.clone(),
        _ => return bind_error("expected a `#column` after `set`"),
    };
    if tokens.get(4) != Some(&Token::Equal) {
        return bind_error("expected `=` after the updated column");
    }

    let where_pos = tokens
        .iter()
        .position(|token| token.is_keyword(Keyword::Where));
    let value_end = where_pos.unwrap_or(tokens.len());
    if value_end <= 5 {
        return bind_error("`set` clause is empty");
    }
    let value = parse_expr(&tokens[5..value_end])?;

    let selection = match where_pos {
        Some(pos) => {
            if pos + 1 >= tokens.len() {
                return bind_error("`where` clause is empty");
            }
            Some(parse_expr(&tokens[pos + 1..])?)
        }
        None => None,
    };

    Ok(UpdateStmt {
        table,
        column,
        value,
        selection,
    })
}

fn parse_delete(tokens: &[Token]) -> Result<DeleteStmt, ParserError> {
    expect_keyword(tokens, 1, Keyword::From, "delete")?;
    let table = match tokens.get(2) {
        Some(Token::Ident(name)) => name.clone(),
        _ => return bind_error("expected a table name after `delete from`"),
    };

    let selection = match tokens.get(3) {
        None => None,
        Some(Token::Keyword(Keyword::Where)) => {
            if tokens.len() <= 4 {
                return bind_error("`where` clause is empty");
            }
            Some(parse_expr(&tokens[4..])?)
        }
        Some(other) => {
            return bind_error(format!("expected `where` after the table name, found `{}`", other))
        }
    };

    Ok(DeleteStmt { table, selection })
}

/// Splits a clause window on commas. Commas never occur inside a CQL
/// expression (function calls are unary), so a flat split is enough.
fn split_commas(tokens: &[Token]) -> impl Iterator<Item = &[Token]> {
    tokens.split(|token| *token == Token::Comma)
}

fn parse_order_by(tokens: &[Token]) -> Result<OrderByExpr, ParserError> {
    let (direction, expr_tokens) = match tokens.last() {
        Some(Token::Keyword(Keyword::Asc)) => (OrderDirection::Asc, &tokens[..tokens.len() - 1]),
        Some(Token::Keyword(Keyword::Desc)) => (OrderDirection::Desc, &tokens[..tokens.len() - 1]),
        _ => (OrderDirection::Asc, tokens),
    };
    Ok(OrderByExpr {
        expr: parse_expr(expr_tokens)?,
        direction,
    })
}

fn expect_keyword(
    tokens: &[Token],
    idx: usize,
    keyword: Keyword,
    statement: &str,
) -> Result<(), ParserError> {
    match tokens.get(idx) {
        Some(token) if token.is_keyword(keyword) => Ok(()),
        Some(other) => bind_error(format!(
            "invalid `{}` syntax: expected `{}`, found `{}`",
            statement, keyword, other
        )),
        None => bind_error(format!(
            "invalid `{}` syntax: expected `{}`",
            statement, keyword
        )),
    }
}

fn expect_name(tokens: &[Token], clause: &str) -> Result<String, ParserError> {
    match tokens {
        [Token::Ident(name)] => Ok(name.clone()),
        _ => bind_error(format!("expected a table name after `{}`", clause)),
    }
}

fn expect_count(tokens: &[Token], clause: &str) -> Result<usize, ParserError> {
    match tokens {
        [Token::Number(text)] => text
            .parse()
            .map_err(|_| ParserError::Bind(format!("`{}` takes a whole number", clause))),
        _ => bind_error(format!("`{}` takes a whole number", clause)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind(input: &str) -> Statement {
        let mut commands = cql_lexer::tokenize(input).unwrap();
        parse_statement(&commands.remove(0)).unwrap()
    }

    fn bind_err(input: &str) -> ParserError {
        let mut commands = cql_lexer::tokenize(input).unwrap();
        parse_statement(&commands.remove(0)).unwrap_err()
    }

    #[test]
    fn binds_a_full_select() {
        let stmt = match bind(
            "select #name, #age + 1 from people where #age > 26 \
             group by #dept having count(#name) > 1 \
             order by #age desc, #name limit 10 offset 2 dest @names @;",
        ) {
            Statement::Select(stmt) => stmt,
            other => panic!("expected a select, got {}", other),
        };
        assert_eq!(stmt.columns.len(), 2);
        assert_eq!(stmt.table.as_deref(), Some("people"));
        assert!(stmt.selection.is_some());
        assert_eq!(stmt.group_by.len(), 1);
        assert!(stmt.having.is_some());
        assert_eq!(stmt.order_by.len(), 2);
        assert_eq!(stmt.order_by[0].direction, OrderDirection::Desc);
        assert_eq!(stmt.order_by[1].direction, OrderDirection::Asc);
        assert_eq!(stmt.limit, Some(10));
        assert_eq!(stmt.offset, 2);
        assert_eq!(
            stmt.destinations,
            vec![Some("names".to_string()), None]
        );
    }

    #[test]
    fn binds_a_bare_select() {
        let stmt = match bind("select 2 + 3;") {
            Statement::Select(stmt) => stmt,
            other => panic!("expected a select, got {}", other),
        };
        assert_eq!(stmt.columns.len(), 1);
        assert!(stmt.table.is_none());
        assert!(stmt.selection.is_none());
        assert!(stmt.order_by.is_empty());
    }

    #[test]
    fn binds_insert_tuples_flat() {
        let stmt = match bind("insert into people values { 'carol', 40 }, { 'dan', 35 };") {
            Statement::Insert(stmt) => stmt,
            other => panic!("expected an insert, got {}", other),
        };
        assert_eq!(stmt.table, "people");
        assert_eq!(stmt.columns.len(), 4);
    }

    #[test]
    fn binds_update_and_delete() {
        let stmt = match bind("update people set #age = #age + 1 where #name = 'bob';") {
            Statement::Update(stmt) => stmt,
            other => panic!("expected an update, got {}", other),
        };
        assert_eq!(stmt.table, "people");
        assert_eq!(stmt.column, "age");
        assert!(stmt.selection.is_some());

        let stmt = match bind("delete from people;") {
            Statement::Delete(stmt) => stmt,
            other => panic!("expected a delete, got {}", other),
        };
        assert_eq!(stmt.table, "people");
        assert!(stmt.selection.is_none());
    }

    #[test]
    fn structural_errors() {
        assert!(matches!(bind_err("select from people;"), ParserError::Bind(_)));
        assert!(matches!(bind_err("insert people values { 1 };"), ParserError::Bind(_)));
        assert!(matches!(bind_err("insert into people { 1 };"), ParserError::Bind(_)));
        assert!(matches!(bind_err("update people #age = 1;"), ParserError::Bind(_)));
        assert!(matches!(bind_err("delete people;"), ParserError::Bind(_)));
        assert!(matches!(bind_err("select #a from people where;"), ParserError::Bind(_)));
        assert!(matches!(bind_err("select #a from people limit many;"), ParserError::Bind(_)));
        assert!(matches!(bind_err("drop table people;"), ParserError::Bind(_)));
        assert!(matches!(
            bind_err("select #a from people from people;"),
            ParserError::Bind(_)
        ));
    }

    #[test]
    fn select_statement_renders_back() {
        let stmt = bind("select #name from people where #age > 26 order by #age asc;");
        assert_eq!(
            stmt.to_string(),
            "select #name from people where (#age)>(26) order by #age asc"
        );
    }
}
