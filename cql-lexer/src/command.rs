use core::fmt;

use cql_core::{Keyword, Token};

use crate::error::LexError;

/// A single CQL command: the tokens between two `;` separators.
///
/// The `;` itself is not stored.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Command {
    /// The tokens of the command, in input order.
    pub tokens: Vec<Token>,
}

impl Command {
    /// Returns true if the command holds no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for token in &self.tokens {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{}", token)?;
            first = false;
        }
        Ok(())
    }
}

/// Deep partition (pass 2): fuses multi-token lexemes into single
/// canonical tokens.
///
/// The fusion rules are:
///   - `order` `by` and `group` `by` become one keyword; a bare `order`
///     or `group` is an error, both are reserved.
///   - `<` `=`, `>` `=` and `!` `=` become the two-character operators.
///   - `#` *ident* becomes a column reference; a dangling `#` is an
///     error.
///   - `@` *ident* becomes a variable reference; a bare `@` is kept as
///     is, it names the discard slot of a `dest` clause.
///   - `'` *body* `'` becomes a single string literal token.
///
/// Applying deep partition to an already canonical command is a no-op.
pub fn deep_partition(command: Command) -> Result<Command, LexError> {
    let tokens = command.tokens;
    let mut fused = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter().peekable();

    while let Some(token) = iter.next() {
        match token {
            Token::Keyword(Keyword::Order) => {
                if iter.next_if_eq(&Token::Keyword(Keyword::By)).is_some() {
                    fused.push(Token::Keyword(Keyword::OrderBy));
                } else {
                    return Err(LexError::fusion(
                        "`order` is a reserved keyword and must be followed by `by`",
                    ));
                }
            }
            Token::Keyword(Keyword::Group) => {
                if iter.next_if_eq(&Token::Keyword(Keyword::By)).is_some() {
                    fused.push(Token::Keyword(Keyword::GroupBy));
                } else {
                    return Err(LexError::fusion(
                        "`group` is a reserved keyword and must be followed by `by`",
                    ));
                }
            }
            Token::LessThan => {
                if iter.next_if_eq(&Token::Equal).is_some() {
                    fused.push(Token::LessThanOrEqual);
                } else {
                    fused.push(Token::LessThan);
                }
            }
            Token::GreaterThan => {
                if iter.next_if_eq(&Token::Equal).is_some() {
                    fused.push(Token::GreaterThanOrEqual);
                } else {
                    fused.push(Token::GreaterThan);
                }
            }
            Token::Exclamation => {
                if iter.next_if_eq(&Token::Equal).is_some() {
                    fused.push(Token::NotEqual);
                } else {
                    fused.push(Token::Exclamation);
                }
            }
            Token::Sharp => match iter.peek().and_then(Token::ident_text) {
                Some(name) => {
                    let name = name.to_string();
                    iter.next();
                    fused.push(Token::ColumnRef(name));
                }
                None => {
                    return Err(LexError::fusion("dangling `#` without a column name"));
                }
            },
            Token::At => match iter.peek().and_then(Token::ident_text) {
                Some(name) => {
                    let name = name.to_string();
                    iter.next();
                    fused.push(Token::VariableRef(name));
                }
                // a bare `@` is the discard destination
                None => fused.push(Token::At),
            },
            Token::Quote => {
                let body = match iter.next() {
                    Some(Token::Text(body)) => body,
                    _ => return Err(LexError::fusion("unmatched quote in string literal")),
                };
                match iter.next() {
                    Some(Token::Quote) => fused.push(Token::StringLit(body)),
                    _ => return Err(LexError::fusion("unmatched quote in string literal")),
                }
            }
            other => fused.push(other),
        }
    }

    Ok(Command { tokens: fused })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize;

    fn canonical(input: &str) -> Vec<Command> {
        tokenize(input).unwrap()
    }

    #[test]
    fn fuses_clause_keywords() {
        let cmds = canonical("select #a from t order by #a group by #b;");
        assert!(cmds[0].tokens.contains(&Token::Keyword(Keyword::OrderBy)));
        assert!(cmds[0].tokens.contains(&Token::Keyword(Keyword::GroupBy)));
    }

    #[test]
    fn bare_order_is_an_error() {
        assert!(matches!(
            tokenize("select #a order #b;"),
            Err(LexError::Fusion(_))
        ));
        assert!(matches!(tokenize("group;"), Err(LexError::Fusion(_))));
    }

    #[test]
    fn fuses_comparison_operators() {
        let cmds = canonical("1 <= 2 >= 3 != 4 < 5;");
        assert_eq!(
            cmds[0].tokens,
            vec![
                Token::Number("1".into()),
                Token::LessThanOrEqual,
                Token::Number("2".into()),
                Token::GreaterThanOrEqual,
                Token::Number("3".into()),
                Token::NotEqual,
                Token::Number("4".into()),
                Token::LessThan,
                Token::Number("5".into()),
            ]
        );
    }

    #[test]
    fn fuses_references_and_literals() {
        let cmds = canonical("select #name, @x, 'it''s split';");
        let tokens = &cmds[0].tokens;
        assert!(tokens.contains(&Token::ColumnRef("name".into())));
        assert!(tokens.contains(&Token::VariableRef("x".into())));
        // two adjacent literals, not one escaped quote
        assert!(tokens.contains(&Token::StringLit("it".into())));
        assert!(tokens.contains(&Token::StringLit("s split".into())));
    }

    #[test]
    fn column_named_like_a_keyword() {
        let cmds = canonical("select #min from t;");
        assert!(cmds[0].tokens.contains(&Token::ColumnRef("min".into())));
    }

    #[test]
    fn dangling_sharp_is_an_error() {
        assert!(matches!(tokenize("select # ;"), Err(LexError::Fusion(_))));
    }

    #[test]
    fn bare_at_survives_for_dest() {
        let cmds = canonical("select #a from t dest @ @v;");
        let tokens = &cmds[0].tokens;
        assert!(tokens.contains(&Token::At));
        assert!(tokens.contains(&Token::VariableRef("v".into())));
    }

    #[test]
    fn empty_commands_are_dropped() {
        assert!(tokenize(";;;").unwrap().is_empty());
        assert_eq!(tokenize("1;;2;").unwrap().len(), 2);
    }

    #[test]
    fn comments_produce_no_tokens() {
        assert!(tokenize("-- select 1;\n").unwrap().is_empty());
        let cmds = canonical("select 1; -- trailing note");
        assert_eq!(cmds.len(), 1);
    }

    #[test]
    fn deep_partition_is_idempotent() {
        let cmds = canonical("select count(#name) from people where #age >= 21 order by #age;");
        for cmd in cmds {
            let again = deep_partition(cmd.clone()).unwrap();
            assert_eq!(again, cmd);
        }
    }

    #[test]
    fn canonical_stream_round_trips() {
        let inputs = [
            "select #name, @x * 2 from people where #age >= 21 order by #age desc;",
            "insert into t values { 'a, b', 1.5 }, { 'c', ~2 };",
            "select count(#name) from people group by #name > 'b' having count(#name) != 1;",
        ];
        for input in inputs {
            let cmds = canonical(input);
            let rendered = cmds
                .iter()
                .map(|c| format!("{};", c))
                .collect::<Vec<_>>()
                .join(" ");
            assert_eq!(canonical(&rendered), cmds);
        }
    }
}
