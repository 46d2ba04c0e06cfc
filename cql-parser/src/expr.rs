//! Infix-to-tree expression compilation.
//!
//! The conversion runs on two priority tables keyed by operator:
//! the in-stack priority (ISP) of an operator already on the stack, and
//! the in-coming priority (ICP) of the operator under consideration.
//! A higher ICP pushes, a lower ICP pops the stack top to the output
//! and reconsiders, equality pops silently (the only equal pair is a
//! `(` meeting its `)`). The output is the expression in post-order; a
//! second pass folds it into a tree with an operand stack.

use cql_ast::{AggOp, BinaryOp, Expr, ExprRef, UnaryOp, Value};
use cql_core::{Keyword, Token};

use crate::error::{parse_error, ParserError};

/// An operator as it lives on the conversion stack or in the post-order
/// output.
#[derive(Copy, Clone, Debug, PartialEq)]
enum Op {
    LParen,
    Unary(UnaryOp),
    Binary(BinaryOp),
    Aggregate(AggOp),
}

impl Op {
    /// In-stack priority.
    fn isp(&self) -> u8 {
        match self {
            Op::LParen => 1,
            Op::Unary(UnaryOp::Neg) => 15,
            Op::Unary(UnaryOp::Not) => 7,
            Op::Unary(_) => 17,
            Op::Aggregate(_) => 17,
            Op::Binary(op) => match op {
                BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod | BinaryOp::Pow => 13,
                BinaryOp::Add | BinaryOp::Sub => 11,
                BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
                | BinaryOp::Eq
                | BinaryOp::NotEq => 9,
                BinaryOp::In => 5,
                BinaryOp::And | BinaryOp::Or | BinaryOp::Xor => 3,
            },
        }
    }

    /// In-coming priority; one below the in-stack priority, which makes
    /// every operator class left-associative and prefix functions bind
    /// through their parentheses.
    fn icp(&self) -> u8 {
        match self {
            Op::LParen => 20,
            other => other.isp() - 1,
        }
    }
}

/// What a single canonical token means to the converter.
enum Item {
    Operand(ExprRef),
    Op(Op),
    RParen,
}

fn classify(token: &Token) -> Result<Item, ParserError> {
    let item = match token {
        Token::Number(text) => match text.parse::<f64>() {
            Ok(value) => Item::Operand(Expr::Const(Value::Float(value)).into_ref()),
            Err(_) => {
                return parse_error(format!("unable to recognize number `{}`", text));
            }
        },
        Token::StringLit(text) => Item::Operand(Expr::Const(Value::Char(text.clone())).into_ref()),
        Token::ColumnRef(name) => Item::Operand(Expr::Column(name.clone()).into_ref()),
        Token::VariableRef(name) => Item::Operand(Expr::Variable(name.clone()).into_ref()),

        Token::LeftParen => Item::Op(Op::LParen),
        Token::RightParen => Item::RParen,

        Token::Plus => Item::Op(Op::Binary(BinaryOp::Add)),
        Token::Minus => Item::Op(Op::Binary(BinaryOp::Sub)),
        Token::Asterisk => Item::Op(Op::Binary(BinaryOp::Mul)),
        Token::Slash => Item::Op(Op::Binary(BinaryOp::Div)),
        Token::Percent => Item::Op(Op::Binary(BinaryOp::Mod)),
        Token::Caret => Item::Op(Op::Binary(BinaryOp::Pow)),
        Token::Tilde => Item::Op(Op::Unary(UnaryOp::Neg)),
        Token::Equal => Item::Op(Op::Binary(BinaryOp::Eq)),
        Token::NotEqual => Item::Op(Op::Binary(BinaryOp::NotEq)),
        Token::LessThan => Item::Op(Op::Binary(BinaryOp::Lt)),
        Token::LessThanOrEqual => Item::Op(Op::Binary(BinaryOp::LtEq)),
        Token::GreaterThan => Item::Op(Op::Binary(BinaryOp::Gt)),
        Token::GreaterThanOrEqual => Item::Op(Op::Binary(BinaryOp::GtEq)),

        Token::Keyword(keyword) => match keyword {
            Keyword::True => Item::Operand(Expr::Const(Value::Bool(true)).into_ref()),
            Keyword::False => Item::Operand(Expr::Const(Value::Bool(false)).into_ref()),
            Keyword::Not => Item::Op(Op::Unary(UnaryOp::Not)),
            Keyword::And => Item::Op(Op::Binary(BinaryOp::And)),
            Keyword::Or => Item::Op(Op::Binary(BinaryOp::Or)),
            Keyword::Xor => Item::Op(Op::Binary(BinaryOp::Xor)),
            Keyword::In => Item::Op(Op::Binary(BinaryOp::In)),
            Keyword::Sin => Item::Op(Op::Unary(UnaryOp::Sin)),
            Keyword::Cos => Item::Op(Op::Unary(UnaryOp::Cos)),
            Keyword::Tan => Item::Op(Op::Unary(UnaryOp::Tan)),
            Keyword::Asin => Item::Op(Op::Unary(UnaryOp::Asin)),
            Keyword::Acos => Item::Op(Op::Unary(UnaryOp::Acos)),
            Keyword::Atan => Item::Op(Op::Unary(UnaryOp::Atan)),
            Keyword::Exp => Item::Op(Op::Unary(UnaryOp::Exp)),
            Keyword::Ln => Item::Op(Op::Unary(UnaryOp::Ln)),
            Keyword::Sqrt => Item::Op(Op::Unary(UnaryOp::Sqrt)),
            Keyword::Sqr => Item::Op(Op::Unary(UnaryOp::Sqr)),
            Keyword::Sgn => Item::Op(Op::Unary(UnaryOp::Sgn)),
            Keyword::Abs => Item::Op(Op::Unary(UnaryOp::Abs)),
            Keyword::ToStr => Item::Op(Op::Unary(UnaryOp::ToStr)),
            Keyword::ToFloat => Item::Op(Op::Unary(UnaryOp::ToFloat)),
            Keyword::ToBool => Item::Op(Op::Unary(UnaryOp::ToBool)),
            Keyword::Agg => Item::Op(Op::Aggregate(AggOp::Agg)),
            Keyword::Count => Item::Op(Op::Aggregate(AggOp::Count)),
            Keyword::Max => Item::Op(Op::Aggregate(AggOp::Max)),
            Keyword::Min => Item::Op(Op::Aggregate(AggOp::Min)),
            Keyword::Sum => Item::Op(Op::Aggregate(AggOp::Sum)),
            other => {
                return parse_error(format!(
                    "unable to recognize `{}` in an expression",
                    other
                ));
            }
        },
        other => {
            return parse_error(format!("unable to recognize `{}` in an expression", other));
        }
    };
    Ok(item)
}

/// One element of the post-order stream.
enum PostItem {
    Operand(ExprRef),
    Op(Op),
}

/// Converts an infix token window into post-order.
fn to_post_order(tokens: &[Token]) -> Result<Vec<PostItem>, ParserError> {
    let mut output: Vec<PostItem> = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Op> = Vec::new();

    for token in tokens {
        // `None` stands for the incoming `)`, which is never pushed.
        let (incoming, incoming_icp) = match classify(token)? {
            Item::Operand(operand) => {
                output.push(PostItem::Operand(operand));
                continue;
            }
            Item::Op(op) => (Some(op), op.icp()),
            Item::RParen => (None, 1),
        };

        loop {
            let top = match stack.last() {
                Some(top) => *top,
                None => match incoming {
                    Some(op) => {
                        stack.push(op);
                        break;
                    }
                    None => return parse_error("unbalanced `)` in expression"),
                },
            };

            if incoming_icp > top.isp() {
                // only a pushable operator can outrank the stack top
                stack.push(incoming.expect("`)` has the lowest in-coming priority"));
                break;
            } else if incoming_icp < top.isp() {
                // pop to output and reconsider the incoming token
                stack.pop();
                if top != Op::LParen {
                    output.push(PostItem::Op(top));
                }
            } else {
                // equal priorities: the stack `(` meets the incoming `)`
                stack.pop();
                break;
            }
        }
    }

    while let Some(top) = stack.pop() {
        if top == Op::LParen {
            return parse_error("unbalanced `(` in expression");
        }
        output.push(PostItem::Op(top));
    }
    Ok(output)
}

/// Compiles an infix token window into an expression tree.
pub fn parse_expr(tokens: &[Token]) -> Result<ExprRef, ParserError> {
    if tokens.is_empty() {
        return parse_error("empty expression");
    }

    let mut operands: Vec<ExprRef> = Vec::new();
    for item in to_post_order(tokens)? {
        match item {
            PostItem::Operand(operand) => operands.push(operand),
            PostItem::Op(Op::Unary(op)) => {
                let child = match operands.pop() {
                    Some(child) => child,
                    None => return parse_error(format!("`{}` is missing its operand", op)),
                };
                operands.push(Expr::Unary { op, child }.into_ref());
            }
            PostItem::Op(Op::Aggregate(op)) => {
                let child = match operands.pop() {
                    Some(child) => child,
                    None => return parse_error(format!("`{}` is missing its operand", op)),
                };
                operands.push(Expr::Aggregate { op, child }.into_ref());
            }
            PostItem::Op(Op::Binary(op)) => {
                let rhs = operands.pop();
                let lhs = operands.pop();
                match (lhs, rhs) {
                    (Some(lhs), Some(rhs)) => {
                        operands.push(Expr::Binary { op, lhs, rhs }.into_ref());
                    }
                    _ => {
                        return parse_error(format!(
                            "`{}` is missing one or both operands",
                            op
                        ));
                    }
                }
            }
            PostItem::Op(Op::LParen) => unreachable!("parentheses never reach the output"),
        }
    }

    match (operands.pop(), operands.is_empty()) {
        (Some(root), true) => Ok(root),
        (Some(_), false) => parse_error("expression has dangling operands"),
        (None, _) => parse_error("empty expression"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(input: &str) -> ExprRef {
        let mut commands = cql_lexer::tokenize(&format!("{};", input)).unwrap();
        parse_expr(&commands.remove(0).tokens).unwrap()
    }

    fn expr_err(input: &str) -> ParserError {
        let mut commands = cql_lexer::tokenize(&format!("{};", input)).unwrap();
        parse_expr(&commands.remove(0).tokens).unwrap_err()
    }

    #[test]
    fn precedence_shapes_the_tree() {
        // 1 + 2 * 3  =>  (1)+((2)*(3))
        assert_eq!(expr("1 + 2 * 3").to_string(), "(1)+((2)*(3))");
        // (1 + 2) * 3
        assert_eq!(expr("(1 + 2) * 3").to_string(), "((1)+(2))*(3)");
        // comparisons bind looser than arithmetic
        assert_eq!(expr("1 + 1 < 3").to_string(), "((1)+(1))<(3)");
        // logic binds loosest
        assert_eq!(
            expr("1 < 2 and 2 < 3").to_string(),
            "((1)<(2)) and ((2)<(3))"
        );
        // same class associates left
        assert_eq!(expr("1 - 2 - 3").to_string(), "((1)-(2))-(3)");
    }

    #[test]
    fn functions_bind_tightest() {
        assert_eq!(expr("2 + 3 * exp(1)").to_string(), "(2)+((3)*(exp(1)))");
        assert_eq!(expr("sin(cos(0.5))").to_string(), "sin(cos(0.5))");
        assert_eq!(expr("~2 ^ 2").to_string(), "(~(2))^(2)");
        assert_eq!(expr("2 ^ ~2").to_string(), "(2)^(~(2))");
    }

    #[test]
    fn not_and_in_rank_between_compare_and_logic() {
        assert_eq!(
            expr("not #a = 1 and #b = 2").to_string(),
            "(not((#a)=(1))) and ((#b)=(2))"
        );
        assert_eq!(
            expr("#a in @v or #b in @w").to_string(),
            "((#a) in (@v)) or ((#b) in (@w))"
        );
    }

    #[test]
    fn aggregates_parse_like_functions() {
        assert_eq!(expr("count(#name)").to_string(), "count(#name)");
        assert_eq!(
            expr("max(#age) - min(#age)").to_string(),
            "(max(#age))-(min(#age))"
        );
    }

    #[test]
    fn operand_errors() {
        assert!(matches!(expr_err("1 +"), ParserError::Parse(_)));
        assert!(matches!(expr_err("sin()"), ParserError::Parse(_)));
        assert!(matches!(expr_err("1 2"), ParserError::Parse(_)));
        assert!(matches!(expr_err("(1 + 2"), ParserError::Parse(_)));
        assert!(matches!(expr_err("1 + 2)"), ParserError::Parse(_)));
        assert!(matches!(expr_err("from"), ParserError::Parse(_)));
    }

    #[test]
    fn literals_and_references() {
        assert_eq!(expr("'a' + 'b'").to_string(), "(a)+(b)");
        assert_eq!(expr("true and false").to_string(), "(True) and (False)");
        assert_eq!(expr("@x * @x").to_string(), "(@x)*(@x)");
    }
}
