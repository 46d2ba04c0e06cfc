//! Expression evaluation.
//!
//! `evaluate` resolves a tree against an optional row (with its
//! schema), the variable store and a variable index. The `Invalid`
//! sentinel propagates through every operator; comparisons require
//! matching type tags; arithmetic is float-only except `+`, which also
//! concatenates strings.

use cql_ast::{BinaryOp, Expr, UnaryOp, Value};

use crate::{error::EvalError, row::Row, schema::Schema, vars::VariableStore};

/// Evaluates an expression tree to a value.
///
/// `row` is the current row and its schema, if the expression runs
/// under a scan; `idx` is the variable index, advanced by executors
/// that iterate variables.
pub fn evaluate(
    expr: &Expr,
    row: Option<(&Schema, &Row)>,
    vars: &VariableStore,
    idx: usize,
) -> Result<Value, EvalError> {
    match expr {
        Expr::Const(value) => Ok(value.clone()),

        Expr::Column(name) => {
            let (schema, row) = row.ok_or_else(|| EvalError::NoRow(name.clone()))?;
            let col = schema
                .index_of(name)
                .ok_or_else(|| EvalError::UnknownColumn(name.clone()))?;
            Ok(row.get(col).cloned().unwrap_or(Value::Invalid))
        }

        Expr::Variable(name) => vars.fetch(name, idx),

        Expr::Unary { op, child } => {
            let operand = evaluate(child, row, vars, idx)?;
            eval_unary(*op, operand)
        }

        Expr::Binary { op: BinaryOp::In, lhs, rhs } => {
            // `in` reads its right-hand variable as a whole set
            let name = match rhs.as_ref() {
                Expr::Variable(name) => name,
                _ => return Err(EvalError::InOperand),
            };
            let needle = evaluate(lhs, row, vars, idx)?;
            if needle.is_invalid() {
                return Ok(Value::Invalid);
            }
            let values = vars
                .get(name)
                .ok_or_else(|| EvalError::UnknownVariable(name.clone()))?;
            Ok(Value::Bool(values.iter().any(|v| v.same_as(&needle))))
        }

        Expr::Binary { op, lhs, rhs } => {
            let lhs = evaluate(lhs, row, vars, idx)?;
            let rhs = evaluate(rhs, row, vars, idx)?;
            eval_binary(*op, lhs, rhs)
        }

        // past the aggregation layer an aggregate is a plain column
        // lookup under its own label
        Expr::Aggregate { .. } => {
            let label = expr.label();
            let (schema, row) = row.ok_or_else(|| EvalError::NoRow(label.clone()))?;
            let col = schema
                .index_of(&label)
                .ok_or(EvalError::UnknownColumn(label))?;
            Ok(row.get(col).cloned().unwrap_or(Value::Invalid))
        }
    }
}

/// Evaluates a predicate expression to a boolean.
///
/// `Invalid` counts as false (a comparison against an absent value
/// holds for no row); any other non-boolean result is an error.
pub fn eval_predicate(
    expr: &Expr,
    row: Option<(&Schema, &Row)>,
    vars: &VariableStore,
    idx: usize,
) -> Result<bool, EvalError> {
    match evaluate(expr, row, vars, idx)? {
        Value::Bool(b) => Ok(b),
        Value::Invalid => Ok(false),
        other => Err(EvalError::NonBoolPredicate(other.data_type())),
    }
}

fn eval_unary(op: UnaryOp, operand: Value) -> Result<Value, EvalError> {
    if operand.is_invalid() {
        return Ok(Value::Invalid);
    }

    match op {
        UnaryOp::ToStr => return Ok(operand.to_str()),
        UnaryOp::ToFloat => return Ok(operand.to_float()),
        UnaryOp::ToBool => return Ok(operand.to_bool()),
        UnaryOp::Not => {
            return match operand {
                Value::Bool(b) => Ok(Value::Bool(!b)),
                other => Err(EvalError::UnaryType {
                    op: op.as_str(),
                    operand: other.data_type(),
                }),
            };
        }
        _ => {}
    }

    // the arithmetic group applies to floats only
    let v = match operand {
        Value::Float(v) => v,
        other => {
            return Err(EvalError::UnaryType {
                op: op.as_str(),
                operand: other.data_type(),
            });
        }
    };
    let result = match op {
        UnaryOp::Neg => -v,
        UnaryOp::Sgn => {
            if v == 0.0 {
                0.0
            } else if v > 0.0 {
                1.0
            } else {
                -1.0
            }
        }
        UnaryOp::Abs => v.abs(),
        UnaryOp::Sqrt => v.powf(0.5),
        UnaryOp::Sqr => v * v,
        UnaryOp::Ln => v.ln(),
        UnaryOp::Exp => v.exp(),
        UnaryOp::Sin => v.sin(),
        UnaryOp::Cos => v.cos(),
        UnaryOp::Tan => v.tan(),
        UnaryOp::Asin => v.asin(),
        UnaryOp::Acos => v.acos(),
        UnaryOp::Atan => v.atan(),
        UnaryOp::Not | UnaryOp::ToStr | UnaryOp::ToFloat | UnaryOp::ToBool => unreachable!(),
    };
    Ok(Value::Float(result))
}

fn eval_binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    if lhs.is_invalid() || rhs.is_invalid() {
        return Ok(Value::Invalid);
    }

    let type_error = |lhs: &Value, rhs: &Value| EvalError::BinaryType {
        op: op.as_str(),
        lhs: lhs.data_type(),
        rhs: rhs.data_type(),
    };

    match op {
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq | BinaryOp::Eq
        | BinaryOp::NotEq => {
            let result = match (&lhs, &rhs) {
                (Value::Float(a), Value::Float(b)) => compare(op, a, b),
                (Value::Char(a), Value::Char(b)) => compare(op, a, b),
                (Value::Bool(a), Value::Bool(b)) => compare(op, a, b),
                _ => return Err(type_error(&lhs, &rhs)),
            };
            Ok(Value::Bool(result))
        }

        BinaryOp::And | BinaryOp::Or | BinaryOp::Xor => match (&lhs, &rhs) {
            (Value::Bool(a), Value::Bool(b)) => {
                let result = match op {
                    BinaryOp::And => *a && *b,
                    BinaryOp::Or => *a || *b,
                    BinaryOp::Xor => *a != *b,
                    _ => unreachable!(),
                };
                Ok(Value::Bool(result))
            }
            _ => Err(type_error(&lhs, &rhs)),
        },

        BinaryOp::Add => match (&lhs, &rhs) {
            (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a + b)),
            (Value::Char(a), Value::Char(b)) => {
                let mut joined = String::with_capacity(a.len() + b.len());
                joined.push_str(a);
                joined.push_str(b);
                Ok(Value::Char(joined))
            }
            _ => Err(type_error(&lhs, &rhs)),
        },

        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod | BinaryOp::Pow => {
            let (a, b) = match (&lhs, &rhs) {
                (Value::Float(a), Value::Float(b)) => (*a, *b),
                _ => return Err(type_error(&lhs, &rhs)),
            };
            let result = match op {
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                // division by zero inherits IEEE semantics
                BinaryOp::Div => a / b,
                BinaryOp::Mod => {
                    // truncates toward zero on 64-bit integer cast
                    let (a, b) = (a as i64, b as i64);
                    if b == 0 {
                        f64::NAN
                    } else {
                        (a % b) as f64
                    }
                }
                BinaryOp::Pow => a.powf(b),
                _ => unreachable!(),
            };
            Ok(Value::Float(result))
        }

        BinaryOp::In => unreachable!("`in` is handled before operand evaluation"),
    }
}

fn compare<T: PartialOrd>(op: BinaryOp, a: &T, b: &T) -> bool {
    match op {
        BinaryOp::Lt => a < b,
        BinaryOp::LtEq => a <= b,
        BinaryOp::Gt => a > b,
        BinaryOp::GtEq => a >= b,
        BinaryOp::Eq => a == b,
        BinaryOp::NotEq => a != b,
        _ => unreachable!(),
    }
}
