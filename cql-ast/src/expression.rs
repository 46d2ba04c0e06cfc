use core::fmt;
use std::rc::Rc;

use crate::value::Value;

/// A shared, immutable expression node.
///
/// Nodes are reference-counted so a tree can be shared between a bound
/// statement and the rewritten trees the aggregation layer produces;
/// trees are acyclic and evaluation is read-only.
pub type ExprRef = Rc<Expr>;

/// An expression tree node.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// A constant value.
    Const(Value),
    /// A column reference, resolved per row by schema name lookup.
    /// The name is stored without the `#` sigil.
    Column(String),
    /// A variable reference, resolved from the variable store at an
    /// index. The name is stored without the `@` sigil.
    Variable(String),
    /// A unary operator or function application.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        child: ExprRef,
    },
    /// A binary operator application.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// The left operand.
        lhs: ExprRef,
        /// The right operand.
        rhs: ExprRef,
    },
    /// An aggregate function application. Opaque to general evaluation:
    /// downstream of the aggregation layer it reads as a column whose
    /// name is the node's textual form.
    Aggregate {
        /// The aggregate function.
        op: AggOp,
        /// The aggregated expression.
        child: ExprRef,
    },
}

impl Expr {
    /// Wraps the node in a shared reference.
    pub fn into_ref(self) -> ExprRef {
        Rc::new(self)
    }

    /// The textual form of the expression.
    ///
    /// This is the aggregate label and the synthetic projection column
    /// name, so it must be stable; it is simply the `Display` rendering.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

/// Unary operators and functions. All of them except `not` and the
/// casts require a float operand.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[allow(missing_docs)]
pub enum UnaryOp {
    /// Negation, written `~x`.
    Neg,
    /// Logical not; requires a boolean.
    Not,
    Sgn,
    Abs,
    Sqrt,
    Sqr,
    Ln,
    Exp,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    /// Cast to string.
    ToStr,
    /// Cast to float.
    ToFloat,
    /// Cast to boolean.
    ToBool,
}

impl UnaryOp {
    /// The source-level spelling of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "~",
            UnaryOp::Not => "not",
            UnaryOp::Sgn => "sgn",
            UnaryOp::Abs => "abs",
            UnaryOp::Sqrt => "sqrt",
            UnaryOp::Sqr => "sqr",
            UnaryOp::Ln => "ln",
            UnaryOp::Exp => "exp",
            UnaryOp::Sin => "sin",
            UnaryOp::Cos => "cos",
            UnaryOp::Tan => "tan",
            UnaryOp::Asin => "asin",
            UnaryOp::Acos => "acos",
            UnaryOp::Atan => "atan",
            UnaryOp::ToStr => "tostr",
            UnaryOp::ToFloat => "tofloat",
            UnaryOp::ToBool => "tobool",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binary operators.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[allow(missing_docs)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    /// Remainder; truncates both operands to 64-bit integers.
    Mod,
    Pow,
    And,
    Or,
    Xor,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Eq,
    NotEq,
    /// Membership in a variable's value sequence.
    In,
}

impl BinaryOp {
    /// The source-level spelling of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "^",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Xor => "xor",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "!=",
            BinaryOp::In => "in",
        }
    }

    /// True for the word-shaped operators, which render with spaces.
    fn is_word(&self) -> bool {
        matches!(
            self,
            BinaryOp::And | BinaryOp::Or | BinaryOp::Xor | BinaryOp::In
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate functions.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AggOp {
    /// Last value wins; the "default" reducer.
    Agg,
    /// Count of non-Invalid inputs.
    Count,
    /// Maximum under the value ordering.
    Max,
    /// Minimum under the value ordering.
    Min,
    /// Sum: float addition, boolean or, string concatenation by tag.
    Sum,
}

impl AggOp {
    /// The source-level spelling of the function.
    pub fn as_str(&self) -> &'static str {
        match self {
            AggOp::Agg => "agg",
            AggOp::Count => "count",
            AggOp::Max => "max",
            AggOp::Min => "min",
            AggOp::Sum => "sum",
        }
    }
}

impl fmt::Display for AggOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(value) => write!(f, "{}", value),
            Expr::Column(name) => write!(f, "#{}", name),
            Expr::Variable(name) => write!(f, "@{}", name),
            Expr::Unary { op, child } => write!(f, "{}({})", op, child),
            Expr::Binary { op, lhs, rhs } => {
                if op.is_word() {
                    write!(f, "({}) {} ({})", lhs, op, rhs)
                } else {
                    write!(f, "({}){}({})", lhs, op, rhs)
                }
            }
            Expr::Aggregate { op, child } => write!(f, "{}({})", op, child),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn textual_forms() {
        let count = Expr::Aggregate {
            op: AggOp::Count,
            child: Expr::Column("name".into()).into_ref(),
        };
        assert_eq!(count.label(), "count(#name)");

        let cmp = Expr::Binary {
            op: BinaryOp::Gt,
            lhs: Expr::Column("name".into()).into_ref(),
            rhs: Expr::Const(Value::Char("b".into())).into_ref(),
        };
        assert_eq!(cmp.to_string(), "(#name)>(b)");

        let neg = Expr::Unary {
            op: UnaryOp::Neg,
            child: Expr::Const(Value::Float(2.0)).into_ref(),
        };
        assert_eq!(neg.to_string(), "~(2)");

        let member = Expr::Binary {
            op: BinaryOp::In,
            lhs: Expr::Column("age".into()).into_ref(),
            rhs: Expr::Variable("ages".into()).into_ref(),
        };
        assert_eq!(member.to_string(), "(#age) in (@ages)");
    }
}
