//! Value expression trees.
//!
//! A [`ValueExpr`] describes the new value of one column. Trees are built
//! with [`col`], [`captured`] and [`lit`] and combined with the usual
//! arithmetic operators:
//!
//! ```rust
//! use oxide_bulk_core::expr::{col, captured};
//!
//! let bumped = col("Count") + 1;
//! let scaled = col("Price") * captured("factor", 1.1);
//! ```

use core::ops::{Add, Div, Mul, Rem, Sub};

use serde::{Deserialize, Serialize};

use crate::value::{SqlValue, ToSqlValue};

/// Binary operators that can appear in an expression tree.
///
/// Only arithmetic and equality render; the rest exist so that callers can
/// describe them and get a typed rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    And,
    Or,

    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    LeftShift,
    RightShift,
}

impl BinaryOp {
    /// Returns the SQL spelling of the operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "AND",
            Self::Or => "OR",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::LeftShift => "<<",
            Self::RightShift => ">>",
        }
    }

    /// Returns the precedence of the operator (higher = binds tighter).
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq => 3,
            Self::BitOr | Self::BitXor => 5,
            Self::BitAnd => 6,
            Self::LeftShift | Self::RightShift => 7,
            Self::Add | Self::Sub => 8,
            Self::Mul | Self::Div | Self::Mod => 9,
        }
    }

    /// Returns whether the renderer accepts this operator.
    #[must_use]
    pub const fn is_supported(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Mod
        )
    }

    /// Returns whether `a op (b op c)` differs from `(a op b) op c`.
    pub(crate) const fn is_non_associative(self) -> bool {
        matches!(self, Self::Sub | Self::Div | Self::Mod | Self::Eq)
    }
}

/// What a member access refers to.
///
/// The builder decides this when the tree is constructed: a member either
/// names a column of the row being updated, or a value captured from the
/// caller's scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberBinding {
    /// The column's current value in the row.
    Column,
    /// A value captured outside the row.
    Captured(SqlValue),
}

/// A node of a value expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueExpr {
    /// `left op right`.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<ValueExpr>,
        /// Right operand.
        right: Box<ValueExpr>,
    },

    /// A named member access.
    Member {
        /// Member (column or variable) name.
        name: String,
        /// What the member resolves to.
        binding: MemberBinding,
    },

    /// A constant value.
    Constant(SqlValue),

    /// A conversion wrapper around its operand.
    Unary(Box<ValueExpr>),
}

/// References the current value of a column.
#[must_use]
pub fn col(name: &str) -> ValueExpr {
    ValueExpr::Member {
        name: String::from(name),
        binding: MemberBinding::Column,
    }
}

/// References a value captured from the caller's scope.
#[must_use]
pub fn captured<T: ToSqlValue>(name: &str, value: T) -> ValueExpr {
    ValueExpr::Member {
        name: String::from(name),
        binding: MemberBinding::Captured(value.to_sql_value()),
    }
}

/// A constant value.
#[must_use]
pub fn lit<T: ToSqlValue>(value: T) -> ValueExpr {
    ValueExpr::Constant(value.to_sql_value())
}

impl ValueExpr {
    /// Creates a binary node.
    #[must_use]
    pub fn binary(op: BinaryOp, left: impl Into<Self>, right: impl Into<Self>) -> Self {
        Self::Binary {
            op,
            left: Box::new(left.into()),
            right: Box::new(right.into()),
        }
    }

    /// Wraps the node in a pass-through conversion.
    #[must_use]
    pub fn unary(operand: impl Into<Self>) -> Self {
        Self::Unary(Box::new(operand.into()))
    }

    /// Creates an equality node.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn eq(self, other: impl Into<Self>) -> Self {
        Self::binary(BinaryOp::Eq, self, other)
    }

    /// Strips any pass-through conversions.
    #[must_use]
    pub fn unwrap_unary(&self) -> &Self {
        let mut node = self;
        while let Self::Unary(inner) = node {
            node = inner;
        }
        node
    }
}

macro_rules! value_expr_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ValueExpr {
                fn from(value: $ty) -> Self {
                    Self::Constant(value.to_sql_value())
                }
            }
        )*
    };
}

value_expr_from!(bool, i8, i16, i32, i64, u8, u16, u32, f32, f64, String, SqlValue);

impl From<&str> for ValueExpr {
    fn from(value: &str) -> Self {
        Self::Constant(value.to_sql_value())
    }
}

macro_rules! arithmetic_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<R: Into<ValueExpr>> $trait<R> for ValueExpr {
            type Output = ValueExpr;

            fn $method(self, rhs: R) -> ValueExpr {
                ValueExpr::binary($op, self, rhs)
            }
        }
    };
}

arithmetic_op!(Add, add, BinaryOp::Add);
arithmetic_op!(Sub, sub, BinaryOp::Sub);
arithmetic_op!(Mul, mul, BinaryOp::Mul);
arithmetic_op!(Div, div, BinaryOp::Div);
arithmetic_op!(Rem, rem, BinaryOp::Mod);
