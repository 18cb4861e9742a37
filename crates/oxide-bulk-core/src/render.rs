//! Rendering of value expressions.

use crate::dialect::DialectProfile;
use crate::error::{CompileError, Result};
use crate::expr::{BinaryOp, MemberBinding, ValueExpr};
use crate::value::SqlValue;

/// Outcome of rendering one expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedValue {
    /// SQL text that can be spliced as-is, such as a column reference.
    InlineSql(String),
    /// A value that has to be bound as a parameter.
    Literal(SqlValue),
}

impl RenderedValue {
    /// Returns the SQL text, writing a literal the way `profile` spells it.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::NonFiniteLiteral`] for a NaN or infinite
    /// float, which has no SQL spelling.
    pub fn into_sql(self, profile: &DialectProfile) -> Result<String> {
        match self {
            Self::InlineSql(sql) => Ok(sql),
            Self::Literal(SqlValue::Bool(b)) => Ok(profile.boolean_literal(b).to_string()),
            Self::Literal(value) if !value.has_sql_literal() => {
                Err(CompileError::NonFiniteLiteral(value.to_sql_inline()))
            }
            Self::Literal(value) => Ok(value.to_sql_inline()),
        }
    }
}

/// Renders an expression node for the given dialect.
///
/// # Errors
///
/// Returns [`CompileError::UnsupportedOperator`] if any binary node in the
/// tree uses an operator other than `=`, `+`, `-`, `*`, `/` or `%`, and
/// [`CompileError::NonFiniteLiteral`] if a binary node would have to embed a
/// NaN or infinite float.
pub fn render(node: &ValueExpr, profile: &DialectProfile) -> Result<RenderedValue> {
    match node {
        ValueExpr::Member {
            binding: MemberBinding::Captured(value),
            ..
        } => Ok(RenderedValue::Literal(value.clone())),
        ValueExpr::Member {
            name,
            binding: MemberBinding::Column,
        } => Ok(RenderedValue::InlineSql(profile.quote_identifier(name))),
        ValueExpr::Constant(value) => Ok(RenderedValue::Literal(value.clone())),
        ValueExpr::Unary(operand) => render(operand, profile),
        ValueExpr::Binary { op, left, right } => {
            if !op.is_supported() {
                return Err(CompileError::UnsupportedOperator(*op));
            }
            let left_sql = render_operand(*op, left, false, profile)?;
            let right_sql = render_operand(*op, right, true, profile)?;
            Ok(RenderedValue::InlineSql(format!(
                "{left_sql} {} {right_sql}",
                op.as_str()
            )))
        }
    }
}

fn render_operand(
    parent: BinaryOp,
    operand: &ValueExpr,
    is_right: bool,
    profile: &DialectProfile,
) -> Result<String> {
    let sql = render(operand, profile)?.into_sql(profile)?;
    if needs_parens(parent, operand, is_right) {
        Ok(format!("({sql})"))
    } else {
        Ok(sql)
    }
}

fn needs_parens(parent: BinaryOp, operand: &ValueExpr, is_right: bool) -> bool {
    let ValueExpr::Binary { op: child, .. } = operand.unwrap_unary() else {
        return false;
    };
    child.precedence() < parent.precedence()
        || (is_right && child.precedence() == parent.precedence() && parent.is_non_associative())
}
