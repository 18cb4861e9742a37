//! Error types for statement compilation.

use core::fmt;

use thiserror::Error;

use crate::expr::BinaryOp;

/// The compilation stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Resolving the dialect profile for a connection.
    Dialect,
    /// Extracting the table and WHERE fragment from the source query.
    Extraction,
    /// Rendering a value expression to SQL.
    Rendering,
    /// Assembling SET fragments into a statement.
    Compilation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Dialect => "dialect",
            Self::Extraction => "extraction",
            Self::Rendering => "rendering",
            Self::Compilation => "compilation",
        };
        f.write_str(name)
    }
}

/// Ways an upstream SELECT can violate the expected `FROM ... AS ... WHERE` shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedQuery {
    /// A required keyword does not appear in the query body.
    #[error("missing `{0}` keyword")]
    MissingKeyword(&'static str),

    /// A keyword that must be unique appears more than once.
    #[error("`{0}` appears more than once")]
    DuplicateKeyword(&'static str),

    /// Two keywords appear in the wrong order.
    #[error("`{after}` must follow `{before}`")]
    OutOfOrder {
        /// The keyword that has to come first.
        before: &'static str,
        /// The keyword that has to come second.
        after: &'static str,
    },

    /// Nothing between `FROM` and `AS`.
    #[error("empty table name between `FROM` and `AS`")]
    EmptyTableName,

    /// `AS` is not followed by an alias before `WHERE`.
    #[error("missing table alias after `AS`")]
    MissingAlias,
}

/// Errors raised while compiling a bulk statement.
///
/// None of these are transient: the same input fails the same way on retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The connection declares a database kind with no dialect profile.
    #[error("unsupported dialect: {0}")]
    UnsupportedDialect(String),

    /// The source query does not have the shape the compiler relies on.
    #[error("malformed source query: {0}")]
    MalformedQuery(#[from] MalformedQuery),

    /// A binary node uses an operator outside the supported set.
    #[error("unsupported operator `{}` ({:?}) in assignment expression", .0.as_str(), .0)]
    UnsupportedOperator(BinaryOp),

    /// A NaN or infinite float would have to be spliced into SQL text.
    #[error("non-finite float `{0}` cannot be written as a SQL literal")]
    NonFiniteLiteral(String),

    /// Every assignment was ignored, leaving an empty SET clause.
    #[error("no columns left to assign after applying the ignore list")]
    EmptyAssignment,
}

impl CompileError {
    /// Returns the stage that failed.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::UnsupportedDialect(_) => Stage::Dialect,
            Self::MalformedQuery(_) => Stage::Extraction,
            Self::UnsupportedOperator(_) | Self::NonFiniteLiteral(_) => Stage::Rendering,
            Self::EmptyAssignment => Stage::Compilation,
        }
    }
}

/// Result type alias for compilation.
pub type Result<T> = std::result::Result<T, CompileError>;
