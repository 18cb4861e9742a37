//! Bulk UPDATE and DELETE statements compiled from an upstream SELECT.
//!
//! # Example
//!
//! ```rust
//! use oxide_bulk_core::assign::{Assignment, IgnoreSet};
//! use oxide_bulk_core::dialect::DialectProfile;
//! use oxide_bulk_core::expr::col;
//! use oxide_bulk_core::statement::compile_update;
//!
//! let query = "SELECT [o].[Id]\nFROM [Orders] AS [o]\nWHERE [o].[Status] = @p0";
//! let assignment = Assignment::new()
//!     .set("Count", col("Count") + 1)
//!     .set("Status", "shipped");
//!
//! let statement = compile_update(
//!     query,
//!     &assignment,
//!     &IgnoreSet::new(),
//!     &DialectProfile::SQL_SERVER,
//! )
//! .unwrap();
//!
//! assert_eq!(
//!     statement.sql(),
//!     "UPDATE [Orders]\nSET [Count] = [Count] + 1, [Status] = @Status_P0\nWHERE [Status] = @p0"
//! );
//! assert_eq!(statement.parameters().len(), 1);
//! ```

mod source;

pub use source::SourceQuery;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assign::{compile_assignment, Assignment, IgnoreSet};
use crate::dialect::DialectProfile;
use crate::error::Result;
use crate::sharding::ShardingPragma;
use crate::value::SqlValue;

/// A named parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterBinding {
    /// Parameter name, including the dialect prefix.
    pub name: String,
    /// Bound value.
    pub value: SqlValue,
}

impl ParameterBinding {
    /// Creates a binding.
    #[must_use]
    pub fn new(name: impl Into<String>, value: SqlValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// SQL text together with the parameters it references.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledStatement {
    sql: String,
    parameters: Vec<ParameterBinding>,
}

impl CompiledStatement {
    /// Wraps already-built SQL.
    #[must_use]
    pub const fn new(sql: String, parameters: Vec<ParameterBinding>) -> Self {
        Self { sql, parameters }
    }

    /// Returns the SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the parameters in creation order.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterBinding] {
        &self.parameters
    }

    /// Prefixes the SQL with a sharding pragma.
    #[must_use]
    pub fn with_pragma(self, pragma: &ShardingPragma) -> Self {
        Self {
            sql: pragma.attach(&self.sql),
            parameters: self.parameters,
        }
    }

    /// Consumes the statement and returns SQL and parameters.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<ParameterBinding>) {
        (self.sql, self.parameters)
    }
}

fn assemble(preamble: Option<&str>, parts: &[&str]) -> String {
    let body = parts.join("\n");
    match preamble {
        Some(preamble) => format!("{preamble}\n{body}"),
        None => body,
    }
}

/// Compiles a bulk UPDATE for the rows an upstream SELECT identifies.
///
/// # Errors
///
/// Fails with [`CompileError::MalformedQuery`](crate::CompileError::MalformedQuery)
/// if `source` lacks the `FROM ... AS ... WHERE` shape, and with the errors of
/// [`compile_assignment`] for the SET clause.
pub fn compile_update(
    source: &str,
    assignment: &Assignment,
    ignore: &IgnoreSet,
    profile: &DialectProfile,
) -> Result<CompiledStatement> {
    let query = SourceQuery::parse(source, profile)?;
    let set = compile_assignment(assignment, ignore, profile)?;
    let where_clause = query.unaliased_where(profile);

    let update = format!("UPDATE {}", query.table);
    let set_sql = format!("SET {}", set.fragments.join(", "));
    let sql = assemble(
        query.preamble,
        &[update.as_str(), set_sql.as_str(), where_clause.as_str()],
    );

    debug!(
        table = %query.table,
        assignments = set.fragments.len(),
        parameters = set.parameters.len(),
        "Compiled bulk UPDATE"
    );

    Ok(CompiledStatement::new(sql, set.parameters))
}

/// Compiles a bulk DELETE for the rows an upstream SELECT identifies.
///
/// Placeholders already present in the WHERE clause are passed through.
///
/// # Errors
///
/// Fails with [`CompileError::MalformedQuery`](crate::CompileError::MalformedQuery)
/// if `source` lacks the `FROM ... AS ... WHERE` shape.
pub fn compile_delete(source: &str, profile: &DialectProfile) -> Result<CompiledStatement> {
    let query = SourceQuery::parse(source, profile)?;
    let where_clause = query.unaliased_where(profile);

    let delete = format!("DELETE FROM {}", query.table);
    let sql = assemble(query.preamble, &[delete.as_str(), where_clause.as_str()]);

    debug!(table = %query.table, "Compiled bulk DELETE");

    Ok(CompiledStatement::new(sql, Vec::new()))
}
