//! JSON bulk requests.
//!
//! A request names the connection kind, the upstream SELECT, and what to do
//! with the rows it selects:
//!
//! ```json
//! {
//!   "kind": "sqlserver",
//!   "operation": "update",
//!   "query": "SELECT [o].[Id] FROM [Orders] AS [o] WHERE [o].[Id] = @p0",
//!   "set": [{"column": "Status", "value": {"constant": "shipped"}}],
//!   "bindings": [{"name": "@p0", "value": 42}],
//!   "shard": {"from": "[Orders]", "to": "[Orders_2024]"}
//! }
//! ```

use std::path::Path;

use oxide_bulk_core::{
    compile_delete, compile_update, Assignment, CompiledStatement, DialectProfile, IgnoreSet,
    ParameterBinding, ShardingPragma,
};
use serde::{Deserialize, Serialize};

use crate::error::{ExecError, Result};

/// What the request does to the selected rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Bulk UPDATE.
    #[default]
    Update,
    /// Bulk DELETE.
    Delete,
}

/// A `from` to `to` table route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardRoute {
    /// Table name as written in the compiled SQL.
    pub from: String,
    /// Physical table to use instead.
    pub to: String,
}

impl ShardRoute {
    /// Builds the pragma for this route.
    #[must_use]
    pub fn pragma(&self, tag: &str) -> ShardingPragma {
        ShardingPragma::new(tag, &self.from, &self.to)
    }
}

/// Parses an `OLD:NEW` route given on the command line.
///
/// # Errors
///
/// Returns [`ExecError::InvalidShardRoute`] unless the text has exactly two
/// non-empty parts.
pub fn parse_shard_route(text: &str) -> Result<ShardRoute> {
    let mut parts = text.split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(from), Some(to), None) if !from.is_empty() && !to.is_empty() => Ok(ShardRoute {
            from: from.to_string(),
            to: to.to_string(),
        }),
        _ => Err(ExecError::InvalidShardRoute(text.to_string())),
    }
}

/// A bulk request read from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkRequest {
    /// Connection kind (`sqlserver`, `mysql`, `postgresql`, `oracle`).
    pub kind: String,
    /// UPDATE or DELETE.
    #[serde(default)]
    pub operation: Operation,
    /// The upstream SELECT.
    pub query: String,
    /// Column assignments (UPDATE only).
    #[serde(default)]
    pub set: Assignment,
    /// Columns to leave out of the SET clause.
    #[serde(default)]
    pub ignore: IgnoreSet,
    /// Values for placeholders already present in the query.
    #[serde(default)]
    pub bindings: Vec<ParameterBinding>,
    /// Optional table route.
    #[serde(default)]
    pub shard: Option<ShardRoute>,
}

impl BulkRequest {
    /// Parses a request from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError::Serialization`] if the JSON does not describe a
    /// request.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads a request from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Compiles the request, attaching the shard pragma if a route is set.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError::Compile`] if the kind is unsupported or the
    /// query cannot be compiled.
    pub fn compile(&self, shard_tag: &str) -> Result<CompiledStatement> {
        let profile = DialectProfile::resolve(&self.kind)?;
        let statement = match self.operation {
            Operation::Update => compile_update(&self.query, &self.set, &self.ignore, &profile)?,
            Operation::Delete => compile_delete(&self.query, &profile)?,
        };
        Ok(match &self.shard {
            Some(route) => statement.with_pragma(&route.pragma(shard_tag)),
            None => statement,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxide_bulk_core::{CompileError, SqlValue};

    const UPDATE_REQUEST: &str = r#"{
        "kind": "sqlserver",
        "query": "SELECT [o].[Id]\nFROM [Orders] AS [o]\nWHERE [o].[Id] = @p0",
        "set": [
            {"column": "Count", "value": {"binary": {"op": "add", "left": {"member": {"name": "Count", "binding": "column"}}, "right": {"constant": 1}}}},
            {"column": "Status", "value": {"constant": "shipped"}}
        ],
        "bindings": [{"name": "@p0", "value": 42}]
    }"#;

    #[test]
    fn test_update_request_defaults() {
        let request = BulkRequest::from_json(UPDATE_REQUEST).unwrap();
        assert_eq!(request.operation, Operation::Update);
        assert!(request.ignore.columns().is_empty());
        assert!(request.shard.is_none());
        assert_eq!(request.bindings[0].value, SqlValue::Int(42));

        let statement = request.compile("SHARD").unwrap();
        assert_eq!(
            statement.sql(),
            "UPDATE [Orders]\nSET [Count] = [Count] + 1, [Status] = @Status_P0\nWHERE [Id] = @p0"
        );
    }

    #[test]
    fn test_delete_request_with_shard() {
        let request = BulkRequest::from_json(
            r#"{
                "kind": "mysql",
                "operation": "delete",
                "query": "SELECT `o`.`Id` FROM `Orders` AS `o` WHERE `o`.`Id` = @p0",
                "shard": {"from": "`Orders`", "to": "`Orders_2024`"}
            }"#,
        )
        .unwrap();
        let statement = request.compile("SHARD").unwrap();
        assert_eq!(
            statement.sql(),
            "-- SHARD:`Orders`:`Orders_2024`\r\nDELETE FROM `Orders`\nWHERE `Id` = @p0"
        );
    }

    #[test]
    fn test_unknown_kind_is_compile_error() {
        let request = BulkRequest::from_json(
            r#"{"kind": "sqlite", "operation": "delete", "query": "SELECT 1 FROM t AS x WHERE x.a = 1"}"#,
        )
        .unwrap();
        let err = request.compile("SHARD").unwrap_err();
        assert!(matches!(
            err,
            ExecError::Compile(CompileError::UnsupportedDialect(_))
        ));
    }

    #[test]
    fn test_parse_shard_route() {
        let route = parse_shard_route("[Orders]:[Orders_2024]").unwrap();
        assert_eq!(route.from, "[Orders]");
        assert_eq!(route.to, "[Orders_2024]");

        for bad in ["Orders", "Orders:", ":Orders", "a:b:c"] {
            assert!(matches!(
                parse_shard_route(bad),
                Err(ExecError::InvalidShardRoute(_))
            ));
        }
    }
}
