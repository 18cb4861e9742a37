//! # oxide-bulk-core
//!
//! Bulk UPDATE/DELETE compilation and sharded table rewriting for
//! ORM-generated SQL.
//!
//! This crate provides:
//! - Dialect profiles for SQL Server, MySQL, PostgreSQL and Oracle
//! - A renderer for small arithmetic value expressions
//! - An assignment compiler that turns `column = value` pairs into a SET
//!   clause with bound parameters
//! - UPDATE and DELETE compilation that reuses the FROM/WHERE of an upstream
//!   SELECT
//! - A last-mile rewriter that swaps table names for sharding
//!
//! ## Bulk Updates
//!
//! ```rust
//! use oxide_bulk_core::{compile_update, col, Assignment, DialectProfile, IgnoreSet};
//!
//! let query = "SELECT [s].[Id]\nFROM [Stock] AS [s]\nWHERE [s].[Sku] = @p0";
//! let statement = compile_update(
//!     query,
//!     &Assignment::new().set("Count", col("Count") - 1),
//!     &IgnoreSet::new(),
//!     &DialectProfile::resolve("sqlserver").unwrap(),
//! )
//! .unwrap();
//!
//! assert_eq!(
//!     statement.sql(),
//!     "UPDATE [Stock]\nSET [Count] = [Count] - 1\nWHERE [Sku] = @p0"
//! );
//! ```
//!
//! ## SQL Injection Prevention
//!
//! Plain values become named parameters and are never spliced:
//!
//! ```rust
//! use oxide_bulk_core::{compile_update, Assignment, DialectProfile, IgnoreSet, SqlValue};
//!
//! let user_input = "'; DROP TABLE users; --";
//! let statement = compile_update(
//!     "SELECT 1 FROM [Users] AS [u] WHERE [u].[Id] = @p0",
//!     &Assignment::new().set("Name", user_input),
//!     &IgnoreSet::new(),
//!     &DialectProfile::SQL_SERVER,
//! )
//! .unwrap();
//!
//! assert!(statement.sql().contains("[Name] = @Name_P0"));
//! assert_eq!(statement.parameters()[0].value, SqlValue::Text(user_input.into()));
//! ```

pub mod assign;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod render;
pub mod sharding;
pub mod statement;
pub mod value;

pub use assign::{compile_assignment, Assignment, IgnoreSet, SetClause};
pub use dialect::{DatabaseKind, DialectProfile};
pub use error::{CompileError, MalformedQuery, Result, Stage};
pub use expr::{captured, col, lit, BinaryOp, MemberBinding, ValueExpr};
pub use render::{render, RenderedValue};
pub use sharding::{ShardingPragma, ShardingRewriter, DEFAULT_SHARD_TAG};
pub use statement::{
    compile_delete, compile_update, CompiledStatement, ParameterBinding, SourceQuery,
};
pub use value::{SqlValue, ToSqlValue};
