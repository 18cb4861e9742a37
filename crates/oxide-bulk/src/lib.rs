//! # oxide-bulk
//!
//! Runs bulk statements compiled by `oxide-bulk-core` against SQLite.
//!
//! The executor owns a connection pool, a chain of
//! [`CommandInterceptor`]s (a [`ShardingRewriter`](oxide_bulk_core::ShardingRewriter)
//! by default) and a set of [`ConnectionStats`] counters. Compiled statements
//! use named parameters; [`to_positional`] rebinds them to `?NNN` before the
//! query reaches sqlx.
//!
//! ## Example
//!
//! ```rust,no_run
//! use oxide_bulk::{BulkExecutor, ExecutorConfig};
//! use oxide_bulk_core::{compile_delete, DialectProfile};
//!
//! # async fn example() -> oxide_bulk::Result<()> {
//! let executor = BulkExecutor::connect("sqlite::memory:", &ExecutorConfig::default()).await?;
//! let statement = compile_delete(
//!     "SELECT [o].[Id] FROM [Orders] AS [o] WHERE [o].[Status] = 'void'",
//!     &DialectProfile::SQL_SERVER,
//! )?;
//! let deleted = executor.execute(&statement, &[]).await?;
//! println!("{deleted} rows deleted");
//! # Ok(())
//! # }
//! ```

pub mod binding;
pub mod error;
pub mod executor;
pub mod interceptor;
pub mod request;
pub mod stats;

pub use binding::{to_positional, PositionalQuery};
pub use error::{ExecError, Result};
pub use executor::{BulkExecutor, BulkTransaction, ExecutorConfig};
pub use interceptor::CommandInterceptor;
pub use request::{parse_shard_route, BulkRequest, Operation, ShardRoute};
pub use stats::{ConnectionStats, StatsSnapshot};
