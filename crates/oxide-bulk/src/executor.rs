//! Bulk statement executor.
//!
//! This module sends compiled statements to SQLite. Every command passes
//! through the registered interceptors (the sharding rewriter by default)
//! and has its named parameters rebound positionally.

use std::sync::Arc;

use oxide_bulk_core::{
    CompiledStatement, ParameterBinding, ShardingRewriter, SqlValue, DEFAULT_SHARD_TAG,
};
use sqlx::sqlite::{SqliteArguments, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use tracing::{debug, info, warn};

use crate::binding::{to_positional, PositionalQuery};
use crate::error::Result;
use crate::interceptor::{apply_all, CommandInterceptor};
use crate::stats::{ConnectionStats, StatsSnapshot};

/// Settings for [`BulkExecutor::connect`].
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum pool size.
    pub max_connections: u32,
    /// Tag the sharding rewriter reacts to.
    pub shard_tag: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_connections: 5,
            shard_tag: String::from(DEFAULT_SHARD_TAG),
        }
    }
}

/// Executes compiled statements against a SQLite pool.
pub struct BulkExecutor {
    pool: SqlitePool,
    interceptors: Vec<Box<dyn CommandInterceptor>>,
    stats: Arc<ConnectionStats>,
}

impl BulkExecutor {
    /// Creates an executor over an existing pool, without interceptors.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            interceptors: Vec::new(),
            stats: Arc::new(ConnectionStats::new()),
        }
    }

    /// Opens a pool and installs a sharding rewriter for `config.shard_tag`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot connect.
    pub async fn connect(url: &str, config: &ExecutorConfig) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect(url)
            .await?;
        let executor = Self::new(pool).with_interceptor(ShardingRewriter::new(&config.shard_tag));
        executor.stats.record_connect();
        info!(url = %url, shard_tag = %config.shard_tag, "Connected");
        Ok(executor)
    }

    /// Adds an interceptor; interceptors run in registration order.
    #[must_use]
    pub fn with_interceptor(mut self, interceptor: impl CommandInterceptor + 'static) -> Self {
        self.interceptors.push(Box::new(interceptor));
        self
    }

    /// Returns the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the current counters.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Intercepts `sql` and rebinds its named parameters.
    #[must_use]
    pub fn prepare(&self, sql: &str, bindings: &[ParameterBinding]) -> PositionalQuery {
        let sql = apply_all(&self.interceptors, sql);
        to_positional(&sql, bindings)
    }

    /// Executes a compiled statement and returns the number of affected rows.
    ///
    /// `upstream` carries the values of placeholders the planner left in the
    /// WHERE clause.
    ///
    /// # Errors
    ///
    /// Returns an error if the database rejects the statement.
    pub async fn execute(
        &self,
        statement: &CompiledStatement,
        upstream: &[ParameterBinding],
    ) -> Result<u64> {
        let bindings = merge_bindings(statement.parameters(), upstream);
        let prepared = self.prepare(statement.sql(), &bindings);
        run(&self.stats, prepared, &self.pool).await
    }

    /// Executes raw SQL (still intercepted).
    ///
    /// # Errors
    ///
    /// Returns an error if the database rejects the statement.
    pub async fn execute_raw(&self, sql: &str) -> Result<u64> {
        let prepared = self.prepare(sql, &[]);
        run(&self.stats, prepared, &self.pool).await
    }

    /// Starts a transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection can be acquired.
    pub async fn begin(&self) -> Result<BulkTransaction<'_>> {
        let tx = self.pool.begin().await?;
        self.stats.record_begin();
        debug!("Transaction started");
        Ok(BulkTransaction {
            executor: self,
            tx,
            pending: PendingRollback {
                stats: &self.stats,
                armed: true,
            },
        })
    }

    /// Closes the pool.
    pub async fn close(self) {
        self.pool.close().await;
        self.stats.record_disconnect();
        info!("Disconnected");
    }
}

/// A transaction opened by [`BulkExecutor::begin`].
///
/// Dropping it without [`commit`](Self::commit) rolls back, and the rollback
/// is counted like an explicit one.
pub struct BulkTransaction<'e> {
    executor: &'e BulkExecutor,
    tx: Transaction<'static, Sqlite>,
    pending: PendingRollback<'e>,
}

/// Counts a rollback when dropped unless the transaction committed.
struct PendingRollback<'e> {
    stats: &'e ConnectionStats,
    armed: bool,
}

impl Drop for PendingRollback<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.stats.record_rollback();
        }
    }
}

impl BulkTransaction<'_> {
    /// Executes a compiled statement inside the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the database call fails.
    pub async fn execute(
        &mut self,
        statement: &CompiledStatement,
        upstream: &[ParameterBinding],
    ) -> Result<u64> {
        let bindings = merge_bindings(statement.parameters(), upstream);
        let prepared = self.executor.prepare(statement.sql(), &bindings);
        run(&self.executor.stats, prepared, &mut *self.tx).await
    }

    /// Executes raw SQL inside the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the database call fails.
    pub async fn execute_raw(&mut self, sql: &str) -> Result<u64> {
        let prepared = self.executor.prepare(sql, &[]);
        run(&self.executor.stats, prepared, &mut *self.tx).await
    }

    /// Commits the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the database call fails.
    pub async fn commit(mut self) -> Result<()> {
        self.tx.commit().await?;
        self.pending.armed = false;
        self.executor.stats.record_commit();
        debug!("Transaction committed");
        Ok(())
    }

    /// Rolls the transaction back.
    ///
    /// # Errors
    ///
    /// Returns an error if the database call fails.
    pub async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        warn!("Transaction rolled back");
        Ok(())
    }
}

fn merge_bindings(
    own: &[ParameterBinding],
    upstream: &[ParameterBinding],
) -> Vec<ParameterBinding> {
    own.iter().chain(upstream).cloned().collect()
}

async fn run<'c, E>(
    stats: &ConnectionStats,
    prepared: PositionalQuery,
    executor: E,
) -> Result<u64>
where
    E: sqlx::Executor<'c, Database = Sqlite>,
{
    debug!(sql = %prepared.sql, params = prepared.values.len(), "Executing SQL");
    stats.record_command();

    let mut query = sqlx::query(&prepared.sql);
    for value in prepared.values {
        query = bind_value(query, value);
    }

    let result = query.execute(executor).await?;
    Ok(result.rows_affected())
}

/// Binds a `SqlValue` to a raw query.
fn bind_value<'q>(
    query: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    value: SqlValue,
) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Bool(b) => query.bind(b),
        SqlValue::Int(i) => query.bind(i),
        SqlValue::Float(f) => query.bind(f),
        SqlValue::Text(s) => query.bind(s),
        SqlValue::Blob(b) => query.bind(b),
    }
}
