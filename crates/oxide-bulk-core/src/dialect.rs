//! SQL dialect profiles.
//!
//! Each supported database kind differs in how identifiers are quoted and how
//! named parameters are introduced. Everything the compiler emits goes through
//! a [`DialectProfile`] so that no quote character is ever hard-coded.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CompileError, Result};

/// The database kinds the compiler knows how to target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
    /// Microsoft SQL Server.
    SqlServer,
    /// MySQL and MariaDB.
    MySql,
    /// PostgreSQL.
    PostgreSql,
    /// Oracle Database.
    Oracle,
}

impl DatabaseKind {
    /// All supported kinds.
    pub const ALL: [Self; 4] = [Self::SqlServer, Self::MySql, Self::PostgreSql, Self::Oracle];

    /// Returns the canonical name of the kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SqlServer => "sqlserver",
            Self::MySql => "mysql",
            Self::PostgreSql => "postgresql",
            Self::Oracle => "oracle",
        }
    }

    /// Resolves the kind from a connection URL's scheme.
    ///
    /// `postgres://user@host/db` and `mssql://...` both work; a bare name
    /// without `:` is treated as the kind name itself.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::UnsupportedDialect`] if the scheme does not
    /// name one of the four supported kinds.
    pub fn from_url(url: &str) -> Result<Self> {
        let scheme = url.split_once(':').map_or(url, |(scheme, _)| scheme);
        scheme.parse()
    }
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DatabaseKind {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlserver" | "mssql" => Ok(Self::SqlServer),
            "mysql" | "mariadb" => Ok(Self::MySql),
            "postgres" | "postgresql" => Ok(Self::PostgreSql),
            "oracle" => Ok(Self::Oracle),
            _ => Err(CompileError::UnsupportedDialect(s.to_string())),
        }
    }
}

/// Identifier quoting and parameter naming for one database kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DialectProfile {
    /// Opening identifier quote.
    pub identifier_open: char,
    /// Closing identifier quote.
    pub identifier_close: char,
    /// Prefix that introduces a named parameter.
    pub parameter_prefix: char,
    /// Whether booleans are written as `1`/`0` instead of `TRUE`/`FALSE`.
    pub numeric_booleans: bool,
}

impl DialectProfile {
    /// SQL Server: `[name]`, `@param`, `1`/`0`.
    pub const SQL_SERVER: Self = Self::new('[', ']', '@', true);
    /// MySQL: `` `name` ``, `@param`.
    pub const MYSQL: Self = Self::new('`', '`', '@', false);
    /// PostgreSQL: `"name"`, `:param`.
    pub const POSTGRESQL: Self = Self::new('"', '"', ':', false);
    /// Oracle: `"name"`, `:param`, `1`/`0`.
    pub const ORACLE: Self = Self::new('"', '"', ':', true);

    const fn new(
        identifier_open: char,
        identifier_close: char,
        parameter_prefix: char,
        numeric_booleans: bool,
    ) -> Self {
        Self {
            identifier_open,
            identifier_close,
            parameter_prefix,
            numeric_booleans,
        }
    }

    /// Returns the profile for a database kind.
    #[must_use]
    pub const fn for_kind(kind: DatabaseKind) -> Self {
        match kind {
            DatabaseKind::SqlServer => Self::SQL_SERVER,
            DatabaseKind::MySql => Self::MYSQL,
            DatabaseKind::PostgreSql => Self::POSTGRESQL,
            DatabaseKind::Oracle => Self::ORACLE,
        }
    }

    /// Resolves the profile from the kind a connection declares.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::UnsupportedDialect`] for anything other than
    /// the four supported kinds.
    pub fn resolve(connection_kind: &str) -> Result<Self> {
        connection_kind.parse().map(Self::for_kind)
    }

    /// Wraps an identifier in this dialect's quotes.
    ///
    /// A closing quote inside the name is doubled.
    #[must_use]
    pub fn quote_identifier(&self, name: &str) -> String {
        let mut quoted = String::with_capacity(name.len() + 2);
        quoted.push(self.identifier_open);
        for c in name.chars() {
            if c == self.identifier_close {
                quoted.push(c);
            }
            quoted.push(c);
        }
        quoted.push(self.identifier_close);
        quoted
    }

    /// Spells a boolean literal for this dialect.
    #[must_use]
    pub const fn boolean_literal(&self, value: bool) -> &'static str {
        match (self.numeric_booleans, value) {
            (true, true) => "1",
            (true, false) => "0",
            (false, true) => "TRUE",
            (false, false) => "FALSE",
        }
    }

    /// Builds the name of the `ordinal`-th parameter bound for `column`.
    #[must_use]
    pub fn parameter_name(&self, column: &str, ordinal: usize) -> String {
        format!("{}{column}_P{ordinal}", self.parameter_prefix)
    }
}
