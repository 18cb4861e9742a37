//! Execution-time table substitution for sharded tables.
//!
//! A routing decision upstream attaches a pragma as the first line of the
//! command text:
//!
//! ```text
//! -- SHARD:orders_2023:orders_2024
//! SELECT * FROM orders_2023
//! ```
//!
//! [`ShardingRewriter::rewrite`] strips that line and replaces the old table
//! name with the new one just before the command goes to the driver.

use std::borrow::Cow;

use tracing::{debug, warn};

/// Tag used when none is configured.
pub const DEFAULT_SHARD_TAG: &str = "SHARD";

/// A `-- {tag}:{old}:{new}` routing instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardingPragma {
    tag: String,
    old_table: String,
    new_table: String,
}

impl ShardingPragma {
    /// Creates a pragma that routes `old_table` to `new_table`.
    #[must_use]
    pub fn new(tag: &str, old_table: &str, new_table: &str) -> Self {
        Self {
            tag: String::from(tag),
            old_table: String::from(old_table),
            new_table: String::from(new_table),
        }
    }

    /// Returns the logical table name.
    #[must_use]
    pub fn old_table(&self) -> &str {
        &self.old_table
    }

    /// Returns the physical table name.
    #[must_use]
    pub fn new_table(&self) -> &str {
        &self.new_table
    }

    /// Returns the pragma line without its line break.
    #[must_use]
    pub fn line(&self) -> String {
        format!("-- {}:{}:{}", self.tag, self.old_table, self.new_table)
    }

    /// Prepends the pragma line to `sql`.
    #[must_use]
    pub fn attach(&self, sql: &str) -> String {
        format!("{}\r\n{sql}", self.line())
    }

    /// Parses a pragma line carrying `tag`.
    ///
    /// Returns `None` unless the line has exactly two non-empty table fields.
    #[must_use]
    pub fn parse(tag: &str, line: &str) -> Option<Self> {
        let fields = line
            .trim_end_matches(['\r', '\n'])
            .strip_prefix("-- ")?
            .strip_prefix(tag)?
            .strip_prefix(':')?;
        let (old_table, new_table) = fields.split_once(':')?;
        if old_table.is_empty() || new_table.is_empty() || new_table.contains(':') {
            return None;
        }
        Some(Self::new(tag, old_table, new_table))
    }
}

/// Rewrites command text that carries a sharding pragma.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardingRewriter {
    tag: String,
    prefix: String,
}

impl Default for ShardingRewriter {
    fn default() -> Self {
        Self::new(DEFAULT_SHARD_TAG)
    }
}

impl ShardingRewriter {
    /// Creates a rewriter that reacts to pragmas carrying `tag`.
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: String::from(tag),
            prefix: format!("-- {tag}:"),
        }
    }

    /// Returns the configured tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Creates a pragma with this rewriter's tag.
    #[must_use]
    pub fn pragma(&self, old_table: &str, new_table: &str) -> ShardingPragma {
        ShardingPragma::new(&self.tag, old_table, new_table)
    }

    /// Applies the pragma at the head of `sql`, if there is one.
    ///
    /// Text without the pragma prefix is returned borrowed and untouched. A
    /// pragma that cannot be parsed is logged and the text is also returned
    /// untouched.
    #[must_use]
    pub fn rewrite<'a>(&self, sql: &'a str) -> Cow<'a, str> {
        if !sql.starts_with(&self.prefix) {
            return Cow::Borrowed(sql);
        }

        let (line, body) = sql.split_once('\n').unwrap_or((sql, ""));
        let Some(pragma) = ShardingPragma::parse(&self.tag, line) else {
            warn!(pragma = %line.trim_end(), "Ignoring malformed sharding pragma");
            return Cow::Borrowed(sql);
        };

        debug!(
            old_table = %pragma.old_table,
            new_table = %pragma.new_table,
            "Rewriting sharded table"
        );
        Cow::Owned(replace_table(body, &pragma.old_table, &pragma.new_table))
    }
}

const fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Replaces whole-name occurrences of `old` with `new`.
///
/// An occurrence counts only if it is not glued to a longer identifier, so
/// `order` does not match inside `orders_archive`.
fn replace_table(text: &str, old: &str, new: &str) -> String {
    let guard_start = old.chars().next().is_some_and(is_ident_char);
    let guard_end = old.chars().next_back().is_some_and(is_ident_char);

    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    for (at, _) in text.match_indices(old) {
        let end = at + old.len();
        let before_ok = !guard_start || !text[..at].chars().next_back().is_some_and(is_ident_char);
        let after_ok = !guard_end || !text[end..].chars().next().is_some_and(is_ident_char);
        if before_ok && after_ok {
            out.push_str(&text[copied..at]);
            out.push_str(new);
            copied = end;
        }
    }
    out.push_str(&text[copied..]);
    out
}
