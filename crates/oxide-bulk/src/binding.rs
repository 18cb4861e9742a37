//! Named-to-positional parameter binding.
//!
//! Compiled statements reference parameters by name (`@Name_P0`, `:p0`).
//! SQLite through sqlx binds by position, so each known name is rewritten to
//! `?NNN` and the values are returned in index order.

use std::collections::HashMap;

use oxide_bulk_core::{ParameterBinding, SqlValue};

/// SQL with positional placeholders and the values to bind, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionalQuery {
    /// SQL text using `?1`, `?2`, ...
    pub sql: String,
    /// Values for `?1`, `?2`, ...
    pub values: Vec<SqlValue>,
}

const fn is_prefix(c: char) -> bool {
    matches!(c, '@' | ':' | '$')
}

const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

const fn closing_quote(c: char) -> Option<char> {
    match c {
        '\'' => Some('\''),
        '"' => Some('"'),
        '`' => Some('`'),
        '[' => Some(']'),
        _ => None,
    }
}

/// Rewrites every placeholder that names one of `bindings`.
///
/// Placeholders inside string literals and quoted identifiers are left
/// alone, as are names with no matching binding.
#[must_use]
pub fn to_positional(sql: &str, bindings: &[ParameterBinding]) -> PositionalQuery {
    let by_name: HashMap<&str, &SqlValue> = bindings
        .iter()
        .map(|b| (b.name.as_str(), &b.value))
        .collect();
    let mut indexes: HashMap<&str, usize> = HashMap::new();
    let mut values = Vec::new();
    let mut out = String::with_capacity(sql.len());

    let mut chars = sql.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        if let Some(close) = closing_quote(c) {
            let mut end = sql.len();
            while let Some((i, q)) = chars.next() {
                if q == close {
                    if chars.peek().is_some_and(|&(_, n)| n == close) {
                        chars.next();
                        continue;
                    }
                    end = i + q.len_utf8();
                    break;
                }
            }
            out.push_str(&sql[start..end]);
            continue;
        }

        if is_prefix(c) && chars.peek().is_some_and(|&(_, n)| is_name_char(n)) {
            let mut end = sql.len();
            while let Some(&(i, n)) = chars.peek() {
                if !is_name_char(n) {
                    end = i;
                    break;
                }
                chars.next();
            }
            let name = &sql[start..end];
            if let Some(value) = by_name.get(name) {
                let index = *indexes.entry(name).or_insert_with(|| {
                    values.push((*value).clone());
                    values.len()
                });
                out.push_str(&format!("?{index}"));
            } else {
                out.push_str(name);
            }
            continue;
        }

        out.push(c);
    }

    PositionalQuery { sql: out, values }
}
