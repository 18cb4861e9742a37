//! Extraction of the target table and row filter from an upstream SELECT.
//!
//! The upstream planner emits queries shaped like
//!
//! ```text
//! DECLARE @p0 int = 5;
//!
//! SELECT [o].[Id]
//! FROM [Orders] AS [o]
//! WHERE [o].[CustomerId] = @p0
//! ```
//!
//! This is not a SQL parser. The scanner only knows enough to skip string
//! literals, quoted identifiers and line comments, so that keywords are matched
//! as whole tokens.

use core::ops::Range;

use crate::dialect::DialectProfile;
use crate::error::{MalformedQuery, Result};

const FROM: &str = "FROM";
const AS: &str = "AS";
const WHERE: &str = "WHERE";
const SELECT: &str = "SELECT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Word,
    Quoted,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    span: Range<usize>,
}

/// Splits SQL text into words and quoted identifiers.
struct Scanner<'a> {
    src: &'a str,
    pos: usize,
    open: char,
    close: char,
}

impl<'a> Scanner<'a> {
    const fn new(src: &'a str, profile: &DialectProfile) -> Self {
        Self {
            src,
            pos: 0,
            open: profile.identifier_open,
            close: profile.identifier_close,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consumes a run delimited by `close`, where a doubled `close` is an escape.
    fn skip_delimited(&mut self, close: char) {
        while let Some(c) = self.bump() {
            if c == close {
                if self.peek() == Some(close) {
                    self.bump();
                } else {
                    return;
                }
            }
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.bump() {
            if c == '\n' {
                return;
            }
        }
    }
}

impl Iterator for Scanner<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            let start = self.pos;
            let c = self.bump()?;
            if c == '\'' {
                self.skip_delimited('\'');
            } else if c == self.open {
                self.skip_delimited(self.close);
                return Some(Token {
                    kind: TokenKind::Quoted,
                    span: start..self.pos,
                });
            } else if c == '-' && self.peek() == Some('-') {
                self.skip_line();
            } else if is_word_char(c) {
                while self.peek().is_some_and(is_word_char) {
                    self.bump();
                }
                return Some(Token {
                    kind: TokenKind::Word,
                    span: start..self.pos,
                });
            }
        }
    }
}

const fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '#'
}

fn is_keyword(src: &str, token: &Token, keyword: &str) -> bool {
    token.kind == TokenKind::Word && src[token.span.clone()].eq_ignore_ascii_case(keyword)
}

/// Finds the first blank line and splits off the declarations before it.
///
/// Text before the blank line that already starts the query (it holds a
/// `SELECT` or `FROM`) is never a preamble.
fn split_preamble<'a>(text: &'a str, profile: &DialectProfile) -> (Option<&'a str>, &'a str) {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if offset > 0 && line.trim().is_empty() {
            let head = text[..offset].trim_end();
            let declares_query = Scanner::new(head, profile)
                .any(|t| is_keyword(head, &t, FROM) || is_keyword(head, &t, SELECT));
            if head.is_empty() || declares_query {
                break;
            }
            return (Some(head), text[offset..].trim_start());
        }
        offset += line.len();
    }
    (None, text.trim_start())
}

/// An upstream SELECT split into the parts the statement compiler reuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceQuery<'a> {
    /// Declarations emitted before the query body, if any.
    pub preamble: Option<&'a str>,
    /// The physical table, as written between `FROM` and `AS`.
    pub table: &'a str,
    /// The table alias, as written after `AS`.
    pub alias: &'a str,
    /// Everything from `WHERE` to the end of the body.
    pub where_clause: &'a str,
}

impl<'a> SourceQuery<'a> {
    /// Parses an upstream query.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedQuery`] (wrapped in
    /// [`CompileError::MalformedQuery`](crate::CompileError::MalformedQuery))
    /// when `FROM`, `AS` or `WHERE` is missing, repeated or out of order, or
    /// when the table name or alias is empty.
    pub fn parse(text: &'a str, profile: &DialectProfile) -> Result<Self> {
        let (preamble, body) = split_preamble(text, profile);
        let tokens: Vec<Token> = Scanner::new(body, profile).collect();
        let position = |keyword: &str| tokens.iter().position(|t| is_keyword(body, t, keyword));

        let from = position(FROM).ok_or(MalformedQuery::MissingKeyword(FROM))?;
        if tokens[from + 1..].iter().any(|t| is_keyword(body, t, FROM)) {
            return Err(MalformedQuery::DuplicateKeyword(FROM).into());
        }

        let where_at = position(WHERE).ok_or(MalformedQuery::MissingKeyword(WHERE))?;
        if where_at < from {
            return Err(MalformedQuery::OutOfOrder {
                before: FROM,
                after: WHERE,
            }
            .into());
        }

        let as_at = match tokens[from..].iter().position(|t| is_keyword(body, t, AS)) {
            Some(offset) => from + offset,
            None if position(AS).is_some() => {
                return Err(MalformedQuery::OutOfOrder {
                    before: FROM,
                    after: AS,
                }
                .into());
            }
            None => return Err(MalformedQuery::MissingKeyword(AS).into()),
        };
        if as_at > where_at {
            return Err(MalformedQuery::OutOfOrder {
                before: AS,
                after: WHERE,
            }
            .into());
        }
        let as_count = tokens[..where_at]
            .iter()
            .filter(|t| is_keyword(body, t, AS))
            .count();
        if as_count > 1 {
            return Err(MalformedQuery::DuplicateKeyword(AS).into());
        }

        let table = body[tokens[from].span.end..tokens[as_at].span.start].trim();
        if table.is_empty() {
            return Err(MalformedQuery::EmptyTableName.into());
        }

        if as_at + 1 == where_at {
            return Err(MalformedQuery::MissingAlias.into());
        }
        let alias = &body[tokens[as_at + 1].span.clone()];

        Ok(Self {
            preamble,
            table,
            alias,
            where_clause: body[tokens[where_at].span.start..].trim_end(),
        })
    }

    /// Returns the WHERE clause with every `alias.` qualifier removed.
    #[must_use]
    pub fn unaliased_where(&self, profile: &DialectProfile) -> String {
        strip_qualifier(self.where_clause, self.alias, profile)
    }
}

/// Removes `qualifier.` wherever it prefixes a column reference.
///
/// Occurrences inside string literals or inside other identifiers are kept.
fn strip_qualifier(sql: &str, qualifier: &str, profile: &DialectProfile) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut copied = 0;
    for token in Scanner::new(sql, profile) {
        let end = token.span.end;
        if &sql[token.span.clone()] == qualifier && sql[end..].starts_with('.') {
            out.push_str(&sql[copied..token.span.start]);
            copied = end + 1;
        }
    }
    out.push_str(&sql[copied..]);
    out
}
