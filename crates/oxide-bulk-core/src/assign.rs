//! Compilation of column assignments into SET fragments.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::dialect::DialectProfile;
use crate::error::{CompileError, Result};
use crate::expr::ValueExpr;
use crate::render::{render, RenderedValue};
use crate::statement::ParameterBinding;

/// One `column = value` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentEntry {
    /// Target column.
    pub column: String,
    /// New value of the column.
    pub value: ValueExpr,
}

/// The new values for a bulk update, in declaration order.
///
/// ```rust
/// use oxide_bulk_core::assign::Assignment;
/// use oxide_bulk_core::expr::col;
///
/// let assignment = Assignment::new()
///     .set("Count", col("Count") + 1)
///     .set("Name", "Alice");
/// assert_eq!(assignment.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Assignment {
    entries: Vec<AssignmentEntry>,
}

impl Assignment {
    /// Creates an empty assignment.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds a column assignment.
    #[must_use]
    pub fn set(mut self, column: &str, value: impl Into<ValueExpr>) -> Self {
        self.entries.push(AssignmentEntry {
            column: String::from(column),
            value: value.into(),
        });
        self
    }

    /// Iterates over the assignments in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &AssignmentEntry> {
        self.entries.iter()
    }

    /// Returns the number of assignments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Columns left out of the SET clause. Matching is case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IgnoreSet {
    columns: Vec<String>,
}

impl IgnoreSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Adds a column, keeping insertion order and skipping duplicates.
    pub fn insert(&mut self, column: &str) {
        if !self.contains(column) {
            self.columns.push(String::from(column));
        }
    }

    /// Returns whether `column` is ignored.
    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        let needle = column.to_lowercase();
        self.columns.iter().any(|c| c.to_lowercase() == needle)
    }

    /// Returns the ignored columns in insertion order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl<'a> FromIterator<&'a str> for IgnoreSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = Self::new();
        for column in iter {
            set.insert(column);
        }
        set
    }
}

/// The compiled SET clause.
#[derive(Debug, Clone, PartialEq)]
pub struct SetClause {
    /// `"{column} = {sql}"` fragments in declaration order.
    pub fragments: Vec<String>,
    /// Parameters referenced by the fragments, in creation order.
    pub parameters: Vec<ParameterBinding>,
}

/// Compiles an assignment into SET fragments and bound parameters.
///
/// Arithmetic values are rendered inline (`[Count] = [Count] + 1`); every
/// other value is bound as `{prefix}{column}_P{ordinal}` where the ordinal
/// counts the parameters created so far.
///
/// # Errors
///
/// Returns [`CompileError::UnsupportedOperator`] for an operator the renderer
/// rejects, and [`CompileError::EmptyAssignment`] if no column is left after
/// applying `ignore`.
pub fn compile_assignment(
    assignment: &Assignment,
    ignore: &IgnoreSet,
    profile: &DialectProfile,
) -> Result<SetClause> {
    let mut fragments = Vec::with_capacity(assignment.len());
    let mut parameters: Vec<ParameterBinding> = Vec::new();

    for entry in assignment.iter() {
        if ignore.contains(&entry.column) {
            trace!(column = %entry.column, "Skipping ignored column");
            continue;
        }

        let column = profile.quote_identifier(&entry.column);
        let value = entry.value.unwrap_unary();

        if matches!(value, ValueExpr::Binary { .. }) {
            let sql = render(value, profile)?.into_sql(profile)?;
            fragments.push(format!("{column} = {sql}"));
            continue;
        }

        match render(value, profile)? {
            RenderedValue::InlineSql(sql) => fragments.push(format!("{column} = {sql}")),
            RenderedValue::Literal(literal) => {
                let name = profile.parameter_name(&entry.column, parameters.len());
                fragments.push(format!("{column} = {name}"));
                parameters.push(ParameterBinding::new(name, literal));
            }
        }
    }

    if fragments.is_empty() {
        return Err(CompileError::EmptyAssignment);
    }

    Ok(SetClause {
        fragments,
        parameters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{captured, col, BinaryOp};
    use crate::value::SqlValue;

    const MSSQL: DialectProfile = DialectProfile::SQL_SERVER;

    #[test]
    fn test_self_increment_has_no_parameter() {
        let assignment = Assignment::new().set("Count", col("Count") + 1);
        let clause = compile_assignment(&assignment, &IgnoreSet::new(), &MSSQL).unwrap();
        assert_eq!(clause.fragments, vec!["[Count] = [Count] + 1"]);
        assert!(clause.parameters.is_empty());
    }

    #[test]
    fn test_constant_is_bound() {
        let assignment = Assignment::new().set("Name", captured("name", "Alice"));
        let clause = compile_assignment(&assignment, &IgnoreSet::new(), &MSSQL).unwrap();
        assert_eq!(clause.fragments, vec!["[Name] = @Name_P0"]);
        assert_eq!(
            clause.parameters,
            vec![ParameterBinding::new("@Name_P0", SqlValue::Text("Alice".into()))]
        );
    }

    #[test]
    fn test_ordinals_skip_ignored_and_inline() {
        let assignment = Assignment::new()
            .set("A", 1)
            .set("Skipped", 2)
            .set("B", col("B") * 2)
            .set("C", "x")
            .set("D", SqlValue::Null);
        let ignore: IgnoreSet = ["skipped"].into_iter().collect();
        let clause = compile_assignment(&assignment, &ignore, &DialectProfile::ORACLE).unwrap();
        assert_eq!(
            clause.fragments,
            vec![
                "\"A\" = :A_P0",
                "\"B\" = \"B\" * 2",
                "\"C\" = :C_P1",
                "\"D\" = :D_P2",
            ]
        );
        let names: Vec<&str> = clause.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec![":A_P0", ":C_P1", ":D_P2"]);
    }

    #[test]
    fn test_unary_wrapped_binary_stays_inline() {
        let assignment = Assignment::new().set("Total", ValueExpr::unary(col("Total") - 5));
        let clause = compile_assignment(&assignment, &IgnoreSet::new(), &MSSQL).unwrap();
        assert_eq!(clause.fragments, vec!["[Total] = [Total] - 5"]);
    }

    #[test]
    fn test_column_copy_is_inline() {
        let assignment = Assignment::new().set("Backup", col("Current"));
        let clause = compile_assignment(&assignment, &IgnoreSet::new(), &MSSQL).unwrap();
        assert_eq!(clause.fragments, vec!["[Backup] = [Current]"]);
        assert!(clause.parameters.is_empty());
    }

    #[test]
    fn test_everything_ignored() {
        let assignment = Assignment::new().set("Name", "x");
        let ignore: IgnoreSet = ["NAME"].into_iter().collect();
        assert_eq!(
            compile_assignment(&assignment, &ignore, &MSSQL).unwrap_err(),
            CompileError::EmptyAssignment
        );
    }

    #[test]
    fn test_unsupported_operator() {
        let assignment =
            Assignment::new().set("Flags", ValueExpr::binary(BinaryOp::BitAnd, col("Flags"), 1));
        assert_eq!(
            compile_assignment(&assignment, &IgnoreSet::new(), &MSSQL).unwrap_err(),
            CompileError::UnsupportedOperator(BinaryOp::BitAnd)
        );
    }

    #[test]
    fn test_ignore_set_dedups() {
        let mut ignore = IgnoreSet::new();
        ignore.insert("Id");
        ignore.insert("ID");
        ignore.insert("Version");
        assert_eq!(ignore.columns(), ["Id", "Version"]);
    }
}
