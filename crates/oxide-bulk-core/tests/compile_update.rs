//! Tests for bulk UPDATE compilation.

mod common;
use common::*;

use oxide_bulk_core::{
    captured, col, compile_update, lit, Assignment, BinaryOp, CompileError, DatabaseKind,
    DialectProfile, IgnoreSet, MalformedQuery, SqlValue, Stage, ValueExpr,
};

// ===================================================================
// Layout
// ===================================================================

#[test]
fn update_keeps_preamble_as_first_block() {
    let s = update(ORDERS_QUERY, &Assignment::new().set("Count", col("Count") + 1));
    assert_eq!(
        s.sql(),
        "DECLARE @p0 int = 42;\nUPDATE [Orders]\nSET [Count] = [Count] + 1\nWHERE [Id] = @p0"
    );
    assert!(s.sql().starts_with("DECLARE @p0 int = 42;"));
    assert!(s.sql().contains("UPDATE [Orders]"));
    assert!(!s.sql().contains("[s]."));
}

#[test]
fn update_without_preamble() {
    let s = update(
        "SELECT [u].[Id] FROM [Users] AS [u] WHERE [u].[Active] = 0",
        &Assignment::new().set("Deleted", true),
    );
    assert_eq!(
        s.sql(),
        "UPDATE [Users]\nSET [Deleted] = @Deleted_P0\nWHERE [Active] = 0"
    );
    assert_eq!(s.parameters()[0].value, SqlValue::Bool(true));
}

#[test]
fn update_multiple_assignments_in_declaration_order() {
    let s = update(
        ORDERS_QUERY,
        &Assignment::new()
            .set("Status", "shipped")
            .set("Count", col("Count") - 1)
            .set("Total", col("Total") * captured("rate", 1.5))
            .set("Note", SqlValue::Null),
    );
    assert!(s.sql().contains(
        "SET [Status] = @Status_P0, [Count] = [Count] - 1, [Total] = [Total] * 1.5, [Note] = @Note_P1\n"
    ));
    let names: Vec<&str> = s.parameters().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["@Status_P0", "@Note_P1"]);
}

#[test]
fn blank_line_before_from_stays_in_body() {
    let s = update(
        "SELECT [o].[Id]\n\nFROM [Orders] AS [o]\nWHERE [o].[Id] = 1",
        &Assignment::new().set("A", 1),
    );
    assert_eq!(s.sql(), "UPDATE [Orders]\nSET [A] = @A_P0\nWHERE [Id] = 1");
}

// ===================================================================
// Parameters
// ===================================================================

#[test]
fn captured_constant_becomes_parameter() {
    let s = update(
        ORDERS_QUERY,
        &Assignment::new().set("Name", captured("name", "Alice")),
    );
    assert!(s.sql().contains("SET [Name] = @Name_P0\n"));
    assert_eq!(s.parameters().len(), 1);
    assert_eq!(s.parameters()[0].name, "@Name_P0");
    assert_eq!(s.parameters()[0].value, SqlValue::Text("Alice".into()));
}

#[test]
fn self_referential_arithmetic_has_no_parameter() {
    let s = update(ORDERS_QUERY, &Assignment::new().set("Count", col("Count") + 1));
    assert!(s.sql().contains("SET [Count] = [Count] + 1\n"));
    assert!(s.parameters().is_empty());
}

#[test]
fn ordinals_are_unique_and_increasing_with_ignored_columns() {
    let assignment = Assignment::new()
        .set("Id", 1)
        .set("A", 1)
        .set("Version", 7)
        .set("B", lit(2))
        .set("C", col("C") % 3)
        .set("D", captured("d", 4));
    let s = update_ignoring(ORDERS_QUERY, &assignment, &["id", "VERSION"]);

    let ordinals: Vec<usize> = s
        .parameters()
        .iter()
        .map(|p| p.name.rsplit("_P").next().unwrap().parse().unwrap())
        .collect();
    assert_eq!(ordinals, vec![0, 1, 2]);
    assert!(!s.sql().contains("@Id_P"));
    assert!(!s.sql().contains("[Version]"));
    assert!(s.sql().contains("SET [A] = @A_P0, [B] = @B_P1, [C] = [C] % 3, [D] = @D_P2\n"));
}

#[test]
fn sql_injection_in_value_stays_bound() {
    let malicious = "'; DROP TABLE users; --";
    let s = update(ORDERS_QUERY, &Assignment::new().set("Name", malicious));
    assert!(!s.sql().contains("DROP TABLE"));
    assert_eq!(s.parameters()[0].value, SqlValue::Text(malicious.into()));
}

#[test]
fn literal_inside_arithmetic_is_escaped() {
    let s = update(
        ORDERS_QUERY,
        &Assignment::new().set("Code", col("Code").eq(captured("c", "x'; --"))),
    );
    assert!(s.sql().contains("SET [Code] = [Code] = 'x''; --'\n"));
}

#[test]
fn inline_whole_float_keeps_decimal_point() {
    let s = update(
        ORDERS_QUERY,
        &Assignment::new().set("Count", col("Count") / captured("d", 2.0)),
    );
    assert!(s.sql().contains("SET [Count] = [Count] / 2.0\n"));
    assert!(s.parameters().is_empty());
}

#[test]
fn inline_boolean_uses_dialect_spelling() {
    let assignment = Assignment::new().set("Flagged", col("Active").eq(false));
    let s = update(ORDERS_QUERY, &assignment);
    assert!(s.sql().contains("SET [Flagged] = [Active] = 0\n"));

    let s = compile_update(
        "SELECT \"o\".\"Id\" FROM \"Orders\" AS \"o\" WHERE \"o\".\"Id\" = :p0",
        &assignment,
        &IgnoreSet::new(),
        &DialectProfile::POSTGRESQL,
    )
    .unwrap();
    assert!(s.sql().contains("SET \"Flagged\" = \"Active\" = FALSE\n"));
}

// ===================================================================
// Dialects
// ===================================================================

#[test]
fn update_per_dialect() {
    let cases = [
        (
            DatabaseKind::SqlServer,
            "SELECT 1 FROM [T] AS [t] WHERE [t].[Id] = @p0",
            "UPDATE [T]\nSET [N] = [N] + 1, [S] = @S_P0\nWHERE [Id] = @p0",
        ),
        (
            DatabaseKind::MySql,
            "SELECT 1 FROM `T` AS `t` WHERE `t`.`Id` = @p0",
            "UPDATE `T`\nSET `N` = `N` + 1, `S` = @S_P0\nWHERE `Id` = @p0",
        ),
        (
            DatabaseKind::PostgreSql,
            "SELECT 1 FROM \"T\" AS t WHERE t.\"Id\" = :p0",
            "UPDATE \"T\"\nSET \"N\" = \"N\" + 1, \"S\" = :S_P0\nWHERE \"Id\" = :p0",
        ),
        (
            DatabaseKind::Oracle,
            "SELECT 1 FROM \"T\" AS \"t\" WHERE \"t\".\"Id\" = :p0",
            "UPDATE \"T\"\nSET \"N\" = \"N\" + 1, \"S\" = :S_P0\nWHERE \"Id\" = :p0",
        ),
    ];
    let assignment = Assignment::new().set("N", col("N") + 1).set("S", "x");
    for (kind, query, expected) in cases {
        let profile = DialectProfile::for_kind(kind);
        let s = compile_update(query, &assignment, &IgnoreSet::new(), &profile).unwrap();
        assert_eq!(s.sql(), expected, "dialect {kind}");
    }
}

// ===================================================================
// Failures
// ===================================================================

#[test]
fn missing_where_is_malformed() {
    let err = update_err(
        "SELECT 1 FROM [Orders] AS [s]",
        &Assignment::new().set("A", 1),
    );
    assert_eq!(
        err,
        CompileError::MalformedQuery(MalformedQuery::MissingKeyword("WHERE"))
    );
    assert_eq!(err.stage(), Stage::Extraction);
}

#[test]
fn unsupported_operator_produces_no_sql() {
    let err = update_err(
        ORDERS_QUERY,
        &Assignment::new().set(
            "Flags",
            ValueExpr::binary(BinaryOp::BitAnd, col("Flags"), 8),
        ),
    );
    assert_eq!(err, CompileError::UnsupportedOperator(BinaryOp::BitAnd));
    assert_eq!(err.stage(), Stage::Rendering);
}

#[test]
fn all_columns_ignored_is_rejected() {
    let assignment = Assignment::new().set("A", 1).set("B", 2);
    let ignore: IgnoreSet = ["a", "b"].into_iter().collect();
    let err = compile_update(ORDERS_QUERY, &assignment, &ignore, &MSSQL).unwrap_err();
    assert_eq!(err, CompileError::EmptyAssignment);
    assert_eq!(err.stage(), Stage::Compilation);
}

#[test]
fn empty_assignment_is_rejected() {
    assert_eq!(
        update_err(ORDERS_QUERY, &Assignment::new()),
        CompileError::EmptyAssignment
    );
}

#[test]
fn non_finite_float_produces_no_sql() {
    let err = update_err(
        ORDERS_QUERY,
        &Assignment::new().set("Total", col("Total") * f64::NAN),
    );
    assert!(matches!(err, CompileError::NonFiniteLiteral(_)));
    assert_eq!(err.stage(), Stage::Rendering);
}
