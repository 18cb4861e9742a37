#![allow(dead_code)]

use oxide_bulk_core::{
    compile_delete, compile_update, Assignment, CompileError, CompiledStatement, DialectProfile,
    IgnoreSet,
};

pub const MSSQL: DialectProfile = DialectProfile::SQL_SERVER;

/// A planner-style query with a declaration preamble.
pub const ORDERS_QUERY: &str = "DECLARE @p0 int = 42;\r\n\r\nSELECT [s].[Id], [s].[Count]\r\nFROM [Orders] AS [s]\r\nWHERE [s].[Id] = @p0";

pub fn update(sql: &str, assignment: &Assignment) -> CompiledStatement {
    compile_update(sql, assignment, &IgnoreSet::new(), &MSSQL)
        .unwrap_or_else(|e| panic!("Failed to compile UPDATE: {sql}\nError: {e:?}"))
}

pub fn update_ignoring(sql: &str, assignment: &Assignment, ignore: &[&str]) -> CompiledStatement {
    let ignore: IgnoreSet = ignore.iter().copied().collect();
    compile_update(sql, assignment, &ignore, &MSSQL)
        .unwrap_or_else(|e| panic!("Failed to compile UPDATE: {sql}\nError: {e:?}"))
}

pub fn update_err(sql: &str, assignment: &Assignment) -> CompileError {
    compile_update(sql, assignment, &IgnoreSet::new(), &MSSQL)
        .expect_err(&format!("Expected compile error for: {sql}"))
}

pub fn delete(sql: &str) -> CompiledStatement {
    compile_delete(sql, &MSSQL)
        .unwrap_or_else(|e| panic!("Failed to compile DELETE: {sql}\nError: {e:?}"))
}

pub fn delete_err(sql: &str) -> CompileError {
    compile_delete(sql, &MSSQL).expect_err(&format!("Expected compile error for: {sql}"))
}
