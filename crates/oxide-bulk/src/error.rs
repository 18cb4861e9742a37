//! Error types for statement execution.

use oxide_bulk_core::CompileError;

/// Errors that can occur while compiling or executing bulk statements.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// The statement could not be compiled.
    #[error("Compile error ({}): {}", .0.stage(), .0)]
    Compile(#[from] CompileError),

    /// Database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error (reading request files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Request file could not be parsed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A shard route is not of the form `old:new`.
    #[error("Invalid shard route '{0}', expected OLD:NEW")]
    InvalidShardRoute(String),
}

/// Result type for execution.
pub type Result<T> = std::result::Result<T, ExecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_error_names_stage() {
        let err = ExecError::from(CompileError::UnsupportedDialect("sqlite".into()));
        assert_eq!(
            err.to_string(),
            "Compile error (dialect): unsupported dialect: sqlite"
        );
    }

    #[test]
    fn test_invalid_route_message() {
        let err = ExecError::InvalidShardRoute("Orders".into());
        assert_eq!(
            err.to_string(),
            "Invalid shard route 'Orders', expected OLD:NEW"
        );
    }
}
