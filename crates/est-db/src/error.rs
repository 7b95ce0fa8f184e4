//! Database error types for est-db.
//!
//! The taxonomy separates caller faults (`DuplicateName`, `UnknownRole`,
//! `ReferentialConflict`, wrapped `CoreError` validation) from storage faults
//! (`LibSql`, `Query`, `Migration`). Storage faults are safe to retry as a
//! whole request — every mutation is a single atomic transaction.

use est_core::errors::CoreError;
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or returned malformed data.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Entity lookup returned no result.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// Role name collision on create.
    #[error("Role name already exists: {0}")]
    DuplicateName(String),

    /// A binding references a role id that does not exist.
    #[error("Unknown role id: {0}")]
    UnknownRole(i64),

    /// Delete blocked by existing dependents.
    #[error("Delete blocked by existing references: {0}")]
    ReferentialConflict(String),

    /// Draft validation or reference error surfaced at the storage boundary.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Underlying libSQL error (transient/infra; retry the whole request).
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Whether a libSQL error is a foreign key constraint violation.
pub(crate) fn is_foreign_key_violation(err: &libsql::Error) -> bool {
    err.to_string().contains("FOREIGN KEY constraint failed")
}

/// Classify a role-insert failure: a UNIQUE violation on the name column
/// becomes `DuplicateName`, anything else passes through.
pub(crate) fn classify_role_insert(err: libsql::Error, name: &str) -> DatabaseError {
    if err.to_string().contains("UNIQUE constraint failed: roles.name") {
        DatabaseError::DuplicateName(name.to_string())
    } else {
        err.into()
    }
}

/// Classify a delete failure: a foreign key rejection means dependents still
/// exist, anything else passes through.
pub(crate) fn classify_delete(err: libsql::Error, what: String) -> DatabaseError {
    if is_foreign_key_violation(&err) {
        DatabaseError::ReferentialConflict(what)
    } else {
        err.into()
    }
}
