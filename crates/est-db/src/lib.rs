//! # est-db
//!
//! libSQL database operations for Estima.
//!
//! Handles all relational state: roles, estimate headers, estimate role
//! bindings, tasks, task-role assignments, and settings. Every mutation is a
//! single atomic transaction — an estimate is visible in its entirety or not
//! at all.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;

/// Central database handle for all Estima state operations.
///
/// Wraps a libSQL database and connection. Repository methods live on
/// [`service::EstimateService`].
pub struct EstimateDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl EstimateDb {
    /// Open a local database at the given path (`":memory:"` for tests).
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let est_db = Self { db, conn };
        est_db.run_migrations().await?;
        Ok(est_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> EstimateDb {
        EstimateDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        let tables = [
            "roles",
            "estimates",
            "estimate_roles",
            "estimate_tasks",
            "estimate_task_roles",
            "settings",
        ];
        for table in &tables {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [*table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        // Run migrations again — should not fail
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn settings_seeded_with_target_margin() {
        let db = test_db().await;
        let mut rows = db
            .conn()
            .query(
                "SELECT value FROM settings WHERE key = 'target_margin_percent'",
                (),
            )
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<String>(0).unwrap(), "30");
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let db = test_db().await;
        // Binding pointing at a missing estimate and roles must be rejected.
        let result = db
            .conn()
            .execute(
                "INSERT INTO estimate_roles (estimate_id, sold_role_id, internal_role_id)
                 VALUES (999, 999, 999)",
                (),
            )
            .await;
        assert!(result.is_err(), "FK violation should be rejected");
    }

    #[tokio::test]
    async fn duplicate_assignment_pair_rejected() {
        let db = test_db().await;
        let conn = db.conn();
        conn.execute(
            "INSERT INTO roles (name, internal_rate, charge_out_rate) VALUES ('Dev', '100', '200')",
            (),
        )
        .await
        .unwrap();
        conn.execute(
            "INSERT INTO estimates (project_name, client_name, estimate_type, start_date, duration, duration_unit, currency, created_at)
             VALUES ('P', 'C', 'Fixed Price', '2026-09-01', 1, 'weeks', 'GBP', '2026-08-30T00:00:00+00:00')",
            (),
        )
        .await
        .unwrap();
        conn.execute(
            "INSERT INTO estimate_roles (estimate_id, sold_role_id, internal_role_id) VALUES (1, 1, 1)",
            (),
        )
        .await
        .unwrap();
        conn.execute(
            "INSERT INTO estimate_tasks (estimate_id, description, days) VALUES (1, 'Build', '5')",
            (),
        )
        .await
        .unwrap();

        conn.execute(
            "INSERT INTO estimate_task_roles (task_id, estimate_role_id) VALUES (1, 1)",
            (),
        )
        .await
        .unwrap();
        let dup = conn
            .execute(
                "INSERT INTO estimate_task_roles (task_id, estimate_role_id) VALUES (1, 1)",
                (),
            )
            .await;
        assert!(dup.is_err(), "duplicate (task, binding) pair should be rejected");
    }
}
