//! Estimate transaction manager — atomic commit, full-tree reads, cascading
//! delete.
//!
//! A draft moves `Building -> Committing -> {Committed | RolledBack}`: the
//! `Building` state lives entirely in `est_core::draft::EstimateDraft`;
//! `create_estimate` is the `Committing` step. Commit order matters —
//! bindings must be inserted (and their generated ids captured) before any
//! task assignment can reference them. The ref → rowid map is built in slot
//! order during the single commit routine and threaded through the task
//! inserts.

use std::collections::HashMap;

use chrono::Utc;

use est_core::costing::{self, EstimateFigures};
use est_core::draft::EstimateDraft;
use est_core::entities::{BindingView, Estimate, EstimateView, RateLine, TaskView};
use est_core::errors::CoreError;

use crate::error::{DatabaseError, classify_delete};
use crate::helpers::{parse_date, parse_datetime, parse_decimal, parse_enum};
use crate::service::EstimateService;

const ESTIMATE_COLS: &str =
    "id, project_name, client_name, estimate_type, start_date, duration, duration_unit, currency, created_at";

fn row_to_estimate(row: &libsql::Row) -> Result<Estimate, DatabaseError> {
    Ok(Estimate {
        id: row.get(0)?,
        project_name: row.get(1)?,
        client_name: row.get(2)?,
        estimate_type: parse_enum(&row.get::<String>(3)?)?,
        start_date: parse_date(&row.get::<String>(4)?)?,
        duration: row.get(5)?,
        duration_unit: parse_enum(&row.get::<String>(6)?)?,
        currency: parse_enum(&row.get::<String>(7)?)?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

fn row_to_rate_line(row: &libsql::Row, offset: i32) -> Result<RateLine, DatabaseError> {
    Ok(RateLine {
        sold_role_name: row.get(offset)?,
        charge_out_rate: parse_decimal(&row.get::<String>(offset + 1)?)?,
        internal_role_name: row.get(offset + 2)?,
        internal_rate: parse_decimal(&row.get::<String>(offset + 3)?)?,
    })
}

impl EstimateService {
    /// Commit a draft: one atomic transaction inserting the header, every
    /// binding, every task, and every task-role assignment — or nothing.
    ///
    /// Returns the generated estimate id.
    ///
    /// # Errors
    ///
    /// `UnknownRole` if a binding references a role id that does not exist
    /// at transaction time; any storage failure rolls the whole transaction
    /// back before it is reported.
    pub async fn create_estimate(&self, draft: &EstimateDraft) -> Result<i64, DatabaseError> {
        let tx = self.db().conn().transaction().await?;
        match Self::insert_estimate_tree(&tx, draft).await {
            Ok(id) => {
                tx.commit().await?;
                tracing::info!(id, project = %draft.header().project_name, "estimate committed");
                Ok(id)
            }
            Err(e) => {
                tracing::warn!(error = %e, "estimate creation rolled back");
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(error = %rollback_err, "rollback failed");
                }
                Err(e)
            }
        }
    }

    async fn insert_estimate_tree(
        tx: &libsql::Transaction,
        draft: &EstimateDraft,
    ) -> Result<i64, DatabaseError> {
        // Both sides of every binding must exist at transaction time. The FK
        // constraints back this up, but checking here names the missing id.
        for role_id in draft.referenced_role_ids() {
            let mut rows = tx
                .query("SELECT 1 FROM roles WHERE id = ?1", [role_id])
                .await?;
            if rows.next().await?.is_none() {
                return Err(DatabaseError::UnknownRole(role_id));
            }
        }

        let header = draft.header();
        tx.execute(
            "INSERT INTO estimates
                 (project_name, client_name, estimate_type, start_date,
                  duration, duration_unit, currency, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            libsql::params![
                header.project_name.as_str(),
                header.client_name.as_str(),
                header.estimate_type.as_str(),
                header.start_date.to_string(),
                header.duration,
                header.duration_unit.as_str(),
                header.currency.as_str(),
                Utc::now().to_rfc3339()
            ],
        )
        .await?;
        let estimate_id = tx.last_insert_rowid();

        // Bindings in slot order, capturing generated ids: tasks reference
        // bindings by slot, so this map must be complete before any task row.
        let mut binding_ids: HashMap<usize, i64> = HashMap::new();
        for (binding_ref, binding) in draft.bindings() {
            tx.execute(
                "INSERT INTO estimate_roles (estimate_id, sold_role_id, internal_role_id)
                 VALUES (?1, ?2, ?3)",
                libsql::params![estimate_id, binding.sold_role_id, binding.internal_role_id],
            )
            .await?;
            binding_ids.insert(binding_ref.index(), tx.last_insert_rowid());
        }

        for (_, task) in draft.tasks() {
            if task.bindings.is_empty() {
                tracing::warn!(
                    description = %task.description,
                    "committing task with no role bindings"
                );
            }
            tx.execute(
                "INSERT INTO estimate_tasks (estimate_id, description, days)
                 VALUES (?1, ?2, ?3)",
                libsql::params![estimate_id, task.description.as_str(), task.days.to_string()],
            )
            .await?;
            let task_id = tx.last_insert_rowid();

            for binding_ref in &task.bindings {
                let estimate_role_id = binding_ids
                    .get(&binding_ref.index())
                    .copied()
                    .ok_or(CoreError::UnknownReference {
                        kind: "binding",
                        index: binding_ref.index(),
                    })?;
                tx.execute(
                    "INSERT INTO estimate_task_roles (task_id, estimate_role_id)
                     VALUES (?1, ?2)",
                    libsql::params![task_id, estimate_role_id],
                )
                .await?;
            }
        }

        Ok(estimate_id)
    }

    /// Fetch one estimate in full: header, bindings, and tasks with rate
    /// lines resolved against *current* role rates.
    ///
    /// # Errors
    ///
    /// `NotFound` if the estimate does not exist.
    pub async fn get_estimate(&self, id: i64) -> Result<EstimateView, DatabaseError> {
        let conn = self.db().conn();

        let mut rows = conn
            .query(
                &format!("SELECT {ESTIMATE_COLS} FROM estimates WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NotFound {
            entity: "estimate",
            id,
        })?;
        let estimate = row_to_estimate(&row)?;

        let mut bindings = Vec::new();
        let mut rows = conn
            .query(
                "SELECT er.id, er.sold_role_id, er.internal_role_id,
                        sold.name, sold.charge_out_rate,
                        internal.name, internal.internal_rate
                 FROM estimate_roles er
                 JOIN roles sold ON er.sold_role_id = sold.id
                 JOIN roles internal ON er.internal_role_id = internal.id
                 WHERE er.estimate_id = ?1
                 ORDER BY er.id",
                [id],
            )
            .await?;
        while let Some(row) = rows.next().await? {
            bindings.push(BindingView {
                id: row.get(0)?,
                sold_role_id: row.get(1)?,
                internal_role_id: row.get(2)?,
                rate: row_to_rate_line(&row, 3)?,
            });
        }

        // Tasks in insertion order (rowid order), rate lines joined after.
        let mut tasks = Vec::new();
        let mut rows = conn
            .query(
                "SELECT id, description, days FROM estimate_tasks
                 WHERE estimate_id = ?1 ORDER BY id",
                [id],
            )
            .await?;
        while let Some(row) = rows.next().await? {
            tasks.push(TaskView {
                id: row.get(0)?,
                description: row.get(1)?,
                days: parse_decimal(&row.get::<String>(2)?)?,
                rates: Vec::new(),
            });
        }

        let mut rows = conn
            .query(
                "SELECT etr.task_id,
                        sold.name, sold.charge_out_rate,
                        internal.name, internal.internal_rate
                 FROM estimate_task_roles etr
                 JOIN estimate_roles er ON etr.estimate_role_id = er.id
                 JOIN roles sold ON er.sold_role_id = sold.id
                 JOIN roles internal ON er.internal_role_id = internal.id
                 WHERE er.estimate_id = ?1
                 ORDER BY etr.task_id, etr.id",
                [id],
            )
            .await?;
        while let Some(row) = rows.next().await? {
            let task_id: i64 = row.get(0)?;
            let line = row_to_rate_line(&row, 1)?;
            if let Some(task) = tasks.iter_mut().find(|t| t.id == task_id) {
                task.rates.push(line);
            }
        }

        Ok(EstimateView {
            estimate,
            bindings,
            tasks,
        })
    }

    /// Fetch an estimate together with its derived figures, computed against
    /// the stored target margin.
    ///
    /// # Errors
    ///
    /// `NotFound` if the estimate does not exist.
    pub async fn get_estimate_with_figures(
        &self,
        id: i64,
    ) -> Result<(EstimateView, EstimateFigures), DatabaseError> {
        let view = self.get_estimate(id).await?;
        let settings = self.get_settings().await?;
        let figures = costing::estimate_figures(&view.tasks, settings.target_margin_percent);
        Ok((view, figures))
    }

    /// Estimate headers, newest first. `search` filters by project or client
    /// name substring (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_estimates(
        &self,
        search: Option<&str>,
    ) -> Result<Vec<Estimate>, DatabaseError> {
        let conn = self.db().conn();
        let mut rows = match search {
            Some(term) => {
                let pattern = format!("%{term}%");
                conn.query(
                    &format!(
                        "SELECT {ESTIMATE_COLS} FROM estimates
                         WHERE project_name LIKE ?1 OR client_name LIKE ?1
                         ORDER BY created_at DESC, id DESC"
                    ),
                    [pattern.as_str()],
                )
                .await?
            }
            None => {
                conn.query(
                    &format!(
                        "SELECT {ESTIMATE_COLS} FROM estimates
                         ORDER BY created_at DESC, id DESC"
                    ),
                    (),
                )
                .await?
            }
        };

        let mut estimates = Vec::new();
        while let Some(row) = rows.next().await? {
            estimates.push(row_to_estimate(&row)?);
        }
        Ok(estimates)
    }

    /// Delete an estimate and its whole tree in one transaction.
    ///
    /// Deletes walk the dependency order explicitly — assignments, then
    /// tasks, then bindings, then the header — so behavior does not depend
    /// on storage-engine cascade support.
    ///
    /// # Errors
    ///
    /// `NotFound` if the estimate does not exist; `ReferentialConflict` if
    /// the store rejects a delete step; nothing is deleted on failure.
    pub async fn delete_estimate(&self, id: i64) -> Result<(), DatabaseError> {
        let tx = self.db().conn().transaction().await?;
        match Self::delete_estimate_tree(&tx, id).await {
            Ok(()) => {
                tx.commit().await?;
                tracing::info!(id, "estimate deleted");
                Ok(())
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(error = %rollback_err, "rollback failed");
                }
                Err(e)
            }
        }
    }

    async fn delete_estimate_tree(
        tx: &libsql::Transaction,
        id: i64,
    ) -> Result<(), DatabaseError> {
        let mut rows = tx
            .query("SELECT 1 FROM estimates WHERE id = ?1", [id])
            .await?;
        if rows.next().await?.is_none() {
            return Err(DatabaseError::NotFound {
                entity: "estimate",
                id,
            });
        }

        tx.execute(
            "DELETE FROM estimate_task_roles
             WHERE task_id IN (SELECT id FROM estimate_tasks WHERE estimate_id = ?1)",
            [id],
        )
        .await
        .map_err(|e| classify_delete(e, format!("assignments of estimate {id}")))?;
        tx.execute("DELETE FROM estimate_tasks WHERE estimate_id = ?1", [id])
            .await
            .map_err(|e| classify_delete(e, format!("tasks of estimate {id}")))?;
        tx.execute("DELETE FROM estimate_roles WHERE estimate_id = ?1", [id])
            .await
            .map_err(|e| classify_delete(e, format!("bindings of estimate {id}")))?;
        tx.execute("DELETE FROM estimates WHERE id = ?1", [id])
            .await
            .map_err(|e| classify_delete(e, format!("estimate {id}")))?;
        Ok(())
    }

    /// Informational working-day figure for an estimate header.
    ///
    /// # Errors
    ///
    /// `NotFound` if the estimate does not exist.
    pub async fn estimate_working_days(&self, id: i64) -> Result<i64, DatabaseError> {
        let view = self.get_estimate(id).await?;
        Ok(costing::working_days(
            view.estimate.duration,
            view.estimate.duration_unit,
        ))
    }

    /// Count of rows in every estimate-owned table, used by atomicity tests.
    #[cfg(test)]
    pub(crate) async fn tree_row_counts(&self) -> Result<(i64, i64, i64, i64), DatabaseError> {
        let conn = self.db().conn();
        let mut counts = [0i64; 4];
        for (i, table) in [
            "estimates",
            "estimate_roles",
            "estimate_tasks",
            "estimate_task_roles",
        ]
        .iter()
        .enumerate()
        {
            let mut rows = conn
                .query(&format!("SELECT COUNT(*) FROM {table}"), ())
                .await?;
            counts[i] = rows
                .next()
                .await?
                .ok_or_else(|| DatabaseError::Query("COUNT returned no row".into()))?
                .get(0)?;
        }
        Ok((counts[0], counts[1], counts[2], counts[3]))
    }
}
