//! Role registry — create, list, delete-if-unreferenced.

use rust_decimal::Decimal;

use est_core::entities::Role;
use est_core::errors::CoreError;

use crate::error::{DatabaseError, classify_role_insert};
use crate::helpers::parse_decimal;
use crate::service::EstimateService;

const SELECT_COLS: &str = "id, name, internal_rate, charge_out_rate";

fn row_to_role(row: &libsql::Row) -> Result<Role, DatabaseError> {
    Ok(Role {
        id: row.get(0)?,
        name: row.get(1)?,
        internal_rate: parse_decimal(&row.get::<String>(2)?)?,
        charge_out_rate: parse_decimal(&row.get::<String>(3)?)?,
    })
}

impl EstimateService {
    /// Register a billable role.
    ///
    /// # Errors
    ///
    /// `DuplicateName` if the name already exists (case-sensitive exact
    /// match), `CoreError::InvalidRate` via `Core` if a rate is negative,
    /// `CoreError::Validation` if the name is blank.
    pub async fn create_role(
        &self,
        name: &str,
        internal_rate: Decimal,
        charge_out_rate: Decimal,
    ) -> Result<Role, DatabaseError> {
        if name.trim().is_empty() {
            return Err(CoreError::Validation("role name is required".into()).into());
        }
        if internal_rate < Decimal::ZERO {
            return Err(CoreError::InvalidRate {
                field: "internal_rate",
                value: internal_rate,
            }
            .into());
        }
        if charge_out_rate < Decimal::ZERO {
            return Err(CoreError::InvalidRate {
                field: "charge_out_rate",
                value: charge_out_rate,
            }
            .into());
        }

        self.db()
            .conn()
            .execute(
                "INSERT INTO roles (name, internal_rate, charge_out_rate) VALUES (?1, ?2, ?3)",
                libsql::params![
                    name,
                    internal_rate.to_string(),
                    charge_out_rate.to_string()
                ],
            )
            .await
            .map_err(|e| classify_role_insert(e, name))?;
        let id = self.db().conn().last_insert_rowid();

        tracing::debug!(id, name, "role created");
        Ok(Role {
            id,
            name: name.to_string(),
            internal_rate,
            charge_out_rate,
        })
    }

    /// All roles, ordered by name ascending with case-insensitive collation.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_roles(&self) -> Result<Vec<Role>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM roles ORDER BY name COLLATE NOCASE ASC"),
                (),
            )
            .await?;

        let mut roles = Vec::new();
        while let Some(row) = rows.next().await? {
            roles.push(row_to_role(&row)?);
        }
        Ok(roles)
    }

    /// Fetch one role by id.
    ///
    /// # Errors
    ///
    /// `NotFound` if the role does not exist.
    pub async fn get_role(&self, id: i64) -> Result<Role, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM roles WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or(DatabaseError::NotFound { entity: "role", id })?;
        row_to_role(&row)
    }

    /// Delete a role. Allowed only while nothing references it.
    ///
    /// # Errors
    ///
    /// `ReferentialConflict` if any estimate role binding references the
    /// role (as sold or internal side), `NotFound` if it does not exist.
    pub async fn delete_role(&self, id: i64) -> Result<(), DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT COUNT(*) FROM estimate_roles
                 WHERE sold_role_id = ?1 OR internal_role_id = ?1",
                [id],
            )
            .await?;
        let count: i64 = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::Query("COUNT returned no row".into()))?
            .get(0)?;
        if count > 0 {
            return Err(DatabaseError::ReferentialConflict(format!(
                "role {id} is referenced by {count} estimate role binding(s)"
            )));
        }

        let affected = self
            .db()
            .conn()
            .execute("DELETE FROM roles WHERE id = ?1", [id])
            .await?;
        if affected == 0 {
            return Err(DatabaseError::NotFound { entity: "role", id });
        }
        tracing::debug!(id, "role deleted");
        Ok(())
    }
}
