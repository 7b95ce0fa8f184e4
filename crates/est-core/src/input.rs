//! The client-submitted estimate document.
//!
//! Produced by the (out-of-scope) UI wizard; field names are camelCase on the
//! wire. Validation happens in [`crate::draft::EstimateDraft::from_input`],
//! not here — deserialization only shapes the data.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::{Currency, DurationUnit, EstimateType};

/// One estimate creation request as submitted by the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InputDocument {
    pub project_name: String,
    pub client_name: String,
    #[serde(rename = "type")]
    pub estimate_type: EstimateType,
    pub start_date: NaiveDate,
    pub duration: i64,
    /// Defaults to weeks when the client omits it.
    #[serde(default)]
    pub duration_unit: Option<DurationUnit>,
    /// Defaults to the configured default currency when omitted.
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub project_roles: Vec<ProjectRoleInput>,
    #[serde(default)]
    pub tasks: Vec<TaskInput>,
}

/// A sold-role entry; `internal_role_id` omitted means "no cost remap".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRoleInput {
    #[serde(rename = "roleId")]
    pub sold_role_id: i64,
    #[serde(default)]
    pub internal_role_id: Option<i64>,
}

/// A task entry; `role_indices` index into the enclosing document's
/// `project_roles` array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    pub description: String,
    pub days: Decimal,
    #[serde(default, alias = "projectRoleIndices")]
    pub role_indices: Vec<usize>,
}
