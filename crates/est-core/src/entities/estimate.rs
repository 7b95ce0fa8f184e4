use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{Currency, DurationUnit, EstimateType};

/// The immutable header of a committed estimate. Owns its bindings and tasks;
/// deleting an estimate cascades to the whole tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Estimate {
    pub id: i64,
    pub project_name: String,
    pub client_name: String,
    pub estimate_type: EstimateType,
    pub start_date: NaiveDate,
    pub duration: i64,
    pub duration_unit: DurationUnit,
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
}
