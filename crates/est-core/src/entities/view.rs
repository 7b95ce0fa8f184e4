//! Read-side tree for one estimate, reconstructed by the fetch join
//! (task → binding → sold role / internal role).
//!
//! Rates in a view are *current* role rates at read time, not values captured
//! at creation; the costing engine consumes this tree directly.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Estimate;

/// The resolved rate pair behind one binding: names plus the two live rates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateLine {
    pub sold_role_name: String,
    pub charge_out_rate: Decimal,
    pub internal_role_name: String,
    pub internal_rate: Decimal,
}

/// One binding of an estimate with its role references resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BindingView {
    pub id: i64,
    pub sold_role_id: i64,
    pub internal_role_id: i64,
    pub rate: RateLine,
}

/// One task with the rate lines of every binding assigned to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskView {
    pub id: i64,
    pub description: String,
    pub days: Decimal,
    pub rates: Vec<RateLine>,
}

/// A committed estimate in full: header, bindings, and tasks in insertion
/// order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EstimateView {
    pub estimate: Estimate,
    pub bindings: Vec<BindingView>,
    pub tasks: Vec<TaskView>,
}
