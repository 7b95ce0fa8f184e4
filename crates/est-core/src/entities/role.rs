use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A billable role: a unique name plus an internal cost rate and an external
/// charge-out rate, both per day.
///
/// Rates are read live wherever a role is referenced — bindings store the
/// role id, never a rate value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub internal_rate: Decimal,
    pub charge_out_rate: Decimal,
}
