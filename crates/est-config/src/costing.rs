//! Costing defaults configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

fn default_target_margin() -> Decimal {
    Decimal::from(30)
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CostingConfig {
    /// Fallback target margin percent, used when the settings store has no
    /// value. The stored setting always wins.
    #[serde(default = "default_target_margin")]
    pub target_margin_percent: Decimal,
}

impl Default for CostingConfig {
    fn default() -> Self {
        Self {
            target_margin_percent: default_target_margin(),
        }
    }
}
