use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::Currency;

/// Values supplied by the settings collaborator, consumed read-only by the
/// costing engine and display layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    pub target_margin_percent: Decimal,
    pub default_currency: Currency,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_margin_percent: Decimal::from(30),
            default_currency: Currency::Gbp,
        }
    }
}
