//! Wire enums for estimates: pricing type, duration unit, currency.
//!
//! Serde renames match the strings the original form wizard submits and the
//! database stores ("Fixed Price", "weeks", "GBP"), so `as_str` values can be
//! written to SQL columns and parsed back via serde.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// EstimateType
// ---------------------------------------------------------------------------

/// Commercial model of an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EstimateType {
    #[serde(rename = "Fixed Price")]
    FixedPrice,
    #[serde(rename = "Time and Materials")]
    TimeAndMaterials,
}

impl EstimateType {
    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FixedPrice => "Fixed Price",
            Self::TimeAndMaterials => "Time and Materials",
        }
    }
}

impl fmt::Display for EstimateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DurationUnit
// ---------------------------------------------------------------------------

/// Unit of the project duration figure on an estimate header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    Days,
    Weeks,
    Months,
}

impl DurationUnit {
    /// Approximate working days per unit (months are not calendar-aware).
    #[must_use]
    pub const fn working_days_multiplier(self) -> i64 {
        match self {
            Self::Days => 1,
            Self::Weeks => 5,
            Self::Months => 21,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Days => "days",
            Self::Weeks => "weeks",
            Self::Months => "months",
        }
    }
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Currency
// ---------------------------------------------------------------------------

/// Display currency of an estimate. No conversion — purely a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "GBP")]
    Gbp,
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
}

impl Currency {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gbp => "GBP",
            Self::Usd => "USD",
            Self::Eur => "EUR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
