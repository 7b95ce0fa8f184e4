//! The costing engine: pure, deterministic, side-effect-free.
//!
//! Consumes a resolved entity graph (role rates already fetched into
//! [`TaskView`] rate lines) and produces per-task and aggregate cost,
//! revenue, and margin figures. All arithmetic is `Decimal`; percentages are
//! never rounded here — rounding is a display concern, and rounding inside
//! the engine would compound error across tasks.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::TaskView;
use crate::enums::DurationUnit;

/// Derived figures for one task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskFigures {
    pub cost: Decimal,
    pub revenue: Decimal,
    pub margin_percent: Decimal,
}

/// Derived figures for a whole estimate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct EstimateFigures {
    pub total_cost: Decimal,
    pub total_revenue: Decimal,
    pub margin_percent: Decimal,
    /// True when the estimate margin is below the target margin percent.
    pub is_low_margin: bool,
}

/// `(revenue - cost) / revenue * 100`, with zero revenue mapping to exactly
/// zero — never NaN, never an error.
#[must_use]
pub fn margin_percent(cost: Decimal, revenue: Decimal) -> Decimal {
    if revenue > Decimal::ZERO {
        (revenue - cost) / revenue * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    }
}

/// Cost, revenue, and margin for one task.
///
/// Each rate line contributes `days x internal_rate` to cost and
/// `days x charge_out_rate` to revenue — `days` applies in full to every
/// bound role, it is not split between them.
#[must_use]
pub fn task_figures(task: &TaskView) -> TaskFigures {
    let mut cost = Decimal::ZERO;
    let mut revenue = Decimal::ZERO;
    for line in &task.rates {
        cost += task.days * line.internal_rate;
        revenue += task.days * line.charge_out_rate;
    }
    TaskFigures {
        cost,
        revenue,
        margin_percent: margin_percent(cost, revenue),
    }
}

/// Aggregate figures over all tasks of an estimate.
///
/// Totals are sums of unrounded task figures, so
/// `total_cost == sum(task cost)` holds exactly.
#[must_use]
pub fn estimate_figures(tasks: &[TaskView], target_margin_percent: Decimal) -> EstimateFigures {
    let mut total_cost = Decimal::ZERO;
    let mut total_revenue = Decimal::ZERO;
    for task in tasks {
        let figures = task_figures(task);
        total_cost += figures.cost;
        total_revenue += figures.revenue;
    }
    let margin = margin_percent(total_cost, total_revenue);
    EstimateFigures {
        total_cost,
        total_revenue,
        margin_percent: margin,
        is_low_margin: margin < target_margin_percent,
    }
}

/// Approximate working days for a project duration: days x1, weeks x5,
/// months x21.
///
/// Informational only — task day totals are never validated against it.
#[must_use]
pub const fn working_days(duration: i64, unit: DurationUnit) -> i64 {
    duration * unit.working_days_multiplier()
}
