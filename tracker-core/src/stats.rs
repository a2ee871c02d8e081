//! Stat arithmetic.
//!
//! Every stat-modifying action (hit points, armor, mana) funnels through
//! [`calculate_new_value`]. It is pure and total: any combination of inputs
//! produces a value, and the zero floor always holds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a modification combines with the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatOperation {
    /// Replace the value outright.
    Set,
    /// Add to the value.
    Increase,
    /// Subtract from the value.
    Decrease,
}

impl StatOperation {
    pub fn name(&self) -> &'static str {
        match self {
            StatOperation::Set => "set",
            StatOperation::Increase => "increase",
            StatOperation::Decrease => "decrease",
        }
    }

    /// Past-tense verb used in history descriptions.
    pub fn verb(&self) -> &'static str {
        match self {
            StatOperation::Set => "Set",
            StatOperation::Increase => "Increased",
            StatOperation::Decrease => "Decreased",
        }
    }

    pub fn all() -> [StatOperation; 3] {
        [
            StatOperation::Set,
            StatOperation::Increase,
            StatOperation::Decrease,
        ]
    }
}

impl fmt::Display for StatOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// `percent`% of `max`, rounded down.
pub fn percentage_of(max: u32, percent: u32) -> u32 {
    let value = u64::from(max) * u64::from(percent) / 100;
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Compute a stat's new value.
///
/// With `is_percentage`, `amount` is read as a percentage of `max`. The result
/// never drops below zero; it is capped at `max` unless `exceed_max` is set.
pub fn calculate_new_value(
    operation: StatOperation,
    current: u32,
    amount: u32,
    max: u32,
    is_percentage: bool,
    exceed_max: bool,
) -> u32 {
    let resolved = if is_percentage {
        i64::from(percentage_of(max, amount))
    } else {
        i64::from(amount)
    };
    let current = i64::from(current);

    let raw = match operation {
        StatOperation::Set => resolved,
        StatOperation::Increase => current + resolved,
        StatOperation::Decrease => current - resolved,
    };

    let floored = raw.max(0);
    let clamped = if exceed_max {
        floored
    } else {
        floored.min(i64::from(max))
    };

    u32::try_from(clamped).unwrap_or(u32::MAX)
}
