//! Greedy distribution of a lump sum across outstanding periods.

use super::money::Amount;
use super::period::Period;
use rust_decimal::Decimal;
use serde::Serialize;

/// What a distribution did with the money it was given.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationResult {
    /// The lump sum that was distributed.
    pub total: Decimal,
    /// Periods paid in full, earliest first.
    pub periods_filled: Vec<Period>,
    /// Funds that could not cover the next outstanding period.
    pub remainder: Decimal,
}

impl AllocationResult {
    pub fn filled_count(&self) -> usize {
        self.periods_filled.len()
    }
}

/// Fills `outstanding` (ascending) with exactly `due` each, earliest first,
/// until the remaining funds no longer cover a whole period. The walk stops at
/// the first period it cannot fill; later periods are never skipped to.
pub fn allocate(outstanding: &[Period], due: Amount, total: Amount) -> AllocationResult {
    let due = due.value();
    let mut remaining = total.value();
    let mut periods_filled = Vec::new();

    for period in outstanding {
        if remaining < due {
            break;
        }
        remaining -= due;
        periods_filled.push(*period);
    }

    AllocationResult {
        total: total.value(),
        periods_filled,
        remainder: remaining,
    }
}
