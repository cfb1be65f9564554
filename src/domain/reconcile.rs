//! Derivation of a member's unpaid billing periods.

use super::member::Member;
use super::money::Amount;
use super::payment::{DuePolicy, PaymentRecord};
use super::period::Period;
use chrono::NaiveDate;
use std::collections::HashSet;

/// Returns, in ascending order, every period from the member's enrollment
/// month through the `as_of` month (inclusive) that has no satisfying payment.
///
/// `payments` may contain records of other members; they are ignored. An
/// enrollment date after `as_of` yields an empty result.
pub fn outstanding_periods(
    member: &Member,
    payments: &[PaymentRecord],
    current_due: Amount,
    policy: DuePolicy,
    as_of: NaiveDate,
) -> Vec<Period> {
    let satisfied: HashSet<Period> = payments
        .iter()
        .filter(|p| p.member_id == member.id && p.satisfies(policy, current_due))
        .map(|p| p.period)
        .collect();

    Period::range_inclusive(
        Period::containing(member.enrollment_date),
        Period::containing(as_of),
    )
    .filter(|period| !satisfied.contains(period))
    .collect()
}
