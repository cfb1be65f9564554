use super::member::MemberId;
use super::money::Amount;
use super::period::Period;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a payment is judged against the group's monthly due amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuePolicy {
    /// Compare against the due amount in force when the payment was recorded.
    #[default]
    Snapshot,
    /// Compare against the group's current due amount, so a rate change can
    /// reopen historical periods.
    Current,
}

/// The single contribution a member has made for one period.
///
/// Keyed by `(member_id, period)`; writing the same key again replaces the
/// record.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PaymentRecord {
    pub member_id: MemberId,
    pub period: Period,
    pub amount: Amount,
    /// Group due amount at the time of recording.
    pub due_at_payment: Amount,
    pub note: String,
    pub paid_at: DateTime<Utc>,
}

impl PaymentRecord {
    pub fn key(&self) -> (&MemberId, Period) {
        (&self.member_id, self.period)
    }

    /// Whether this payment covers its period in full.
    pub fn satisfies(&self, policy: DuePolicy, current_due: Amount) -> bool {
        let due: Decimal = match policy {
            DuePolicy::Snapshot => self.due_at_payment.into(),
            DuePolicy::Current => current_due.into(),
        };
        self.amount.value() >= due
    }
}

/// Whether an upsert inserted a new record or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    Created,
    Updated,
}
