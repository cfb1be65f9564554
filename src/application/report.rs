use crate::domain::member::{Member, MemberId};
use crate::domain::payment::PaymentRecord;
use crate::domain::period::Period;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// Number of latest contributions carried by a collection report.
pub const RECENT_CONTRIBUTIONS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// No outstanding periods.
    UpToDate,
    /// Outstanding periods, but something has been paid.
    PartiallyPaid,
    /// Outstanding periods and nothing paid at all.
    NotPaid,
}

impl PaymentStatus {
    pub fn classify(outstanding: usize, paid: Decimal) -> Self {
        if outstanding == 0 {
            PaymentStatus::UpToDate
        } else if paid > Decimal::ZERO {
            PaymentStatus::PartiallyPaid
        } else {
            PaymentStatus::NotPaid
        }
    }
}

/// One row of the collection report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberStanding {
    pub member_id: MemberId,
    pub full_name: String,
    pub paid: Decimal,
    pub unpaid_months: usize,
    pub status: PaymentStatus,
}

/// Group-wide collection figures for the active members.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionReport {
    pub as_of: NaiveDate,
    pub group_name: String,
    pub monthly_due: Decimal,
    pub total_members: usize,
    /// Sum of every recorded contribution, inactive members included.
    pub total_collected: Decimal,
    /// Active members times one month's due amount.
    pub total_expected: Decimal,
    pub fully_paid: usize,
    pub partially_paid: usize,
    pub not_paid: usize,
    /// Percentage, rounded to two places; zero when nothing is expected.
    pub collection_rate: Decimal,
    pub members: Vec<MemberStanding>,
    /// Latest contributions, newest period first.
    pub recent_contributions: Vec<PaymentRecord>,
}

/// A single member's payment history.
#[derive(Debug, Clone, Serialize)]
pub struct MemberStatement {
    pub member: Member,
    /// Newest period first.
    pub contributions: Vec<PaymentRecord>,
    pub total_paid: Decimal,
    pub months_paid: usize,
    pub monthly_due: Decimal,
    /// `months_paid * monthly_due`.
    pub expected_payment: Decimal,
    pub outstanding: Vec<Period>,
}

pub(crate) fn collection_rate(collected: Decimal, expected: Decimal) -> Decimal {
    if expected > Decimal::ZERO {
        (collected / expected * Decimal::ONE_HUNDRED).round_dp(2)
    } else {
        Decimal::ZERO
    }
}

pub(crate) fn newest_first(payments: &mut [PaymentRecord]) {
    payments.sort_by(|a, b| b.period.cmp(&a.period).then(b.paid_at.cmp(&a.paid_at)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_classify_status() {
        assert_eq!(PaymentStatus::classify(0, dec!(0)), PaymentStatus::UpToDate);
        assert_eq!(PaymentStatus::classify(2, dec!(100)), PaymentStatus::PartiallyPaid);
        assert_eq!(PaymentStatus::classify(2, dec!(0)), PaymentStatus::NotPaid);
    }

    #[test]
    fn test_collection_rate() {
        assert_eq!(collection_rate(dec!(10000), dec!(15000)), dec!(66.67));
        assert_eq!(collection_rate(dec!(10000), dec!(0)), dec!(0));
    }
}
