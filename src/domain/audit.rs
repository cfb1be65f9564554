use super::member::MemberId;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LedgerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditKind {
    AddContribution,
    BulkPayment,
}

impl fmt::Display for AuditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditKind::AddContribution => f.write_str("ADD_CONTRIBUTION"),
            AuditKind::BulkPayment => f.write_str("BULK_PAYMENT"),
        }
    }
}

impl FromStr for AuditKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "ADD_CONTRIBUTION" => Ok(AuditKind::AddContribution),
            "BULK_PAYMENT" => Ok(AuditKind::BulkPayment),
            other => Err(LedgerError::InvalidInput(format!(
                "unknown audit kind '{other}'"
            ))),
        }
    }
}

/// An accountant action, recorded once and never changed.
///
/// `seq` is assigned by the store on commit and orders entries that share a
/// timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub seq: u64,
    pub kind: AuditKind,
    pub description: String,
    pub amount: Option<Decimal>,
    pub member_id: Option<MemberId>,
    /// `None` once the acting accountant has been removed.
    pub actor: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(kind: AuditKind, description: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            seq: 0,
            kind,
            description: description.into(),
            amount: None,
            member_id: None,
            actor: None,
            timestamp,
        }
    }
}

/// Criteria for reading the audit trail. Date bounds are inclusive and
/// compared against the UTC date of the entry.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub actor: Option<String>,
    pub kind: Option<AuditKind>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl AuditFilter {
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        if let Some(actor) = &self.actor
            && entry.actor.as_deref() != Some(actor.as_str())
        {
            return false;
        }
        if let Some(kind) = self.kind
            && entry.kind != kind
        {
            return false;
        }
        let day = entry.timestamp.date_naive();
        if let Some(from) = self.from
            && day < from
        {
            return false;
        }
        if let Some(to) = self.to
            && day > to
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(kind: AuditKind, actor: Option<&str>, day: u32) -> AuditEntry {
        let mut e = AuditEntry::new(
            kind,
            "test",
            Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
        );
        e.actor = actor.map(str::to_string);
        e
    }

    #[test]
    fn test_kind_parse_and_display() {
        assert_eq!("bulk_payment".parse::<AuditKind>().unwrap(), AuditKind::BulkPayment);
        assert_eq!("add-contribution".parse::<AuditKind>().unwrap(), AuditKind::AddContribution);
        assert!("refund".parse::<AuditKind>().is_err());
        assert_eq!(AuditKind::BulkPayment.to_string(), "BULK_PAYMENT");
    }

    #[test]
    fn test_filter_by_actor_and_kind() {
        let filter = AuditFilter {
            actor: Some("treasurer".into()),
            kind: Some(AuditKind::BulkPayment),
            ..Default::default()
        };
        assert!(filter.matches(&entry(AuditKind::BulkPayment, Some("treasurer"), 1)));
        assert!(!filter.matches(&entry(AuditKind::AddContribution, Some("treasurer"), 1)));
        assert!(!filter.matches(&entry(AuditKind::BulkPayment, None, 1)));
    }

    #[test]
    fn test_filter_date_range_is_inclusive() {
        let filter = AuditFilter {
            from: NaiveDate::from_ymd_opt(2024, 3, 5),
            to: NaiveDate::from_ymd_opt(2024, 3, 10),
            ..Default::default()
        };
        assert!(!filter.matches(&entry(AuditKind::BulkPayment, None, 4)));
        assert!(filter.matches(&entry(AuditKind::BulkPayment, None, 5)));
        assert!(filter.matches(&entry(AuditKind::BulkPayment, None, 10)));
        assert!(!filter.matches(&entry(AuditKind::BulkPayment, None, 11)));
    }
}
