use super::audit::{AuditEntry, AuditFilter};
use super::group::Group;
use super::member::{Member, MemberId};
use super::payment::{PaymentRecord, UpsertOutcome};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;

/// Groups and their members.
#[async_trait]
pub trait MemberStore: Send + Sync {
    async fn store_group(&self, group: Group) -> Result<()>;
    async fn group(&self) -> Result<Option<Group>>;
    async fn store_member(&self, member: Member) -> Result<()>;
    async fn get_member(&self, id: &MemberId) -> Result<Option<Member>>;
    async fn all_members(&self) -> Result<Vec<Member>>;
}

/// A set of writes applied all together or not at all.
#[derive(Debug, Default, Clone)]
pub struct LedgerBatch {
    pub payments: Vec<PaymentRecord>,
    pub audit: Vec<AuditEntry>,
}

impl LedgerBatch {
    /// A batch may write each `(member, period)` key at most once; a second
    /// write to the same key inside one atomic commit is a conflict.
    pub fn check_unique_keys(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for payment in &self.payments {
            if !seen.insert(payment.key()) {
                return Err(LedgerError::ConcurrencyConflict {
                    member: payment.member_id.to_string(),
                    period: payment.period.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Payment records and the audit trail.
///
/// Writes only go through [`LedgerStore::commit`], which upserts every payment
/// on its `(member, period)` key and appends every audit entry atomically.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Returns one outcome per payment in the batch, in batch order.
    async fn commit(&self, batch: LedgerBatch) -> Result<Vec<UpsertOutcome>>;
    async fn payments_for(&self, member: &MemberId) -> Result<Vec<PaymentRecord>>;
    async fn all_payments(&self) -> Result<Vec<PaymentRecord>>;
    /// Matching entries, most recent first.
    async fn audit_entries(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>>;
}

/// Source of "today" and "now" for the deployment.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
    fn now(&self) -> DateTime<Utc>;
}

pub type MemberStoreBox = Box<dyn MemberStore>;
pub type LedgerStoreBox = Box<dyn LedgerStore>;
pub type ClockBox = Box<dyn Clock>;
