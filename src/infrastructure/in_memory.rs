use crate::domain::audit::{AuditEntry, AuditFilter};
use crate::domain::group::Group;
use crate::domain::member::{Member, MemberId};
use crate::domain::payment::{PaymentRecord, UpsertOutcome};
use crate::domain::period::Period;
use crate::domain::ports::{LedgerBatch, LedgerStore, MemberStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Directory {
    group: Option<Group>,
    members: HashMap<MemberId, Member>,
}

/// A thread-safe in-memory store for the group and its members.
///
/// Ideal for tests and one-shot CSV imports where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryMemberStore {
    directory: Arc<RwLock<Directory>>,
}

impl InMemoryMemberStore {
    /// Creates a new, empty in-memory member store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemberStore for InMemoryMemberStore {
    async fn store_group(&self, group: Group) -> Result<()> {
        self.directory.write().await.group = Some(group);
        Ok(())
    }

    async fn group(&self) -> Result<Option<Group>> {
        Ok(self.directory.read().await.group.clone())
    }

    async fn store_member(&self, member: Member) -> Result<()> {
        let mut directory = self.directory.write().await;
        directory.members.insert(member.id.clone(), member);
        Ok(())
    }

    async fn get_member(&self, id: &MemberId) -> Result<Option<Member>> {
        Ok(self.directory.read().await.members.get(id).cloned())
    }

    async fn all_members(&self) -> Result<Vec<Member>> {
        Ok(self.directory.read().await.members.values().cloned().collect())
    }
}

#[derive(Default)]
struct Ledger {
    payments: BTreeMap<(MemberId, Period), PaymentRecord>,
    audit: Vec<AuditEntry>,
    next_seq: u64,
}

/// A thread-safe in-memory store for payments and the audit trail.
///
/// A commit holds the write lock for the whole batch, so readers never see a
/// half-applied distribution.
#[derive(Default, Clone)]
pub struct InMemoryLedgerStore {
    ledger: Arc<RwLock<Ledger>>,
}

impl InMemoryLedgerStore {
    /// Creates a new, empty in-memory ledger store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn commit(&self, batch: LedgerBatch) -> Result<Vec<UpsertOutcome>> {
        batch.check_unique_keys()?;

        let mut ledger = self.ledger.write().await;
        let mut outcomes = Vec::with_capacity(batch.payments.len());
        for payment in batch.payments {
            let key = (payment.member_id.clone(), payment.period);
            let outcome = match ledger.payments.insert(key, payment) {
                Some(_) => UpsertOutcome::Updated,
                None => UpsertOutcome::Created,
            };
            outcomes.push(outcome);
        }
        for mut entry in batch.audit {
            ledger.next_seq += 1;
            entry.seq = ledger.next_seq;
            ledger.audit.push(entry);
        }
        Ok(outcomes)
    }

    async fn payments_for(&self, member: &MemberId) -> Result<Vec<PaymentRecord>> {
        let ledger = self.ledger.read().await;
        Ok(ledger
            .payments
            .values()
            .filter(|p| &p.member_id == member)
            .cloned()
            .collect())
    }

    async fn all_payments(&self) -> Result<Vec<PaymentRecord>> {
        Ok(self.ledger.read().await.payments.values().cloned().collect())
    }

    async fn audit_entries(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>> {
        let ledger = self.ledger.read().await;
        let mut entries: Vec<AuditEntry> = ledger
            .audit
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        entries.sort_by(|a, b| (b.timestamp, b.seq).cmp(&(a.timestamp, a.seq)));
        Ok(entries)
    }
}
