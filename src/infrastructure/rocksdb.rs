use crate::domain::audit::{AuditEntry, AuditFilter};
use crate::domain::group::Group;
use crate::domain::member::{Member, MemberId};
use crate::domain::payment::{PaymentRecord, UpsertOutcome};
use crate::domain::period::Period;
use crate::domain::ports::{LedgerBatch, LedgerStore, MemberStore};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family holding the group record.
pub const CF_GROUPS: &str = "groups";
/// Column Family for members, keyed by member id.
pub const CF_MEMBERS: &str = "members";
/// Column Family for payments, keyed by member id + period.
pub const CF_PAYMENTS: &str = "payments";
/// Column Family for the append-only audit trail, keyed by sequence number.
pub const CF_AUDIT: &str = "audit";

const GROUP_KEY: &[u8] = b"group";

/// A persistent store implementation using RocksDB.
///
/// Implements both `MemberStore` and `LedgerStore` over separate Column
/// Families. Ledger commits go through a single `WriteBatch`, so a bulk
/// distribution and its audit entry land together or not at all.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    /// Last audit sequence number; the lock also serializes ledger commits.
    last_seq: Arc<Mutex<u64>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path and recovers
    /// the audit sequence counter.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let families = [CF_GROUPS, CF_MEMBERS, CF_PAYMENTS, CF_AUDIT]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));
        let db = DB::open_cf_descriptors(&opts, path, families)?;

        let last_seq = {
            let cf = db.cf_handle(CF_AUDIT).ok_or_else(|| missing_cf(CF_AUDIT))?;
            match db.iterator_cf(cf, IteratorMode::End).next() {
                Some(item) => {
                    let (key, _) = item?;
                    decode_seq(&key)?
                }
                None => 0,
            }
        };

        Ok(Self {
            db: Arc::new(db),
            last_seq: Arc::new(Mutex::new(last_seq)),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| missing_cf(name))
    }

    fn get_json<T: DeserializeOwned>(&self, cf: &str, key: &[u8]) -> Result<Option<T>> {
        match self.db.get_cf(self.cf(cf)?, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put_json<T: Serialize>(&self, cf: &str, key: &[u8], value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(self.cf(cf)?, key, bytes)?;
        Ok(())
    }

    /// Decodes every value whose key starts with `prefix`.
    fn scan<T: DeserializeOwned>(&self, cf: &str, prefix: &[u8]) -> Result<Vec<T>> {
        let iter = self
            .db
            .iterator_cf(self.cf(cf)?, IteratorMode::From(prefix, Direction::Forward));
        let mut values = Vec::new();
        for item in iter {
            let (key, value) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            values.push(serde_json::from_slice(&value)?);
        }
        Ok(values)
    }
}

fn missing_cf(name: &str) -> LedgerError {
    LedgerError::Internal(Box::new(std::io::Error::other(format!(
        "{name} column family not found"
    ))))
}

fn decode_seq(key: &[u8]) -> Result<u64> {
    let bytes: [u8; 8] = key.try_into().map_err(|_| {
        LedgerError::Internal(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "malformed audit key",
        )))
    })?;
    Ok(u64::from_be_bytes(bytes))
}

fn member_prefix(member: &MemberId) -> Vec<u8> {
    let mut key = member.as_str().as_bytes().to_vec();
    key.push(0);
    key
}

/// `member id, 0x00, year (big endian), month`: sorts a member's payments
/// chronologically and keeps them contiguous for prefix scans.
fn payment_key(member: &MemberId, period: Period) -> Vec<u8> {
    let mut key = member_prefix(member);
    key.extend_from_slice(&period.year().to_be_bytes());
    key.push(period.month() as u8);
    key
}

#[async_trait]
impl MemberStore for RocksDBStore {
    async fn store_group(&self, group: Group) -> Result<()> {
        self.put_json(CF_GROUPS, GROUP_KEY, &group)
    }

    async fn group(&self) -> Result<Option<Group>> {
        self.get_json(CF_GROUPS, GROUP_KEY)
    }

    async fn store_member(&self, member: Member) -> Result<()> {
        self.put_json(CF_MEMBERS, member.id.as_str().as_bytes(), &member)
    }

    async fn get_member(&self, id: &MemberId) -> Result<Option<Member>> {
        self.get_json(CF_MEMBERS, id.as_str().as_bytes())
    }

    async fn all_members(&self) -> Result<Vec<Member>> {
        self.scan(CF_MEMBERS, &[])
    }
}

#[async_trait]
impl LedgerStore for RocksDBStore {
    async fn commit(&self, batch: LedgerBatch) -> Result<Vec<UpsertOutcome>> {
        batch.check_unique_keys()?;

        let mut last_seq = self.last_seq.lock().await;
        let payments_cf = self.cf(CF_PAYMENTS)?;
        let audit_cf = self.cf(CF_AUDIT)?;

        let mut write = WriteBatch::default();
        let mut outcomes = Vec::with_capacity(batch.payments.len());
        for payment in &batch.payments {
            let key = payment_key(&payment.member_id, payment.period);
            let outcome = match self.db.get_pinned_cf(payments_cf, &key)? {
                Some(_) => UpsertOutcome::Updated,
                None => UpsertOutcome::Created,
            };
            write.put_cf(payments_cf, key, serde_json::to_vec(payment)?);
            outcomes.push(outcome);
        }

        let mut seq = *last_seq;
        for mut entry in batch.audit {
            seq += 1;
            entry.seq = seq;
            write.put_cf(audit_cf, seq.to_be_bytes(), serde_json::to_vec(&entry)?);
        }

        self.db.write(write)?;
        *last_seq = seq;
        Ok(outcomes)
    }

    async fn payments_for(&self, member: &MemberId) -> Result<Vec<PaymentRecord>> {
        self.scan(CF_PAYMENTS, &member_prefix(member))
    }

    async fn all_payments(&self) -> Result<Vec<PaymentRecord>> {
        self.scan(CF_PAYMENTS, &[])
    }

    async fn audit_entries(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>> {
        let mut entries: Vec<AuditEntry> = self
            .scan::<AuditEntry>(CF_AUDIT, &[])?
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect();
        entries.sort_by(|a, b| (b.timestamp, b.seq).cmp(&(a.timestamp, a.seq)));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audit::AuditKind;
    use crate::domain::money::Amount;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn payment(id: &str, year: i32, month: u32) -> PaymentRecord {
        PaymentRecord {
            member_id: MemberId::new(id).unwrap(),
            period: Period::new(year, month).unwrap(),
            amount: Amount::new(dec!(5000)).unwrap(),
            due_at_payment: Amount::new(dec!(5000)).unwrap(),
            note: String::new(),
            paid_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).expect("Failed to open RocksDB");

        for name in [CF_GROUPS, CF_MEMBERS, CF_PAYMENTS, CF_AUDIT] {
            assert!(store.db.cf_handle(name).is_some());
        }
    }

    #[tokio::test]
    async fn test_rocksdb_member_store() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();
        let id = MemberId::new("M-01").unwrap();
        let member = Member::new(
            id.clone(),
            1,
            "Asha",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );

        store.store_member(member.clone()).await.unwrap();
        assert_eq!(store.get_member(&id).await.unwrap(), Some(member));
        assert_eq!(store.all_members().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rocksdb_payments_are_scoped_and_ordered() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let outcomes = store
            .commit(LedgerBatch {
                payments: vec![
                    payment("M-1", 2024, 2),
                    payment("M-1", 2023, 12),
                    payment("M-10", 2024, 1),
                ],
                audit: vec![],
            })
            .await
            .unwrap();
        assert_eq!(outcomes, vec![UpsertOutcome::Created; 3]);

        let records = store.payments_for(&MemberId::new("M-1").unwrap()).await.unwrap();
        let periods: Vec<_> = records.iter().map(|p| p.period.to_string()).collect();
        assert_eq!(periods, vec!["2023-12", "2024-02"]);

        let again = store
            .commit(LedgerBatch {
                payments: vec![payment("M-1", 2024, 2)],
                audit: vec![],
            })
            .await
            .unwrap();
        assert_eq!(again, vec![UpsertOutcome::Updated]);
        assert_eq!(store.all_payments().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_rocksdb_audit_sequence_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = RocksDBStore::open(dir.path()).unwrap();
            store
                .commit(LedgerBatch {
                    payments: vec![],
                    audit: vec![AuditEntry::new(AuditKind::BulkPayment, "first", Utc::now())],
                })
                .await
                .unwrap();
        }

        let store = RocksDBStore::open(dir.path()).unwrap();
        store
            .commit(LedgerBatch {
                payments: vec![],
                audit: vec![AuditEntry::new(AuditKind::AddContribution, "second", Utc::now())],
            })
            .await
            .unwrap();

        let entries = store.audit_entries(&AuditFilter::default()).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].seq, 2);
        assert_eq!(entries[0].description, "second");
    }
}
