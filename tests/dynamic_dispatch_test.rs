use chrono::{NaiveDate, Utc};
use contrib_ledger::domain::audit::{AuditEntry, AuditFilter, AuditKind};
use contrib_ledger::domain::member::{Member, MemberId};
use contrib_ledger::domain::money::Amount;
use contrib_ledger::domain::payment::PaymentRecord;
use contrib_ledger::domain::period::Period;
use contrib_ledger::domain::ports::{LedgerBatch, LedgerStoreBox, MemberStoreBox};
use contrib_ledger::infrastructure::in_memory::{InMemoryLedgerStore, InMemoryMemberStore};
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_stores_as_trait_objects() {
    let member_store: MemberStoreBox = Box::new(InMemoryMemberStore::new());
    let ledger_store: LedgerStoreBox = Box::new(InMemoryLedgerStore::new());

    let id = MemberId::new("M-01").unwrap();
    let member = Member::new(
        id.clone(),
        1,
        "Asha Mwita",
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
    );
    let batch = LedgerBatch {
        payments: vec![PaymentRecord {
            member_id: id.clone(),
            period: Period::new(2024, 1).unwrap(),
            amount: Amount::new(dec!(5000)).unwrap(),
            due_at_payment: Amount::new(dec!(5000)).unwrap(),
            note: String::new(),
            paid_at: Utc::now(),
        }],
        audit: vec![AuditEntry::new(
            AuditKind::AddContribution,
            "Added 5000",
            Utc::now(),
        )],
    };

    // Verify Send + Sync by spawning tasks
    let lookup = id.clone();
    let ms_handle = tokio::spawn(async move {
        member_store.store_member(member).await.unwrap();
        member_store.get_member(&lookup).await.unwrap().unwrap()
    });

    let ls_handle = tokio::spawn(async move {
        ledger_store.commit(batch).await.unwrap();
        let audit = ledger_store
            .audit_entries(&AuditFilter::default())
            .await
            .unwrap();
        (ledger_store.payments_for(&id).await.unwrap(), audit)
    });

    let retrieved_member = ms_handle.await.unwrap();
    assert_eq!(retrieved_member.full_name, "Asha Mwita");

    let (payments, audit) = ls_handle.await.unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].seq, 1);
}
