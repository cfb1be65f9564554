use super::report::{
    CollectionReport, MemberStanding, MemberStatement, PaymentStatus, RECENT_CONTRIBUTIONS,
    collection_rate, newest_first,
};
use crate::config::LedgerSection;
use crate::domain::allocation::{AllocationResult, allocate};
use crate::domain::audit::{AuditEntry, AuditFilter, AuditKind};
use crate::domain::group::Group;
use crate::domain::member::{Member, MemberFilter, MemberId};
use crate::domain::money::Amount;
use crate::domain::payment::{PaymentRecord, UpsertOutcome};
use crate::domain::period::Period;
use crate::domain::ports::{ClockBox, LedgerBatch, LedgerStoreBox, MemberStoreBox};
use crate::domain::reconcile;
use crate::error::{LedgerError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Fields needed to enroll a new member.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub id: MemberId,
    pub full_name: String,
    pub phone: String,
    pub enrollment_date: NaiveDate,
    pub active: bool,
}

/// Result of recording one period's payment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedPayment {
    pub outcome: UpsertOutcome,
    pub period: Period,
    pub amount: Decimal,
    pub paid_at: DateTime<Utc>,
}

/// The entry point the presentation layer calls into.
///
/// `ContributionLedger` owns the storage backends and the clock. Each
/// operation runs to completion before returning; every write it makes goes
/// through a single [`LedgerBatch`], so a failed operation leaves no trace.
pub struct ContributionLedger {
    members: MemberStoreBox,
    ledger: LedgerStoreBox,
    clock: ClockBox,
    settings: LedgerSection,
}

impl ContributionLedger {
    /// Creates a new `ContributionLedger` instance.
    ///
    /// # Arguments
    ///
    /// * `members` - The store for the group and its members.
    /// * `ledger` - The store for payments and the audit trail.
    /// * `clock` - Source of "today" for period derivation.
    /// * `settings` - Currency precision and due-amount policy.
    pub fn new(
        members: MemberStoreBox,
        ledger: LedgerStoreBox,
        clock: ClockBox,
        settings: LedgerSection,
    ) -> Self {
        Self {
            members,
            ledger,
            clock,
            settings,
        }
    }

    /// One-time deployment setup. Returns the existing group untouched when
    /// one is already configured.
    pub async fn bootstrap_group(
        &self,
        name: &str,
        monthly_due: Decimal,
        description: &str,
    ) -> Result<Group> {
        if let Some(existing) = self.members.group().await? {
            tracing::info!(group = %existing.name, "group already bootstrapped");
            return Ok(existing);
        }
        if name.trim().is_empty() {
            return Err(LedgerError::InvalidInput(
                "group name must not be empty".to_string(),
            ));
        }

        let mut group = Group::new(1, name.trim(), self.amount(monthly_due)?);
        group.description = description.to_string();
        group.created_at = self.clock.now();
        self.members.store_group(group.clone()).await?;
        tracing::info!(group = %group.name, monthly_due = %group.monthly_due, "group bootstrapped");
        Ok(group)
    }

    pub async fn group(&self) -> Result<Group> {
        self.members.group().await?.ok_or(LedgerError::GroupNotFound)
    }

    /// Changes the due amount for future comparisons and payments.
    pub async fn change_monthly_due(&self, monthly_due: Decimal) -> Result<Group> {
        let mut group = self.group().await?;
        let previous = group.monthly_due;
        group.monthly_due = self.amount(monthly_due)?;
        self.members.store_group(group.clone()).await?;
        tracing::info!(%previous, current = %group.monthly_due, "monthly due changed");
        Ok(group)
    }

    pub async fn enroll_member(&self, new: NewMember) -> Result<Member> {
        let group = self.group().await?;
        if self.members.get_member(&new.id).await?.is_some() {
            return Err(LedgerError::InvalidInput(format!(
                "member {} is already enrolled",
                new.id
            )));
        }

        let mut member = Member::new(new.id, group.id, new.full_name, new.enrollment_date);
        member.phone = new.phone;
        member.active = new.active;
        self.members.store_member(member.clone()).await?;
        tracing::info!(member = %member.id, enrolled = %member.enrollment_date, "member enrolled");
        Ok(member)
    }

    pub async fn set_member_active(&self, id: &MemberId, active: bool) -> Result<Member> {
        let mut member = self.member(id).await?;
        member.active = active;
        self.members.store_member(member.clone()).await?;
        tracing::info!(member = %id, active, "member status changed");
        Ok(member)
    }

    /// Members matching `filter`, ordered by name.
    pub async fn list_members(&self, filter: MemberFilter) -> Result<Vec<Member>> {
        let mut members: Vec<Member> = self
            .members
            .all_members()
            .await?
            .into_iter()
            .filter(|m| filter.matches(m))
            .collect();
        members.sort_by(|a, b| {
            a.display_name()
                .cmp(b.display_name())
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(members)
    }

    /// Periods from enrollment through `as_of` (default: today) that lack a
    /// satisfying payment, earliest first.
    pub async fn outstanding_periods(
        &self,
        member_id: &MemberId,
        as_of: Option<NaiveDate>,
    ) -> Result<Vec<Period>> {
        let member = self.member(member_id).await?;
        let group = self.group().await?;
        let as_of = as_of.unwrap_or_else(|| self.clock.today());
        let periods = self.outstanding_for(&member, &group, as_of).await?;
        tracing::debug!(member = %member_id, %as_of, count = periods.len(), "outstanding periods");
        Ok(periods)
    }

    /// Creates or replaces the payment for one period and logs an
    /// `ADD_CONTRIBUTION` entry in the same commit.
    pub async fn record_payment(
        &self,
        actor: Option<&str>,
        member_id: &MemberId,
        year: i32,
        month: u32,
        amount: Decimal,
        note: &str,
    ) -> Result<RecordedPayment> {
        let period = Period::new(year, month)?;
        let amount = self.amount(amount)?;
        let member = self.member(member_id).await?;
        let group = self.group().await?;
        let now = self.clock.now();

        let payment = PaymentRecord {
            member_id: member.id.clone(),
            period,
            amount,
            due_at_payment: group.monthly_due,
            note: note.to_string(),
            paid_at: now,
        };
        let mut entry = AuditEntry::new(
            AuditKind::AddContribution,
            format!(
                "Added {amount} for {} - {} {}",
                member.display_name(),
                period.month_name(),
                period.year()
            ),
            now,
        );
        entry.amount = Some(amount.value());
        entry.member_id = Some(member.id.clone());
        entry.actor = actor.map(str::to_string);

        let outcomes = self
            .ledger
            .commit(LedgerBatch {
                payments: vec![payment],
                audit: vec![entry],
            })
            .await?;
        let outcome = outcomes.into_iter().next().ok_or_else(|| {
            LedgerError::Internal(Box::new(std::io::Error::other(
                "ledger store returned no outcome for the recorded payment",
            )))
        })?;

        tracing::info!(member = %member_id, %period, %amount, ?outcome, "payment recorded");
        Ok(RecordedPayment {
            outcome,
            period,
            amount: amount.value(),
            paid_at: now,
        })
    }

    /// Spreads `total` over the member's outstanding periods, earliest first,
    /// one full due amount per period. Every filled period and a single
    /// `BULK_PAYMENT` entry are committed together.
    pub async fn distribute(
        &self,
        actor: Option<&str>,
        member_id: &MemberId,
        total: Decimal,
    ) -> Result<AllocationResult> {
        let total = self.amount(total)?;
        let member = self.member(member_id).await?;
        let group = self.group().await?;
        let outstanding = self
            .outstanding_for(&member, &group, self.clock.today())
            .await?;
        if outstanding.is_empty() {
            tracing::info!(member = %member_id, "no outstanding periods to distribute over");
            return Err(LedgerError::NoOutstandingPeriods(member_id.to_string()));
        }

        let result = allocate(&outstanding, group.monthly_due, total);
        let now = self.clock.now();
        let payments = result
            .periods_filled
            .iter()
            .map(|period| PaymentRecord {
                member_id: member.id.clone(),
                period: *period,
                amount: group.monthly_due,
                due_at_payment: group.monthly_due,
                note: String::new(),
                paid_at: now,
            })
            .collect();
        let mut entry = AuditEntry::new(
            AuditKind::BulkPayment,
            format!(
                "Distributed {total} to {} across {} months. Remaining: {}",
                member.display_name(),
                result.filled_count(),
                result.remainder
            ),
            now,
        );
        entry.amount = Some(total.value());
        entry.member_id = Some(member.id.clone());
        entry.actor = actor.map(str::to_string);

        self.ledger
            .commit(LedgerBatch {
                payments,
                audit: vec![entry],
            })
            .await?;

        tracing::info!(
            member = %member_id,
            %total,
            filled = result.filled_count(),
            remainder = %result.remainder,
            "bulk payment distributed"
        );
        Ok(result)
    }

    /// Read-only view of the audit trail, most recent first.
    pub async fn list_audit_entries(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>> {
        self.ledger.audit_entries(filter).await
    }

    pub async fn member_statement(
        &self,
        member_id: &MemberId,
        as_of: Option<NaiveDate>,
    ) -> Result<MemberStatement> {
        let member = self.member(member_id).await?;
        let group = self.group().await?;
        let as_of = as_of.unwrap_or_else(|| self.clock.today());

        let mut contributions = self.ledger.payments_for(&member.id).await?;
        let outstanding = reconcile::outstanding_periods(
            &member,
            &contributions,
            group.monthly_due,
            self.settings.due_policy,
            as_of,
        );
        newest_first(&mut contributions);

        let total_paid = contributions.iter().map(|p| p.amount.value()).sum();
        let months_paid = contributions.len();
        let monthly_due = group.monthly_due.value();
        Ok(MemberStatement {
            member,
            contributions,
            total_paid,
            months_paid,
            monthly_due,
            expected_payment: monthly_due * Decimal::from(months_paid),
            outstanding,
        })
    }

    /// Standing of every active member as of `as_of` (default: today).
    pub async fn collection_report(&self, as_of: Option<NaiveDate>) -> Result<CollectionReport> {
        let group = self.group().await?;
        let as_of = as_of.unwrap_or_else(|| self.clock.today());
        let mut payments = self.ledger.all_payments().await?;
        let active = self.list_members(MemberFilter::Active).await?;

        let mut members = Vec::with_capacity(active.len());
        for member in &active {
            let own: Vec<PaymentRecord> = payments
                .iter()
                .filter(|p| p.member_id == member.id)
                .cloned()
                .collect();
            let paid: Decimal = own.iter().map(|p| p.amount.value()).sum();
            let unpaid_months = reconcile::outstanding_periods(
                member,
                &own,
                group.monthly_due,
                self.settings.due_policy,
                as_of,
            )
            .len();
            members.push(MemberStanding {
                member_id: member.id.clone(),
                full_name: member.display_name().to_string(),
                paid,
                unpaid_months,
                status: PaymentStatus::classify(unpaid_months, paid),
            });
        }

        let count = |status: PaymentStatus| members.iter().filter(|m| m.status == status).count();
        let fully_paid = count(PaymentStatus::UpToDate);
        let partially_paid = count(PaymentStatus::PartiallyPaid);
        let not_paid = count(PaymentStatus::NotPaid);

        let total_collected: Decimal = payments.iter().map(|p| p.amount.value()).sum();
        let total_expected = group.monthly_due.value() * Decimal::from(active.len());
        newest_first(&mut payments);
        payments.truncate(RECENT_CONTRIBUTIONS);

        tracing::debug!(%as_of, members = active.len(), %total_collected, "collection report");
        Ok(CollectionReport {
            as_of,
            group_name: group.name,
            monthly_due: group.monthly_due.value(),
            total_members: active.len(),
            total_collected,
            total_expected,
            fully_paid,
            partially_paid,
            not_paid,
            collection_rate: collection_rate(total_collected, total_expected),
            members,
            recent_contributions: payments,
        })
    }

    pub fn settings(&self) -> &LedgerSection {
        &self.settings
    }

    fn amount(&self, value: Decimal) -> Result<Amount> {
        Amount::with_scale(value, self.settings.minor_unit_scale)
    }

    async fn member(&self, id: &MemberId) -> Result<Member> {
        self.members
            .get_member(id)
            .await?
            .ok_or_else(|| LedgerError::MemberNotFound(id.to_string()))
    }

    /// Fetches the member's payments once and reconciles them in memory.
    async fn outstanding_for(
        &self,
        member: &Member,
        group: &Group,
        as_of: NaiveDate,
    ) -> Result<Vec<Period>> {
        let payments = self.ledger.payments_for(&member.id).await?;
        Ok(reconcile::outstanding_periods(
            member,
            &payments,
            group.monthly_due,
            self.settings.due_policy,
            as_of,
        ))
    }
}
