use crate::application::ledger::RecordedPayment;
use crate::application::report::{CollectionReport, MemberStatement};
use crate::domain::allocation::AllocationResult;
use crate::domain::audit::AuditEntry;
use crate::domain::member::Member;
use crate::domain::period::Period;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct PeriodRow {
    year: i32,
    month: u32,
}

#[derive(Serialize)]
struct StandingRow<'a> {
    member: &'a str,
    name: &'a str,
    paid: Decimal,
    unpaid_months: usize,
    status: &'a str,
}

#[derive(Serialize)]
struct AuditRow<'a> {
    timestamp: String,
    kind: String,
    actor: &'a str,
    member: &'a str,
    amount: Option<Decimal>,
    description: &'a str,
}

#[derive(Serialize)]
struct ContributionRow<'a> {
    period: String,
    amount: Decimal,
    paid_at: String,
    note: &'a str,
}

#[derive(Serialize)]
struct MemberRow<'a> {
    id: &'a str,
    name: &'a str,
    phone: &'a str,
    enrolled: String,
    active: bool,
}

/// Writes ledger views as CSV to any `Write` sink.
pub struct LedgerWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> LedgerWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_periods(&mut self, periods: &[Period]) -> Result<()> {
        if periods.is_empty() {
            self.writer.write_record(["year", "month"])?;
        }
        for period in periods {
            self.writer.serialize(PeriodRow {
                year: period.year(),
                month: period.month(),
            })?;
        }
        self.flush()
    }

    pub fn write_recorded(&mut self, recorded: &RecordedPayment) -> Result<()> {
        self.writer
            .write_record(["outcome", "period", "amount", "paid_at"])?;
        let outcome = serde_json::to_value(recorded.outcome)?;
        self.writer.write_record([
            outcome.as_str().unwrap_or_default().to_string(),
            recorded.period.to_string(),
            recorded.amount.to_string(),
            recorded.paid_at.to_rfc3339(),
        ])?;
        self.flush()
    }

    pub fn write_allocation(&mut self, result: &AllocationResult) -> Result<()> {
        let filled: Vec<String> = result.periods_filled.iter().map(Period::to_string).collect();
        self.writer
            .write_record(["total", "filled_count", "periods_filled", "remainder"])?;
        self.writer.write_record([
            result.total.to_string(),
            result.filled_count().to_string(),
            filled.join(" "),
            result.remainder.to_string(),
        ])?;
        self.flush()
    }

    pub fn write_members(&mut self, members: &[Member]) -> Result<()> {
        if members.is_empty() {
            self.writer
                .write_record(["id", "name", "phone", "enrolled", "active"])?;
        }
        for member in members {
            self.writer.serialize(MemberRow {
                id: member.id.as_str(),
                name: &member.full_name,
                phone: &member.phone,
                enrolled: member.enrollment_date.to_string(),
                active: member.active,
            })?;
        }
        self.flush()
    }

    pub fn write_audit(&mut self, entries: &[AuditEntry]) -> Result<()> {
        if entries.is_empty() {
            self.writer.write_record([
                "timestamp",
                "kind",
                "actor",
                "member",
                "amount",
                "description",
            ])?;
        }
        for entry in entries {
            self.writer.serialize(AuditRow {
                timestamp: entry.timestamp.to_rfc3339(),
                kind: entry.kind.to_string(),
                actor: entry.actor.as_deref().unwrap_or_default(),
                member: entry.member_id.as_ref().map(|m| m.as_str()).unwrap_or_default(),
                amount: entry.amount,
                description: &entry.description,
            })?;
        }
        self.flush()
    }

    /// The per-member standings of a collection report.
    pub fn write_report(&mut self, report: &CollectionReport) -> Result<()> {
        if report.members.is_empty() {
            self.writer
                .write_record(["member", "name", "paid", "unpaid_months", "status"])?;
        }
        for standing in &report.members {
            let status = serde_json::to_value(standing.status)?;
            self.writer.serialize(StandingRow {
                member: standing.member_id.as_str(),
                name: &standing.full_name,
                paid: standing.paid,
                unpaid_months: standing.unpaid_months,
                status: status.as_str().unwrap_or_default(),
            })?;
        }
        self.flush()
    }

    /// A member's contributions, newest first.
    pub fn write_statement(&mut self, statement: &MemberStatement) -> Result<()> {
        if statement.contributions.is_empty() {
            self.writer
                .write_record(["period", "amount", "paid_at", "note"])?;
        }
        for contribution in &statement.contributions {
            self.writer.serialize(ContributionRow {
                period: contribution.period.to_string(),
                amount: contribution.amount.value(),
                paid_at: contribution.paid_at.to_rfc3339(),
                note: &contribution.note,
            })?;
        }
        self.flush()
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::report::{MemberStanding, PaymentStatus};
    use crate::domain::member::MemberId;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn output(write: impl FnOnce(&mut LedgerWriter<&mut Vec<u8>>)) -> String {
        let mut buffer = Vec::new();
        {
            let mut writer = LedgerWriter::new(&mut buffer);
            write(&mut writer);
        }
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_write_periods() {
        let periods = vec![Period::new(2024, 1).unwrap(), Period::new(2024, 2).unwrap()];
        let csv = output(|w| w.write_periods(&periods).unwrap());
        assert_eq!(csv, "year,month\n2024,1\n2024,2\n");

        let empty = output(|w| w.write_periods(&[]).unwrap());
        assert_eq!(empty, "year,month\n");
    }

    #[test]
    fn test_write_allocation() {
        let result = AllocationResult {
            total: dec!(12000),
            periods_filled: vec![Period::new(2024, 1).unwrap(), Period::new(2024, 2).unwrap()],
            remainder: dec!(2000),
        };
        let csv = output(|w| w.write_allocation(&result).unwrap());
        assert_eq!(
            csv,
            "total,filled_count,periods_filled,remainder\n12000,2,2024-01 2024-02,2000\n"
        );
    }

    #[test]
    fn test_write_report_rows() {
        let report = CollectionReport {
            as_of: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            group_name: "G".into(),
            monthly_due: dec!(5000),
            total_members: 1,
            total_collected: dec!(5000),
            total_expected: dec!(5000),
            fully_paid: 0,
            partially_paid: 1,
            not_paid: 0,
            collection_rate: dec!(100),
            members: vec![MemberStanding {
                member_id: MemberId::new("M-01").unwrap(),
                full_name: "Asha".into(),
                paid: dec!(5000),
                unpaid_months: 1,
                status: PaymentStatus::PartiallyPaid,
            }],
            recent_contributions: vec![],
        };
        let csv = output(|w| w.write_report(&report).unwrap());
        assert_eq!(
            csv,
            "member,name,paid,unpaid_months,status\nM-01,Asha,5000,1,partially_paid\n"
        );
    }
}
