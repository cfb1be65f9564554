use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use contrib_ledger::application::ledger::{ContributionLedger, NewMember};
use contrib_ledger::config::LedgerConfig;
use contrib_ledger::domain::audit::{AuditFilter, AuditKind};
use contrib_ledger::domain::member::{MemberFilter, MemberId};
use contrib_ledger::domain::money::Amount;
use contrib_ledger::domain::ports::{ClockBox, LedgerStoreBox, MemberStoreBox};
use contrib_ledger::error::LedgerError;
use contrib_ledger::infrastructure::clock::{FixedClock, SystemClock};
use contrib_ledger::infrastructure::in_memory::{InMemoryLedgerStore, InMemoryMemberStore};
use contrib_ledger::interfaces::csv::operation_reader::{Operation, OperationKind, OperationReader};
use contrib_ledger::interfaces::csv::roster_reader::RosterReader;
use contrib_ledger::interfaces::csv::writer::LedgerWriter;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about = "Track monthly group contributions", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./ledger.toml when present)
    #[arg(long, global = true, env = "CONTRIB_LEDGER_CONFIG")]
    config: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true, env = "CONTRIB_LEDGER_DB")]
    db_path: Option<PathBuf>,

    /// Treat this date (YYYY-MM-DD) as today
    #[arg(long, global = true)]
    as_of: Option<NaiveDate>,

    /// Accountant recorded in the audit trail
    #[arg(long, global = true, env = "CONTRIB_LEDGER_ACTOR")]
    actor: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the group from the [group] section of the configuration
    Init,
    /// Change the group's monthly due amount
    SetDue { amount: String },
    /// Enroll and manage members
    Member {
        #[command(subcommand)]
        action: MemberCommand,
    },
    /// List a member's unpaid periods
    Outstanding { member: String },
    /// Record (or overwrite) one period's payment
    Record {
        member: String,
        #[arg(long)]
        year: String,
        #[arg(long)]
        month: String,
        #[arg(long)]
        amount: String,
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Spread a lump sum over a member's unpaid periods, earliest first
    Distribute {
        member: String,
        #[arg(long)]
        amount: String,
    },
    /// Show the audit trail, most recent first
    Audit {
        #[arg(long = "by")]
        by_actor: Option<String>,
        #[arg(long)]
        kind: Option<String>,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Show a member's contributions
    Statement {
        member: String,
        #[arg(long)]
        json: bool,
    },
    /// Show the collection report for active members
    Report {
        #[arg(long)]
        json: bool,
    },
    /// Apply an operations CSV (and optional member roster), then print the report
    Import {
        operations: PathBuf,
        #[arg(long)]
        members: Option<PathBuf>,
    },
}

impl Command {
    /// Whether the command writes to the stores rather than only reading them.
    fn mutates_state(&self) -> bool {
        match self {
            Command::Init
            | Command::SetDue { .. }
            | Command::Record { .. }
            | Command::Distribute { .. } => true,
            Command::Member { action } => !matches!(action, MemberCommand::List { .. }),
            Command::Outstanding { .. }
            | Command::Audit { .. }
            | Command::Statement { .. }
            | Command::Report { .. }
            | Command::Import { .. } => false,
        }
    }
}

#[derive(Subcommand)]
enum MemberCommand {
    Add {
        id: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        phone: String,
        /// Enrollment date (YYYY-MM-DD)
        #[arg(long)]
        enrolled: NaiveDate,
        #[arg(long)]
        inactive: bool,
    },
    Activate { id: String },
    Deactivate { id: String },
    List {
        #[arg(long, value_enum, default_value_t = StatusArg::All)]
        status: StatusArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    All,
    Active,
    Inactive,
}

impl From<StatusArg> for MemberFilter {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::All => MemberFilter::All,
            StatusArg::Active => MemberFilter::Active,
            StatusArg::Inactive => MemberFilter::Inactive,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "contrib_ledger=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(io::stderr().is_terminal()),
        )
        .init();

    let cli = Cli::parse();
    let config = LedgerConfig::discover(cli.config.as_deref())?;
    let (members, ledger_store, persistent) = open_stores(cli.db_path)?;
    if !persistent && cli.command.mutates_state() {
        tracing::warn!(
            "WARNING: No persistent store configured; changes made by this command are discarded when it exits. Use --db-path with the 'storage-rocksdb' feature, or apply changes through `import`."
        );
    }
    let clock: ClockBox = match cli.as_of {
        Some(date) => Box::new(FixedClock::new(date)),
        None => Box::new(SystemClock),
    };
    let ledger = ContributionLedger::new(members, ledger_store, clock, config.ledger.clone());
    let actor = cli.actor.as_deref();
    let scale = ledger.settings().minor_unit_scale;
    let stdout = io::stdout();
    let mut writer = LedgerWriter::new(stdout.lock());

    match cli.command {
        Command::Init => {
            bootstrap(&ledger, &config).await?;
        }
        Command::SetDue { amount } => {
            let group = ledger
                .change_monthly_due(Amount::parse(&amount, scale)?.value())
                .await?;
            println!("{}: monthly due is now {}", group.name, group.monthly_due);
        }
        Command::Member { action } => match action {
            MemberCommand::Add {
                id,
                name,
                phone,
                enrolled,
                inactive,
            } => {
                let member = ledger
                    .enroll_member(NewMember {
                        id: MemberId::new(id)?,
                        full_name: name,
                        phone,
                        enrollment_date: enrolled,
                        active: !inactive,
                    })
                    .await?;
                writer.write_members(&[member])?;
            }
            MemberCommand::Activate { id } => {
                let member = ledger.set_member_active(&MemberId::new(id)?, true).await?;
                writer.write_members(&[member])?;
            }
            MemberCommand::Deactivate { id } => {
                let member = ledger.set_member_active(&MemberId::new(id)?, false).await?;
                writer.write_members(&[member])?;
            }
            MemberCommand::List { status } => {
                let members = ledger.list_members(status.into()).await?;
                writer.write_members(&members)?;
            }
        },
        Command::Outstanding { member } => {
            let periods = ledger
                .outstanding_periods(&MemberId::new(member)?, cli.as_of)
                .await?;
            writer.write_periods(&periods)?;
        }
        Command::Record {
            member,
            year,
            month,
            amount,
            note,
        } => {
            let recorded = ledger
                .record_payment(
                    actor,
                    &MemberId::new(member)?,
                    parse_number(&year, "year")?,
                    parse_number(&month, "month")?,
                    Amount::parse(&amount, scale)?.value(),
                    &note,
                )
                .await?;
            writer.write_recorded(&recorded)?;
        }
        Command::Distribute { member, amount } => {
            let member = MemberId::new(member)?;
            match ledger
                .distribute(actor, &member, Amount::parse(&amount, scale)?.value())
                .await
            {
                Ok(result) => writer.write_allocation(&result)?,
                Err(LedgerError::NoOutstandingPeriods(_)) => {
                    tracing::warn!("No unpaid months for member {member}; nothing distributed");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::Audit {
            by_actor,
            kind,
            from,
            to,
        } => {
            let filter = AuditFilter {
                actor: by_actor,
                kind: kind.map(|k| k.parse::<AuditKind>()).transpose()?,
                from,
                to,
            };
            let entries = ledger.list_audit_entries(&filter).await?;
            writer.write_audit(&entries)?;
        }
        Command::Statement { member, json } => {
            let statement = ledger
                .member_statement(&MemberId::new(member)?, cli.as_of)
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&statement).into_diagnostic()?);
            } else {
                writer.write_statement(&statement)?;
            }
        }
        Command::Report { json } => {
            let report = ledger.collection_report(cli.as_of).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
            } else {
                writer.write_report(&report)?;
            }
        }
        Command::Import {
            operations,
            members,
        } => {
            if config.group.is_some() {
                bootstrap(&ledger, &config).await?;
            }
            if let Some(roster) = members {
                enroll_roster(&ledger, File::open(roster).into_diagnostic()?).await;
            }
            let reader = OperationReader::new(File::open(operations).into_diagnostic()?);
            for op_result in reader.operations() {
                match op_result {
                    Ok(op) => {
                        if let Err(e) = apply_operation(&ledger, actor, op).await {
                            tracing::warn!("Error processing operation: {e}");
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Error reading operation: {e}");
                    }
                }
            }
            let report = ledger.collection_report(cli.as_of).await?;
            writer.write_report(&report)?;
        }
    }

    Ok(())
}

/// The member and ledger stores, and whether they outlive this process.
fn open_stores(db_path: Option<PathBuf>) -> Result<(MemberStoreBox, LedgerStoreBox, bool)> {
    #[cfg(feature = "storage-rocksdb")]
    if let Some(db_path) = db_path {
        let store = contrib_ledger::infrastructure::rocksdb::RocksDBStore::open(db_path)?;
        let members: MemberStoreBox = Box::new(store.clone());
        let ledger: LedgerStoreBox = Box::new(store);
        return Ok((members, ledger, true));
    }

    #[cfg(not(feature = "storage-rocksdb"))]
    if db_path.is_some() {
        tracing::warn!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }

    Ok((
        Box::new(InMemoryMemberStore::new()),
        Box::new(InMemoryLedgerStore::new()),
        false,
    ))
}

async fn bootstrap(ledger: &ContributionLedger, config: &LedgerConfig) -> Result<()> {
    let section = config.group.as_ref().ok_or_else(|| {
        LedgerError::Config("a [group] section is required to bootstrap the group".to_string())
    })?;
    let group = ledger
        .bootstrap_group(
            &section.name,
            config.group_due(section)?.value(),
            &section.description,
        )
        .await?;
    println!("{}: monthly due {}", group.name, group.monthly_due);
    Ok(())
}

async fn enroll_roster(ledger: &ContributionLedger, source: File) {
    for row in RosterReader::new(source).members() {
        let result = match row {
            Ok(new) => ledger.enroll_member(new).await.map(|_| ()),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            tracing::warn!("Error enrolling member: {e}");
        }
    }
}

async fn apply_operation(
    ledger: &ContributionLedger,
    actor: Option<&str>,
    op: Operation,
) -> contrib_ledger::error::Result<()> {
    let member = MemberId::new(op.member.as_str())?;
    match op.op {
        OperationKind::Record => {
            let (year, month) = op.period()?;
            ledger
                .record_payment(
                    actor,
                    &member,
                    year,
                    month,
                    op.amount()?,
                    op.note.as_deref().unwrap_or_default(),
                )
                .await?;
        }
        OperationKind::Distribute => {
            let result = ledger.distribute(actor, &member, op.amount()?).await?;
            tracing::info!(
                "Distributed {} to {member}: {} months filled, remaining {}",
                result.total,
                result.filled_count(),
                result.remainder
            );
        }
    }
    Ok(())
}

fn parse_number<T: std::str::FromStr>(text: &str, field: &str) -> Result<T, LedgerError> {
    text.trim()
        .parse()
        .map_err(|_| LedgerError::InvalidInput(format!("'{text}' is not a valid {field}")))
}
