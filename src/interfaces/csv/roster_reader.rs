use crate::application::ledger::NewMember;
use crate::domain::member::MemberId;
use crate::error::{LedgerError, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::io::Read;

/// One member row: `id, name, phone, enrolled, active`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct RosterRow {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    /// `YYYY-MM-DD`
    pub enrolled: NaiveDate,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl TryFrom<RosterRow> for NewMember {
    type Error = LedgerError;

    fn try_from(row: RosterRow) -> Result<Self> {
        Ok(NewMember {
            id: MemberId::new(row.id)?,
            full_name: row.name,
            phone: row.phone,
            enrollment_date: row.enrolled,
            active: row.active,
        })
    }
}

/// Reads a member roster from a CSV source.
pub struct RosterReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> RosterReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn members(self) -> impl Iterator<Item = Result<NewMember>> {
        self.reader.into_deserialize().map(|result| {
            let row: RosterRow = result?;
            NewMember::try_from(row)
        })
    }
}
