use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Record,
    Distribute,
}

/// One accountant action from an operations file.
///
/// `year`/`month` are required for `record` and ignored for `distribute`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Operation {
    pub op: OperationKind,
    pub member: String,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub note: Option<String>,
}

impl Operation {
    /// The `(year, month)` of a `record` row.
    pub fn period(&self) -> Result<(i32, u32)> {
        match (self.year, self.month) {
            (Some(year), Some(month)) => Ok((year, month)),
            _ => Err(LedgerError::InvalidInput(format!(
                "record for {} is missing year or month",
                self.member
            ))),
        }
    }

    pub fn amount(&self) -> Result<Decimal> {
        self.amount.ok_or_else(|| {
            LedgerError::InvalidInput(format!("operation for {} is missing an amount", self.member))
        })
    }
}

/// Reads operations from a CSV source with the header
/// `op, member, year, month, amount, note`.
///
/// Whitespace is trimmed and short rows are accepted, so a `distribute` row can
/// leave the period columns empty.
pub struct OperationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OperationReader<R> {
    /// Creates a new `OperationReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes operations.
    pub fn operations(self) -> impl Iterator<Item = Result<Operation>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(LedgerError::from))
    }
}
