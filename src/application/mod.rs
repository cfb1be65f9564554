//! Application layer orchestrating the domain rules over the storage ports.
//!
//! `ContributionLedger` is the primary entry point: it answers outstanding-period
//! queries, records single payments, distributes lump sums and builds reports.

pub mod ledger;
pub mod report;
