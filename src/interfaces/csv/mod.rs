pub mod operation_reader;
pub mod roster_reader;
pub mod writer;
