//! Input and output adapters for the command-line presentation layer.

pub mod csv;
