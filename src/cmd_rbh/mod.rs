//! Subcommand modules for the `rbh` binary.

pub mod best;
pub mod filter;
pub mod run;
