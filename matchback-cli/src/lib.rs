//! matchback-cli library interface
//!
//! Batch driver around matchback-core. It plays the caller's role: reads
//! parsed record batches from JSON, writes vendor files, and stores the
//! reconciliation map between the send and receive steps.

pub mod args;
pub mod commands;
pub mod files;

pub use args::{Cli, Command};
