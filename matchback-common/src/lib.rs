//! # Matchback Common Library
//!
//! Shared code for the matchback workspace:
//! - Error type and result alias
//! - TOML configuration loading and resolution
//! - UTC calendar helpers used by the classifiers

pub mod config;
pub mod error;
pub mod time;

pub use error::{Error, Result};
