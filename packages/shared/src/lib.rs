//! Shared utilities for Kartwatch.
//!
//! Logging setup, time helpers and display formatting used by the tracker server.

pub mod format;
pub mod logger;
pub mod time;
