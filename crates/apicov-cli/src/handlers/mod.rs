//! Command handlers
//!
//! Each handler module contains the execution logic for a CLI command, its
//! pure helpers, and tests.

pub mod report;
pub mod run;

pub use report::{execute_report, load_snapshot};
pub use run::{describe_failure, describe_match, execute_run, replay, spec_name, RunSummary};
