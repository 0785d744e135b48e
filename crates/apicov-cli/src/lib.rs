//! Apicov CLI Library
//!
//! Command-line front end for apicov: replays HAR recordings against an
//! OpenAPI spec, prints the coverage table and exports snapshots.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod har;
pub mod logging;
mod output;
pub mod table;

pub use commands::{Cli, ColorArg, Commands, LogFormatArg, ReportArgs, RunArgs, StyleArg};
pub use config::{CliConfig, ColorChoice, LogFormat, TableStyle, Verbosity};
pub use error::{CliError, CliResult};
pub use har::{Exchange, Har, HarEntry, HarError, HarRequest, HarResponse};
pub use logging::init_logging;
pub use output::{summary_line, ProgressReporter};
pub use table::CoverageTable;
