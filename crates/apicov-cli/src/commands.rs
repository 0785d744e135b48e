//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Apicov: measure which OpenAPI operations and responses your tests exercised
#[derive(Parser, Debug)]
#[command(name = "apicov")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress the report table and warnings)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, value_enum, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log output format (text, json)
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormatArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay recorded traffic against a spec and report coverage
    Run(RunArgs),

    /// Render a previously exported coverage snapshot
    Report(ReportArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// OpenAPI spec (YAML or JSON)
    #[arg(short, long, env = "APICOV_SPEC")]
    pub spec: PathBuf,

    /// HAR recordings to replay, in order
    #[arg(required = true)]
    pub har: Vec<PathBuf>,

    /// Write the coverage snapshot as JSON
    #[arg(short, long)]
    pub export: Option<PathBuf>,

    /// Server base URL tried before the document's servers
    #[arg(long, env = "APICOV_SERVER_URL")]
    pub server_url: Option<String>,

    /// Title to use instead of info.title
    #[arg(long)]
    pub title: Option<String>,

    /// Table layout
    #[arg(long, value_enum, default_value = "wide")]
    pub style: StyleArg,

    /// Print how every exchange was matched
    #[arg(long)]
    pub debug: bool,
}

/// Arguments for the report command
#[derive(Parser, Debug)]
pub struct ReportArgs {
    /// Exported coverage snapshot (JSON)
    pub snapshot: PathBuf,

    /// Name shown in the table header (defaults to the file name)
    #[arg(long)]
    pub name: Option<String>,

    /// Table layout
    #[arg(long, value_enum, default_value = "wide")]
    pub style: StyleArg,
}

/// Table layout argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StyleArg {
    /// Percentages plus covered and uncovered responses
    #[default]
    Wide,
    /// Percentages only
    Compact,
}

impl From<StyleArg> for crate::config::TableStyle {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::Wide => Self::Wide,
            StyleArg::Compact => Self::Compact,
        }
    }
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Log format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormatArg {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl From<LogFormatArg> for crate::config::LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}
