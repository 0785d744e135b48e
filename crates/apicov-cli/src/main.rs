//! Apicov CLI: OpenAPI coverage from recorded traffic
//!
//! ## Usage
//!
//! ```bash
//! apicov run --spec api.yaml traffic.har           # Print the coverage table
//! apicov run -s api.yaml a.har b.har -e cov.json   # Merge recordings, export JSON
//! apicov report cov.json --name api.yaml           # Re-render an export
//! ```

use apicov_cli::{
    handlers::{execute_report, execute_run},
    init_logging, Cli, CliConfig, CliResult, Commands, Verbosity,
};
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_logging(&config);

    match cli.command {
        Commands::Run(args) => execute_run(&config, &args).map(|_| ()),
        Commands::Report(args) => execute_report(&config, &args).map(|_| ()),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let debug = matches!(&cli.command, Commands::Run(args) if args.debug);
    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else if debug {
        Verbosity::Debug
    } else {
        match cli.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    };

    let config = CliConfig::new()
        .with_verbosity(verbosity)
        .with_color(cli.color.into())
        .with_log_format(cli.log_format.into());

    match &cli.command {
        Commands::Run(args) => config
            .with_table_style(args.style.into())
            .with_title(args.title.clone())
            .with_fixed_server_url(args.server_url.clone())
            .with_debug(args.debug),
        Commands::Report(args) => config.with_table_style(args.style.into()),
    }
}
