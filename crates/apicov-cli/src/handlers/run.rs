//! Run command handler

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::har::{Exchange, Har};
use crate::output::ProgressReporter;
use crate::table::CoverageTable;
use crate::RunArgs;
use apicov::{
    CoverageSession, CoverageSnapshot, MatchFailure, MatchResult, RecordOptions, SessionStats,
};
use std::path::Path;
use tracing::info;

/// What a run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Coverage after every exchange was replayed
    pub snapshot: CoverageSnapshot,
    /// Session totals
    pub stats: SessionStats,
}

/// Execute the run command
pub fn execute_run(config: &CliConfig, args: &RunArgs) -> CliResult<RunSummary> {
    let reporter = ProgressReporter::new(config.use_color(), config.verbosity.is_quiet());
    let mut session = CoverageSession::load(&args.spec)?;
    let options = config.record_options();

    for path in &args.har {
        let exchanges = Har::from_file(path)?.exchanges();
        info!(har = %path.display(), exchanges = exchanges.len(), "replaying recording");
        if config.verbosity.is_verbose() {
            reporter.info(&format!(
                "{}: {} exchanges",
                path.display(),
                exchanges.len()
            ));
        }
        replay(&mut session, &exchanges, &options, &reporter, config.debug);
    }

    let mut snapshot = session.snapshot();
    if let Some(title) = &config.title {
        snapshot = snapshot.with_title(title.clone());
    }

    if !config.verbosity.is_quiet() {
        let table = CoverageTable::new(config.table_style, config.use_color());
        println!("{}", table.render(&snapshot, &spec_name(&args.spec)));
    }

    if let Some(export) = &args.export {
        write_snapshot(&snapshot, export)?;
        reporter.success(&format!("Coverage exported to {}", export.display()));
    }

    let stats = session.stats();
    reporter.summary(stats);
    Ok(RunSummary { snapshot, stats })
}

/// Record every exchange; with `debug`, report where each one landed
pub fn replay(
    session: &mut CoverageSession,
    exchanges: &[Exchange],
    options: &RecordOptions,
    reporter: &ProgressReporter,
    debug: bool,
) {
    for exchange in exchanges {
        let result =
            session.record_exchange(&exchange.url, &exchange.method, &exchange.status, options);
        if !debug {
            continue;
        }
        match result {
            Ok(matched) if matched.is_unexpected() => {
                reporter.warning(&describe_match(exchange, &matched));
            }
            Ok(matched) => reporter.success(&describe_match(exchange, &matched)),
            Err(failure) => reporter.failure(&describe_failure(&failure)),
        }
    }
}

/// One debug line for a recorded exchange
#[must_use]
pub fn describe_match(exchange: &Exchange, matched: &MatchResult) -> String {
    let mut line = format!(
        "{} {} {} -> {} {} {}",
        exchange.method,
        exchange.url,
        exchange.status,
        matched.path_template,
        matched.method,
        matched.response_key
    );
    if matched.is_unexpected() {
        line.push_str(" (unexpected)");
    } else if matched.first_hit {
        line.push_str(" (first hit)");
    }
    line
}

/// One debug line for a dropped exchange
#[must_use]
pub fn describe_failure(failure: &MatchFailure) -> String {
    failure.to_string()
}

/// Display name for a spec path: its file name
#[must_use]
pub fn spec_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

fn write_snapshot(snapshot: &CoverageSnapshot, path: &Path) -> CliResult<()> {
    let json = serde_json::to_string_pretty(snapshot)
        .map_err(|e| CliError::report_generation(e.to_string()))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| CliError::report_generation(format!("{}: {e}", parent.display())))?;
    }
    std::fs::write(path, json)
        .map_err(|e| CliError::report_generation(format!("{}: {e}", path.display())))
}
