//! Report command handler

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::handlers::run::spec_name;
use crate::table::CoverageTable;
use crate::ReportArgs;
use apicov::CoverageSnapshot;
use std::path::Path;

/// Execute the report command: render an exported snapshot
pub fn execute_report(config: &CliConfig, args: &ReportArgs) -> CliResult<CoverageSnapshot> {
    let snapshot = load_snapshot(&args.snapshot)?;
    if !config.verbosity.is_quiet() {
        let name = args
            .name
            .clone()
            .unwrap_or_else(|| spec_name(&args.snapshot));
        let table = CoverageTable::new(config.table_style, config.use_color());
        println!("{}", table.render(&snapshot, &name));
    }
    Ok(snapshot)
}

/// Read a snapshot written by `apicov run --export`
pub fn load_snapshot(path: &Path) -> CliResult<CoverageSnapshot> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        CliError::invalid_argument(format!("cannot read snapshot {}: {e}", path.display()))
    })?;
    serde_json::from_str(&json).map_err(|e| {
        CliError::invalid_argument(format!("{} is not a coverage snapshot: {e}", path.display()))
    })
}
