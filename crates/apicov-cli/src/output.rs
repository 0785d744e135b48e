//! Status lines on stderr

use apicov::SessionStats;
use console::{style, Style, Term};

/// Status reporter for a coverage run
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            use_color,
            quiet,
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "OK".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message, even in quiet mode
    pub fn failure(&self, message: &str) {
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("⚠").yellow().bold().to_string()
        } else {
            "WARN".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print the run summary
    pub fn summary(&self, stats: SessionStats) {
        if self.quiet && stats.failures == 0 {
            return;
        }

        let _ = self.term.write_line(&summary_line(stats, self.use_color));
    }
}

/// One-line run summary, e.g. `12 exchanges (10 matched, 2 unmatched, 1 unexpected)`
#[must_use]
pub fn summary_line(stats: SessionStats, use_color: bool) -> String {
    if use_color {
        let matched_style = Style::new().green().bold();
        let failed_style = Style::new().red().bold();
        let unexpected_style = Style::new().yellow();

        format!(
            "{} exchanges ({} matched, {} unmatched, {} unexpected)",
            stats.exchanges,
            matched_style.apply_to(stats.matched),
            if stats.failures > 0 {
                failed_style.apply_to(stats.failures).to_string()
            } else {
                stats.failures.to_string()
            },
            unexpected_style.apply_to(stats.unexpected)
        )
    } else {
        format!(
            "{} exchanges ({} matched, {} unmatched, {} unexpected)",
            stats.exchanges, stats.matched, stats.failures, stats.unexpected
        )
    }
}
