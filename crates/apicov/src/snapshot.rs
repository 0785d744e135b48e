//! Coverage Snapshot
//!
//! An immutable, JSON-serializable copy of the coverage model. The JSON shape
//! is the export format downstream reporters depend on:
//!
//! ```text
//! {
//!   "title": "...", "callCount": 9, "totalCalls": 10, "callPercentage": 90,
//!   "/products": {
//!     "callCount": 9, "totalCalls": 10, "callPercentage": 90,
//!     "post": {
//!       "callCount": 5, "totalCalls": 6, "callPercentage": 83,
//!       "responses": { "201": { "callCount": 4, "isUnexpected": false } }
//!     }
//!   }
//! }
//! ```

use crate::ids::{OperationId, PathId};
use crate::model::{Counts, CoverageModel};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// `round(100 * covered / total)`, with zero capacity reporting 0%
#[must_use]
pub fn percentage(covered: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    let covered = u128::from(covered);
    let total = u128::from(total);
    ((200 * covered + total) / (2 * total)) as u32
}

/// Coverage state of one response slot, as a reporter sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    /// Declared, never observed
    Uncovered,
    /// Declared and observed
    Covered,
    /// Observed, never declared
    Unexpected,
}

/// Response-level snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseCoverage {
    /// Raw exchange count
    pub call_count: u64,
    /// Synthesized for an undeclared code
    #[serde(default)]
    pub is_unexpected: bool,
}

impl ResponseCoverage {
    /// Classify the slot
    #[must_use]
    pub const fn status(&self) -> ResponseStatus {
        if self.is_unexpected {
            ResponseStatus::Unexpected
        } else if self.call_count == 0 {
            ResponseStatus::Uncovered
        } else {
            ResponseStatus::Covered
        }
    }
}

/// Method-level snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodCoverage {
    /// Distinct declared responses exercised
    pub call_count: u64,
    /// Declared responses
    pub total_calls: u64,
    /// `percentage(call_count, total_calls)`
    pub call_percentage: u32,
    /// Response slots keyed by status code or `default`
    #[serde(default)]
    pub responses: IndexMap<String, ResponseCoverage>,
}

impl MethodCoverage {
    /// Response keys with the given status, in report order
    pub fn responses_with(&self, status: ResponseStatus) -> impl Iterator<Item = &str> + '_ {
        self.responses
            .iter()
            .filter(move |(_, r)| r.status() == status)
            .map(|(code, _)| code.as_str())
    }
}

/// Path-level snapshot; methods are flattened next to the counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathCoverage {
    /// Distinct declared responses exercised under this path
    pub call_count: u64,
    /// Declared responses under this path
    pub total_calls: u64,
    /// `percentage(call_count, total_calls)`
    pub call_percentage: u32,
    /// Methods keyed as written in the document
    #[serde(flatten)]
    pub methods: IndexMap<String, MethodCoverage>,
}

/// Document-level snapshot; paths are flattened next to the counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageSnapshot {
    /// `info.title`, empty when the document has none
    #[serde(default)]
    pub title: String,
    /// Distinct declared responses exercised
    pub call_count: u64,
    /// Declared responses
    pub total_calls: u64,
    /// `percentage(call_count, total_calls)`
    pub call_percentage: u32,
    /// Paths keyed by template, in declaration order
    #[serde(flatten)]
    pub paths: IndexMap<String, PathCoverage>,
}

impl CoverageSnapshot {
    /// Read the model without touching it
    #[must_use]
    pub fn from_model(model: &CoverageModel) -> Self {
        let document = model.document();
        let counts = model.counts();

        let paths = document
            .paths()
            .unwrap_or_default()
            .iter()
            .zip(model.path_counters())
            .enumerate()
            .map(|(path_index, (item, path_counters))| {
                let path_id = PathId::new(path_index as u32);
                let methods = item
                    .operations()
                    .iter()
                    .enumerate()
                    .map(|(op_index, op)| {
                        let op_id = OperationId::new(path_id, op_index as u32);
                        let op_counts = model.operation_counts(op_id).unwrap_or_default();
                        let responses = model
                            .responses(op_id)
                            .map(|(code, entry)| {
                                (
                                    code.to_string(),
                                    ResponseCoverage {
                                        call_count: entry.call_count,
                                        is_unexpected: entry.is_unexpected,
                                    },
                                )
                            })
                            .collect();
                        (op.method().to_string(), method_coverage(op_counts, responses))
                    })
                    .collect();
                (
                    item.template().as_str().to_string(),
                    path_coverage(path_counters.counts, methods),
                )
            })
            .collect();

        Self {
            title: document.title().unwrap_or_default().to_string(),
            call_count: counts.call_count,
            total_calls: counts.total_calls,
            call_percentage: percentage(counts.call_count, counts.total_calls),
            paths,
        }
    }

    /// Replace the title, e.g. with one supplied by the host
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Number of response slots that were observed but never declared
    #[must_use]
    pub fn unexpected_count(&self) -> usize {
        self.paths
            .values()
            .flat_map(|p| p.methods.values())
            .flat_map(|m| m.responses.values())
            .filter(|r| r.is_unexpected)
            .count()
    }
}

fn method_coverage(counts: Counts, responses: IndexMap<String, ResponseCoverage>) -> MethodCoverage {
    MethodCoverage {
        call_count: counts.call_count,
        total_calls: counts.total_calls,
        call_percentage: percentage(counts.call_count, counts.total_calls),
        responses,
    }
}

fn path_coverage(counts: Counts, methods: IndexMap<String, MethodCoverage>) -> PathCoverage {
    PathCoverage {
        call_count: counts.call_count,
        total_calls: counts.total_calls,
        call_percentage: percentage(counts.call_count, counts.total_calls),
        methods,
    }
}
