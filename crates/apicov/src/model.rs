//! Coverage Model
//!
//! The mutable state of a tracking session. The [`Document`] describes what
//! the API promises and never changes once loaded; counters live beside it in
//! vectors indexed by the ids handed out in [`crate::ids`].
//!
//! Capacity (`total_calls`) is one unit per declared response slot and is
//! fixed at build time. Aggregate `call_count`s only move when a declared
//! slot is hit for the first time.

use crate::document::Document;
use crate::ids::{OperationId, PathId, ResponseId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Call count and capacity at one level of the model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counts {
    /// Distinct declared response slots exercised at least once
    pub call_count: u64,
    /// Declared response slots
    pub total_calls: u64,
}

impl Counts {
    fn add_slot(&mut self) {
        self.total_calls += 1;
    }

    fn hit(&mut self) {
        self.call_count += 1;
    }
}

/// Counter for one response slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEntry {
    /// Raw number of exchanges resolved to this slot
    pub call_count: u64,
    /// True only for slots synthesized for an undeclared status code
    pub is_unexpected: bool,
}

impl ResponseEntry {
    const fn declared() -> Self {
        Self {
            call_count: 0,
            is_unexpected: false,
        }
    }

    const fn unexpected() -> Self {
        Self {
            call_count: 0,
            is_unexpected: true,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct OperationCounters {
    pub(crate) counts: Counts,
    pub(crate) responses: IndexMap<String, ResponseEntry>,
}

#[derive(Debug, Clone)]
pub(crate) struct PathCounters {
    pub(crate) counts: Counts,
    pub(crate) operations: Vec<OperationCounters>,
}

/// How an observed status code was resolved under an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMatch {
    /// The code itself is declared
    Declared,
    /// Not declared, absorbed by the `default` response
    Default,
    /// Neither declared nor covered by `default`
    Unexpected,
}

/// Coverage state for one session
#[derive(Debug, Clone)]
pub struct CoverageModel {
    document: Document,
    counts: Counts,
    paths: Vec<PathCounters>,
}

impl CoverageModel {
    /// Build zeroed counters for every declared response slot
    #[must_use]
    pub fn build(document: Document) -> Self {
        let mut counts = Counts::default();
        let paths = document
            .paths()
            .unwrap_or_default()
            .iter()
            .map(|item| {
                let mut path_counts = Counts::default();
                let operations = item
                    .operations()
                    .iter()
                    .map(|op| {
                        let mut op_counts = Counts::default();
                        let mut responses = IndexMap::with_capacity(op.responses().len());
                        for code in op.responses() {
                            responses.insert(code.clone(), ResponseEntry::declared());
                            op_counts.add_slot();
                            path_counts.add_slot();
                            counts.add_slot();
                        }
                        OperationCounters {
                            counts: op_counts,
                            responses,
                        }
                    })
                    .collect();
                PathCounters {
                    counts: path_counts,
                    operations,
                }
            })
            .collect();

        Self {
            document,
            counts,
            paths,
        }
    }

    /// The specification this model was built from
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Document-level counts
    #[must_use]
    pub const fn counts(&self) -> Counts {
        self.counts
    }

    /// Path-level counts
    #[must_use]
    pub fn path_counts(&self, path: PathId) -> Option<Counts> {
        self.paths.get(path.index()).map(|p| p.counts)
    }

    /// Method-level counts
    #[must_use]
    pub fn operation_counts(&self, operation: OperationId) -> Option<Counts> {
        self.operation(operation).map(|o| o.counts)
    }

    /// One response slot
    #[must_use]
    pub fn response(&self, response: ResponseId) -> Option<&ResponseEntry> {
        self.operation(response.operation())
            .and_then(|o| o.responses.get_index(response.index()))
            .map(|(_, entry)| entry)
    }

    /// Response key of a slot
    #[must_use]
    pub fn response_key(&self, response: ResponseId) -> Option<&str> {
        self.operation(response.operation())
            .and_then(|o| o.responses.get_index(response.index()))
            .map(|(key, _)| key.as_str())
    }

    /// All response slots under an operation, declared first then unexpected
    /// in order of first observation
    pub fn responses(
        &self,
        operation: OperationId,
    ) -> impl Iterator<Item = (&str, &ResponseEntry)> + '_ {
        self.operation(operation)
            .into_iter()
            .flat_map(|o| o.responses.iter().map(|(k, v)| (k.as_str(), v)))
    }

    pub(crate) fn path_counters(&self) -> &[PathCounters] {
        &self.paths
    }

    fn operation(&self, operation: OperationId) -> Option<&OperationCounters> {
        self.paths
            .get(operation.path().index())
            .and_then(|p| p.operations.get(operation.index()))
    }

    fn operation_mut(&mut self, operation: OperationId) -> Option<&mut OperationCounters> {
        self.paths
            .get_mut(operation.path().index())
            .and_then(|p| p.operations.get_mut(operation.index()))
    }

    /// Find the slot for an observed status code, synthesizing an unexpected
    /// slot when neither the code nor `default` is declared
    ///
    /// Returns `None` only for an operation id this model never issued.
    pub fn resolve_response(
        &mut self,
        operation: OperationId,
        code: &str,
    ) -> Option<(ResponseId, ResponseMatch)> {
        let op = self.operation_mut(operation)?;
        let (index, matched) = if let Some(index) = op.responses.get_index_of(code) {
            let kind = if op.responses[index].is_unexpected {
                ResponseMatch::Unexpected
            } else {
                ResponseMatch::Declared
            };
            (index, kind)
        } else if let Some(index) = op.responses.get_index_of("default") {
            (index, ResponseMatch::Default)
        } else {
            let (index, _) = op
                .responses
                .insert_full(code.to_string(), ResponseEntry::unexpected());
            (index, ResponseMatch::Unexpected)
        };
        Some((ResponseId::new(operation, index as u32), matched))
    }

    /// Apply the counting rule for one resolved exchange
    ///
    /// The slot's own count always moves. Method, path and document counts
    /// move only when a declared slot goes from zero to one. Returns whether
    /// that happened.
    pub fn record_hit(&mut self, response: ResponseId) -> bool {
        let operation = response.operation();
        let path = operation.path();
        let Some(op) = self.operation_mut(operation) else {
            return false;
        };
        let Some((_, entry)) = op.responses.get_index_mut(response.index()) else {
            return false;
        };

        let first_hit = entry.call_count == 0 && !entry.is_unexpected;
        entry.call_count += 1;

        if first_hit {
            op.counts.hit();
            self.paths[path.index()].counts.hit();
            self.counts.hit();
        }
        first_hit
    }
}
