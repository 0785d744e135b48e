//! Tracking session
//!
//! One [`CoverageSession`] per test run. It owns the [`CoverageModel`], feeds
//! observed exchanges through the matcher and produces snapshots on demand.
//! Nothing is global; two sessions never see each other's counters.

use crate::document::Document;
use crate::ids::{OperationId, PathId, ResponseId};
use crate::matcher::{relative_url, resolve_method, resolve_path, resolve_server, strip_query};
use crate::model::{CoverageModel, ResponseMatch};
use crate::result::{ApicovResult, FailureContext, MatchFailure};
use crate::snapshot::CoverageSnapshot;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Per-exchange matching options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordOptions {
    /// Server base URL that wins over the declared servers when it prefixes the URL
    pub fixed_server_url: Option<String>,
}

impl RecordOptions {
    /// Options with no overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin server resolution to `url`
    #[must_use]
    pub fn with_fixed_server_url(mut self, url: impl Into<String>) -> Self {
        self.fixed_server_url = Some(url.into());
        self
    }
}

/// Where an exchange landed in the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    /// Server base URL that matched
    pub server: String,
    /// URL with the server stripped
    pub relative_url: String,
    /// Matched path
    pub path: PathId,
    /// Template of the matched path
    pub path_template: String,
    /// Matched operation
    pub operation: OperationId,
    /// Method key as declared
    pub method: String,
    /// Matched response slot
    pub response: ResponseId,
    /// Response key the code was recorded under
    pub response_key: String,
    /// How the code was resolved
    pub outcome: ResponseMatch,
    /// Whether this exchange was the first to hit a declared slot
    pub first_hit: bool,
}

impl MatchResult {
    /// Whether the code was not declared and no `default` absorbed it
    #[must_use]
    pub fn is_unexpected(&self) -> bool {
        self.outcome == ResponseMatch::Unexpected
    }
}

/// Running totals for a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    /// Exchanges passed to `record_exchange`
    pub exchanges: u64,
    /// Exchanges recorded
    pub matched: u64,
    /// Exchanges dropped because they did not match
    pub failures: u64,
    /// Recorded exchanges whose code was unexpected
    pub unexpected: u64,
}

/// A single coverage tracking run
#[derive(Debug, Clone)]
pub struct CoverageSession {
    model: CoverageModel,
    stats: SessionStats,
}

impl CoverageSession {
    /// Start tracking against a document
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            model: CoverageModel::build(document),
            stats: SessionStats::default(),
        }
    }

    /// Load a spec file and start tracking against it
    pub fn load(path: impl AsRef<Path>) -> ApicovResult<Self> {
        crate::loader::load_spec(path).map(Self::new)
    }

    /// The coverage model
    #[must_use]
    pub fn model(&self) -> &CoverageModel {
        &self.model
    }

    /// The document being tracked
    #[must_use]
    pub fn document(&self) -> &Document {
        self.model.document()
    }

    /// Running totals
    #[must_use]
    pub const fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Record one observed exchange
    ///
    /// A failure drops the exchange and leaves every counter untouched.
    pub fn record_exchange(
        &mut self,
        url: &str,
        method: &str,
        code: &str,
        options: &RecordOptions,
    ) -> Result<MatchResult, MatchFailure> {
        self.stats.exchanges += 1;
        let result = self.resolve_and_count(url, method, code, options);
        match &result {
            Ok(matched) => {
                self.stats.matched += 1;
                if matched.is_unexpected() {
                    self.stats.unexpected += 1;
                    warn!(
                        url,
                        method,
                        code,
                        server = %matched.server,
                        relative_url = %matched.relative_url,
                        path = %matched.path_template,
                        "No matching response"
                    );
                }
            }
            Err(failure) => {
                self.stats.failures += 1;
                let context = failure.context();
                warn!(
                    kind = failure.kind(),
                    url,
                    method,
                    code,
                    server = context.server.as_deref(),
                    relative_url = context.relative_url.as_deref(),
                    "{}",
                    failure_message(failure)
                );
            }
        }
        result
    }

    fn resolve_and_count(
        &mut self,
        url: &str,
        method: &str,
        code: &str,
        options: &RecordOptions,
    ) -> Result<MatchResult, MatchFailure> {
        let context = FailureContext::new(url, method, code);
        let target = strip_query(url);
        let document = self.model.document();

        let Some(servers) = document.servers() else {
            return Err(MatchFailure::NoServers { context });
        };
        let Some(server) = resolve_server(servers, target, options.fixed_server_url.as_deref())
        else {
            return Err(MatchFailure::ServerNotMatched { context });
        };
        let relative = relative_url(target, server);
        let context = context.with_server(server, relative);
        debug!(server, relative_url = relative, "resolved server");

        let Some(paths) = document.paths() else {
            return Err(MatchFailure::NoPaths { context });
        };
        let Some(path_id) = resolve_path(paths, relative) else {
            return Err(MatchFailure::PathNotMatched { context });
        };
        let path = &paths[path_id.index()];
        let Some(operation_id) = resolve_method(path, path_id, method) else {
            return Err(MatchFailure::MethodNotMatched { context });
        };

        let server = server.to_string();
        let relative = relative.to_string();
        let path_template = path.template().as_str().to_string();
        let method_key = path.operations()[operation_id.index()].method().to_string();

        let Some((response_id, outcome)) = self.model.resolve_response(operation_id, code) else {
            return Err(MatchFailure::MethodNotMatched { context });
        };
        let first_hit = self.model.record_hit(response_id);
        let response_key = self
            .model
            .response_key(response_id)
            .unwrap_or(code)
            .to_string();
        debug!(
            path = %path_template,
            method = %method_key,
            response = %response_key,
            first_hit,
            "recorded exchange"
        );

        Ok(MatchResult {
            server,
            relative_url: relative,
            path: path_id,
            path_template,
            operation: operation_id,
            method: method_key,
            response: response_id,
            response_key,
            outcome,
            first_hit,
        })
    }

    /// Current coverage
    #[must_use]
    pub fn snapshot(&self) -> CoverageSnapshot {
        CoverageSnapshot::from_model(&self.model)
    }
}

fn failure_message(failure: &MatchFailure) -> &'static str {
    match failure {
        MatchFailure::NoServers { .. } => "No servers declared in spec",
        MatchFailure::NoPaths { .. } => "No paths declared in spec",
        MatchFailure::ServerNotMatched { .. } => "No matching server",
        MatchFailure::PathNotMatched { .. } => "Ambiguous or no matching path",
        MatchFailure::MethodNotMatched { .. } => "No matching method",
    }
}

/// A session shared between threads
///
/// Every exchange takes the lock for the duration of one `record_exchange`.
#[derive(Debug, Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<CoverageSession>>,
}

impl SharedSession {
    /// Wrap a session
    #[must_use]
    pub fn new(session: CoverageSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CoverageSession> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// See [`CoverageSession::record_exchange`]
    pub fn record_exchange(
        &self,
        url: &str,
        method: &str,
        code: &str,
        options: &RecordOptions,
    ) -> Result<MatchResult, MatchFailure> {
        self.lock().record_exchange(url, method, code, options)
    }

    /// See [`CoverageSession::snapshot`]
    #[must_use]
    pub fn snapshot(&self) -> CoverageSnapshot {
        self.lock().snapshot()
    }

    /// See [`CoverageSession::stats`]
    #[must_use]
    pub fn stats(&self) -> SessionStats {
        self.lock().stats()
    }

    /// Take the session back once every other handle is gone
    pub fn into_inner(self) -> Result<CoverageSession, Self> {
        Arc::try_unwrap(self.inner)
            .map(|mutex| {
                mutex
                    .into_inner()
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
            })
            .map_err(|inner| Self { inner })
    }
}

impl From<CoverageSession> for SharedSession {
    fn from(session: CoverageSession) -> Self {
        Self::new(session)
    }
}
