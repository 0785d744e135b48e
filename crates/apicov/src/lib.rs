//! Apicov: OpenAPI coverage tracking
//!
//! Feeds observed HTTP exchanges through an OpenAPI document and records
//! which `(path, method, status)` slots the traffic exercised.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       APICOV Architecture                         │
//! ├──────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐             │
//! │   │ Spec       │    │ Coverage   │    │ Snapshot   │             │
//! │   │ Loader     │───►│ Model      │───►│ (JSON)     │             │
//! │   └────────────┘    └─────▲──────┘    └────────────┘             │
//! │                           │                                      │
//! │   (url, method, code) ──► Request Matcher                        │
//! │                    server → path → method → response             │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use apicov::{CoverageSession, Document, Operation, PathItem, RecordOptions};
//!
//! let document = Document::new()
//!     .with_server("http://localhost:3000")
//!     .with_path(
//!         PathItem::new("/pets/{id}")
//!             .with_operation(Operation::new("get").with_responses(["200", "404"])),
//!     );
//!
//! let mut session = CoverageSession::new(document);
//! let result = session
//!     .record_exchange("http://localhost:3000/pets/7", "GET", "200", &RecordOptions::new())
//!     .unwrap();
//! assert_eq!(result.path_template, "/pets/{id}");
//!
//! let snapshot = session.snapshot();
//! assert_eq!(snapshot.call_percentage, 50);
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod document;
mod ids;
mod loader;
mod matcher;
mod model;
mod result;
mod session;
mod snapshot;
mod template;

pub use document::{Document, Operation, PathItem, RESERVED_KEYS};
pub use ids::{OperationId, PathId, ResponseId};
pub use loader::{load_dereferenced, load_spec, parse_str, SpecFormat};
pub use matcher::{
    relative_url, resolve_document_path, resolve_method, resolve_path, resolve_server,
    strip_query,
};
pub use model::{Counts, CoverageModel, ResponseEntry, ResponseMatch};
pub use result::{ApicovError, ApicovResult, FailureContext, MatchFailure};
pub use session::{CoverageSession, MatchResult, RecordOptions, SessionStats, SharedSession};
pub use snapshot::{
    percentage, CoverageSnapshot, MethodCoverage, PathCoverage, ResponseCoverage, ResponseStatus,
};
pub use template::{check_path, trim_trailing_slash, Part, PathTemplate, Segment};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::{
        load_spec, ApicovError, ApicovResult, CoverageSession, CoverageSnapshot, Document,
        MatchFailure, MatchResult, RecordOptions, SharedSession,
    };
}
