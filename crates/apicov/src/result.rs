//! Result and error types for apicov.
//!
//! Two families live here. [`ApicovError`] covers loading a specification and
//! is fatal to a session. [`MatchFailure`] covers a single observed exchange
//! that could not be placed in the coverage model; it is reported and the
//! session carries on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for apicov operations
pub type ApicovResult<T> = Result<T, ApicovError>;

/// Errors that can occur while loading a specification
#[derive(Debug, Error)]
pub enum ApicovError {
    /// Specification file missing or not a regular file
    #[error("OpenAPI spec {} does not exist", path.display())]
    SpecNotFound {
        /// Path that was requested
        path: PathBuf,
    },

    /// Specification could not be parsed or dereferenced
    #[error("OpenAPI spec {} could not be parsed: {message}", path.display())]
    SpecUnparseable {
        /// Path of the offending document
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Spec file exists but could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApicovError {
    /// Create a spec-not-found error
    #[must_use]
    pub fn spec_not_found(path: impl Into<PathBuf>) -> Self {
        Self::SpecNotFound { path: path.into() }
    }

    /// Create a spec-unparseable error
    #[must_use]
    pub fn spec_unparseable(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::SpecUnparseable {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// What a host logger needs to report a dropped exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureContext {
    /// Method as observed
    pub method: String,
    /// Status code as observed
    pub code: String,
    /// Full URL as observed
    pub url: String,
    /// Server base URL, once one was resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    /// URL with the server prefix stripped, once a server was resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_url: Option<String>,
}

impl FailureContext {
    /// Context for an exchange that has not been resolved to a server yet
    #[must_use]
    pub fn new(url: &str, method: &str, code: &str) -> Self {
        Self {
            method: method.to_string(),
            code: code.to_string(),
            url: url.to_string(),
            server: None,
            relative_url: None,
        }
    }

    /// Attach the resolved server and relative URL
    #[must_use]
    pub fn with_server(mut self, server: &str, relative_url: &str) -> Self {
        self.server = Some(server.to_string());
        self.relative_url = Some(relative_url.to_string());
        self
    }
}

impl fmt::Display for FailureContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] [{}] [{}]", self.url, self.method, self.code)?;
        if let Some(server) = &self.server {
            write!(f, " server={server}")?;
        }
        if let Some(relative_url) = &self.relative_url {
            write!(f, " relativeUrl={relative_url}")?;
        }
        Ok(())
    }
}

/// An observed exchange that could not be matched to the specification
///
/// Never fatal: the exchange is dropped and tracking continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchFailure {
    /// The document declares no `servers` array
    #[error("No servers declared in spec: {context}")]
    NoServers {
        /// Exchange context
        context: FailureContext,
    },

    /// The document declares no `paths` object
    #[error("No paths declared in spec: {context}")]
    NoPaths {
        /// Exchange context
        context: FailureContext,
    },

    /// No declared server (or fixed server URL) is a prefix of the URL
    #[error("No matching server: {context}")]
    ServerNotMatched {
        /// Exchange context
        context: FailureContext,
    },

    /// No path template matched, or more than one matched and could not be separated
    #[error("Ambiguous or no matching path: {context}")]
    PathNotMatched {
        /// Exchange context
        context: FailureContext,
    },

    /// The path matched but declares no such method
    #[error("No matching method: {context}")]
    MethodNotMatched {
        /// Exchange context
        context: FailureContext,
    },
}

impl MatchFailure {
    /// The exchange context carried by every failure
    #[must_use]
    pub const fn context(&self) -> &FailureContext {
        match self {
            Self::NoServers { context }
            | Self::NoPaths { context }
            | Self::ServerNotMatched { context }
            | Self::PathNotMatched { context }
            | Self::MethodNotMatched { context } => context,
        }
    }

    /// Short machine-friendly name of the failure kind
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NoServers { .. } => "no_servers",
            Self::NoPaths { .. } => "no_paths",
            Self::ServerNotMatched { .. } => "server_not_matched",
            Self::PathNotMatched { .. } => "path_not_matched",
            Self::MethodNotMatched { .. } => "method_not_matched",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_not_found_display() {
        let err = ApicovError::spec_not_found("specs/missing.yaml");
        assert!(err.to_string().contains("specs/missing.yaml"));
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_spec_unparseable_display() {
        let err = ApicovError::spec_unparseable("api.json", "expected value at line 1");
        let msg = err.to_string();
        assert!(msg.contains("could not be parsed"));
        assert!(msg.contains("line 1"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ApicovError = io_err.into();
        assert!(err.to_string().contains("I/O"));
    }

    #[test]
    fn test_context_json_omits_unresolved_fields() {
        let ctx = FailureContext::new("http://my-server0/kittens", "DELETE", "404");
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["method"], "DELETE");
        assert_eq!(json["code"], "404");
        assert!(json.get("server").is_none());
        assert!(json.get("relativeUrl").is_none());
    }

    #[test]
    fn test_context_json_with_server() {
        let ctx = FailureContext::new("http://127.0.0.1:3000/dogs", "GET", "200")
            .with_server("http://127.0.0.1:3000", "/dogs");
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["server"], "http://127.0.0.1:3000");
        assert_eq!(json["relativeUrl"], "/dogs");
    }

    #[test]
    fn test_failure_accessors() {
        let ctx = FailureContext::new("http://h/x", "GET", "200");
        let failure = MatchFailure::PathNotMatched {
            context: ctx.clone(),
        };
        assert_eq!(failure.context(), &ctx);
        assert_eq!(failure.kind(), "path_not_matched");
        assert!(failure.to_string().starts_with("Ambiguous or no matching path"));
    }
}
