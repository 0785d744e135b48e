//! HAR (HTTP Archive) ingestion
//!
//! Reads HAR 1.2 recordings, as exported by browsers, proxies and HTTP
//! clients, and turns each entry into an [`Exchange`] the coverage session
//! can record. Only the fields coverage needs are required; everything else
//! a recorder may emit is tolerated.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

// =============================================================================
// HAR 1.2 Format Structures
// =============================================================================

/// HAR file root structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Har {
    /// HAR log container
    pub log: HarLog,
}

impl Har {
    /// Create an empty HAR
    #[must_use]
    pub fn new() -> Self {
        Self {
            log: HarLog::default(),
        }
    }

    /// Parse HAR from JSON string
    pub fn from_json(json: &str) -> Result<Self, HarError> {
        serde_json::from_str(json).map_err(|e| HarError::ParseError(e.to_string()))
    }

    /// Read and parse a HAR file
    pub fn from_file(path: &Path) -> Result<Self, HarError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| HarError::IoError(format!("{}: {e}", path.display())))?;
        Self::from_json(&json).map_err(|e| match e {
            HarError::ParseError(msg) => HarError::ParseError(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Get number of entries
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.log.entries.len()
    }

    /// Add an entry
    pub fn add_entry(&mut self, entry: HarEntry) {
        self.log.entries.push(entry);
    }

    /// Exchanges in recorded order, skipping requests that never got a response
    #[must_use]
    pub fn exchanges(&self) -> Vec<Exchange> {
        self.log
            .entries
            .iter()
            .filter_map(|entry| {
                let exchange = Exchange::from_entry(entry);
                if exchange.is_none() {
                    info!(
                        url = %entry.request.url,
                        method = %entry.request.method,
                        "Request didn't have a response"
                    );
                }
                exchange
            })
            .collect()
    }
}

impl Default for Har {
    fn default() -> Self {
        Self::new()
    }
}

/// HAR log structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarLog {
    /// HAR format version
    #[serde(default = "default_version")]
    pub version: String,
    /// Creator application info
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<HarCreator>,
    /// List of recorded entries
    #[serde(default)]
    pub entries: Vec<HarEntry>,
    /// Optional comment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Default for HarLog {
    fn default() -> Self {
        Self {
            version: default_version(),
            creator: None,
            entries: Vec::new(),
            comment: None,
        }
    }
}

fn default_version() -> String {
    "1.2".to_string()
}

/// Creator application info
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarCreator {
    /// Application name
    pub name: String,
    /// Application version
    #[serde(default)]
    pub version: String,
}

/// A single HAR entry (request/response pair)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarEntry {
    /// Start time (ISO 8601)
    #[serde(rename = "startedDateTime", default)]
    pub started_date_time: String,
    /// Total time in milliseconds
    #[serde(default)]
    pub time: f64,
    /// Request details
    pub request: HarRequest,
    /// Response details
    pub response: HarResponse,
    /// Optional comment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl HarEntry {
    /// Create a new entry
    #[must_use]
    pub fn new(request: HarRequest, response: HarResponse) -> Self {
        Self {
            started_date_time: String::new(),
            time: 0.0,
            request,
            response,
            comment: None,
        }
    }
}

/// HTTP request in HAR format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarRequest {
    /// HTTP method
    pub method: String,
    /// Request URL
    pub url: String,
    /// HTTP version
    #[serde(rename = "httpVersion", default)]
    pub http_version: String,
    /// Headers
    #[serde(default)]
    pub headers: Vec<HarHeader>,
}

impl HarRequest {
    /// Create a new request
    #[must_use]
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            http_version: "HTTP/1.1".to_string(),
            headers: Vec::new(),
        }
    }
}

/// HTTP response in HAR format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarResponse {
    /// HTTP status code; `0` (or negative) when no response was received
    pub status: i32,
    /// Status text
    #[serde(rename = "statusText", default)]
    pub status_text: String,
    /// HTTP version
    #[serde(rename = "httpVersion", default)]
    pub http_version: String,
    /// Headers
    #[serde(default)]
    pub headers: Vec<HarHeader>,
}

impl HarResponse {
    /// Create a new response
    #[must_use]
    pub fn new(status: i32, status_text: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            http_version: "HTTP/1.1".to_string(),
            headers: Vec::new(),
        }
    }

    /// Whether a response was actually received
    #[must_use]
    pub const fn is_received(&self) -> bool {
        self.status > 0
    }
}

/// HTTP header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarHeader {
    /// Header name
    pub name: String,
    /// Header value
    pub value: String,
}

// =============================================================================
// Exchanges
// =============================================================================

/// One observed request/response pair, in the form the session records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// Full request URL
    pub url: String,
    /// Request method
    pub method: String,
    /// Response status code, as text
    pub status: String,
}

impl Exchange {
    /// Create an exchange
    #[must_use]
    pub fn new(url: impl Into<String>, method: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            status: status.into(),
        }
    }

    /// Build from a HAR entry; `None` when the request got no response
    #[must_use]
    pub fn from_entry(entry: &HarEntry) -> Option<Self> {
        entry.response.is_received().then(|| {
            Self::new(
                entry.request.url.clone(),
                entry.request.method.clone(),
                entry.response.status.to_string(),
            )
        })
    }
}

// =============================================================================
// Errors
// =============================================================================

/// HAR-related errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarError {
    /// JSON parsing error
    #[error("HAR parse error: {0}")]
    ParseError(String),
    /// I/O error
    #[error("HAR I/O error: {0}")]
    IoError(String),
}
