//! Typed view of a dereferenced OpenAPI document
//!
//! Only what coverage needs is kept: server base URLs, path templates in
//! declaration order, the methods under each path and the response keys
//! under each method. Counters are not stored here; see
//! [`CoverageModel`](crate::CoverageModel).

use crate::template::PathTemplate;
use serde_json::Value;

/// Keys that carry coverage counters in exported reports. They are never
/// HTTP methods, even when a document was produced from such a report.
pub const RESERVED_KEYS: [&str; 2] = ["callCount", "totalCalls"];

/// One declared method and its response keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    method: String,
    responses: Vec<String>,
}

impl Operation {
    /// Create an operation with no declared responses
    #[must_use]
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            responses: Vec::new(),
        }
    }

    /// Declare a response key (a status code or `default`)
    #[must_use]
    pub fn with_response(mut self, code: impl Into<String>) -> Self {
        self.responses.push(code.into());
        self
    }

    /// Declare several response keys
    #[must_use]
    pub fn with_responses<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.responses.extend(codes.into_iter().map(Into::into));
        self
    }

    /// Method key as written in the document
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Declared response keys, in declaration order
    #[must_use]
    pub fn responses(&self) -> &[String] {
        &self.responses
    }
}

/// One declared path template with its operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathItem {
    template: PathTemplate,
    operations: Vec<Operation>,
}

impl PathItem {
    /// Create a path item with no operations
    #[must_use]
    pub fn new(template: &str) -> Self {
        Self {
            template: PathTemplate::parse(template),
            operations: Vec::new(),
        }
    }

    /// Add an operation
    #[must_use]
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    /// Compiled template
    #[must_use]
    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    /// Operations, in declaration order
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }
}

/// The parts of an OpenAPI document coverage is measured against
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    title: Option<String>,
    servers: Option<Vec<String>>,
    paths: Option<Vec<PathItem>>,
}

impl Document {
    /// Create an empty document with neither servers nor paths declared
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `info.title`
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Declare a server base URL
    #[must_use]
    pub fn with_server(mut self, url: impl Into<String>) -> Self {
        self.servers.get_or_insert_with(Vec::new).push(url.into());
        self
    }

    /// Declare a path item
    #[must_use]
    pub fn with_path(mut self, path: PathItem) -> Self {
        self.paths.get_or_insert_with(Vec::new).push(path);
        self
    }

    /// Build from an already dereferenced document tree
    ///
    /// Missing `servers` or `paths` are recorded as absent rather than
    /// rejected; matching reports them per exchange.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let title = value
            .pointer("/info/title")
            .and_then(Value::as_str)
            .map(str::to_string);

        let servers = value.get("servers").and_then(Value::as_array).map(|list| {
            list.iter()
                .filter_map(|server| server.get("url").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        });

        let paths = value.get("paths").and_then(Value::as_object).map(|paths| {
            paths
                .iter()
                .map(|(template, item)| path_item_from_value(template, item))
                .collect()
        });

        Self {
            title,
            servers,
            paths,
        }
    }

    /// `info.title`, if declared
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Server base URLs in declaration order, `None` when not declared
    #[must_use]
    pub fn servers(&self) -> Option<&[String]> {
        self.servers.as_deref()
    }

    /// Path items in declaration order, `None` when not declared
    #[must_use]
    pub fn paths(&self) -> Option<&[PathItem]> {
        self.paths.as_deref()
    }

    /// Number of declared response slots
    #[must_use]
    pub fn response_slot_count(&self) -> usize {
        self.paths()
            .unwrap_or_default()
            .iter()
            .flat_map(PathItem::operations)
            .map(|op| op.responses().len())
            .sum()
    }
}

fn path_item_from_value(template: &str, item: &Value) -> PathItem {
    let operations = item
        .as_object()
        .into_iter()
        .flatten()
        .filter(|(key, value)| value.is_object() && !RESERVED_KEYS.contains(&key.as_str()))
        .map(|(method, value)| Operation {
            method: method.clone(),
            responses: value
                .get("responses")
                .and_then(Value::as_object)
                .map(|responses| responses.keys().cloned().collect())
                .unwrap_or_default(),
        })
        .collect();

    PathItem {
        template: PathTemplate::parse(template),
        operations,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kittens() -> Value {
        json!({
            "openapi": "3.0.0",
            "info": { "title": "Kittens API", "version": "1" },
            "servers": [{ "url": "http://127.0.0.1:3000" }, { "url": "http://localhost" }],
            "paths": {
                "/kittens": {
                    "summary": "kittens",
                    "parameters": [{ "name": "x", "in": "query" }],
                    "post": { "responses": { "201": {}, "400": {} } },
                    "delete": { "responses": { "400": {}, "404": {} } }
                },
                "/mittens": {
                    "delete": { "responses": { "400": {} } }
                }
            }
        })
    }

    #[test]
    fn test_from_value_servers_in_order() {
        let doc = Document::from_value(&kittens());
        assert_eq!(
            doc.servers().unwrap(),
            &["http://127.0.0.1:3000".to_string(), "http://localhost".to_string()]
        );
    }

    #[test]
    fn test_from_value_paths_in_declaration_order() {
        let doc = Document::from_value(&kittens());
        let templates: Vec<&str> = doc
            .paths()
            .unwrap()
            .iter()
            .map(|p| p.template().as_str())
            .collect();
        assert_eq!(templates, vec!["/kittens", "/mittens"]);
    }

    #[test]
    fn test_non_object_properties_are_not_methods() {
        let doc = Document::from_value(&kittens());
        let kittens = &doc.paths().unwrap()[0];
        let methods: Vec<&str> = kittens.operations().iter().map(Operation::method).collect();
        assert_eq!(methods, vec!["post", "delete"]);
    }

    #[test]
    fn test_reserved_keys_are_not_methods() {
        let doc = Document::from_value(&json!({
            "paths": { "/a": { "callCount": {}, "totalCalls": 3, "get": { "responses": { "200": {} } } } }
        }));
        let ops = doc.paths().unwrap()[0].operations();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].method(), "get");
    }

    #[test]
    fn test_responses_in_order() {
        let doc = Document::from_value(&kittens());
        let post = &doc.paths().unwrap()[0].operations()[0];
        assert_eq!(post.responses(), &["201".to_string(), "400".to_string()]);
    }

    #[test]
    fn test_method_without_responses() {
        let doc = Document::from_value(&json!({ "paths": { "/a": { "get": {} } } }));
        assert!(doc.paths().unwrap()[0].operations()[0].responses().is_empty());
        assert_eq!(doc.response_slot_count(), 0);
    }

    #[test]
    fn test_title() {
        assert_eq!(Document::from_value(&kittens()).title(), Some("Kittens API"));
        assert_eq!(Document::from_value(&json!({})).title(), None);
    }

    #[test]
    fn test_missing_servers_and_paths_are_absent() {
        let doc = Document::from_value(&json!({ "info": { "title": "bare" } }));
        assert!(doc.servers().is_none());
        assert!(doc.paths().is_none());
    }

    #[test]
    fn test_server_without_url_is_skipped() {
        let doc = Document::from_value(&json!({ "servers": [{ "description": "x" }, { "url": "/api" }] }));
        assert_eq!(doc.servers().unwrap(), &["/api".to_string()]);
    }

    #[test]
    fn test_response_slot_count() {
        assert_eq!(Document::from_value(&kittens()).response_slot_count(), 5);
    }

    #[test]
    fn test_builder_matches_from_value() {
        let built = Document::new()
            .with_server("/api")
            .with_path(
                PathItem::new("/refpath")
                    .with_operation(Operation::new("get").with_responses(["200", "400"])),
            );
        let parsed = Document::from_value(&json!({
            "servers": [{ "url": "/api" }],
            "paths": { "/refpath": { "get": { "responses": { "200": {}, "400": {} } } } }
        }));
        assert_eq!(built, parsed);
    }
}
